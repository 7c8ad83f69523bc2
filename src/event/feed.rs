//! Inbound event channel.
//!
//! A feed runs a producer thread that pushes [`RawPacketEvent`]s into an unbounded
//! channel, so the producer never waits on the dashboard. When the producer runs out
//! of input the channel disconnects.

use crate::event::types::{ClassificationLabel, RawPacketEvent};
use chrono::Local;
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Errors that can occur while starting a feed.
#[derive(Debug)]
pub enum FeedError {
    SpawnFailed(String),
}

impl std::fmt::Display for FeedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeedError::SpawnFailed(e) => write!(f, "Failed to start feed thread: {e}"),
        }
    }
}

impl std::error::Error for FeedError {}

/// A running source of inbound events.
pub struct EventFeed {
    receiver: Receiver<RawPacketEvent>,
    running: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl EventFeed {
    /// Read JSON lines (one [`RawPacketEvent`] per line) from `reader`.
    ///
    /// Blank lines are skipped and malformed lines are logged and dropped.
    pub fn from_reader<R>(reader: R) -> Result<Self, FeedError>
    where
        R: BufRead + Send + 'static,
    {
        Self::spawn("nids-feed-reader", move |sender, running| {
            for line in reader.lines() {
                if !running.load(Ordering::SeqCst) {
                    break;
                }
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        tracing::warn!("Feed read failed: {}", e);
                        break;
                    }
                };
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                match serde_json::from_str::<RawPacketEvent>(line) {
                    Ok(event) => {
                        if sender.send(event).is_err() {
                            break;
                        }
                    }
                    Err(e) => tracing::warn!("Dropping malformed event line: {}", e),
                }
            }
            tracing::debug!("Feed reader reached end of input");
        })
    }

    /// Emit a deterministic rotating sequence of events, one per `interval`.
    ///
    /// Useful for demos and for exercising the dashboard without a capture source.
    pub fn synthetic(interval: Duration) -> Result<Self, FeedError> {
        Self::spawn("nids-feed-synthetic", move |sender, running| {
            let mut seq: u64 = 0;
            while running.load(Ordering::SeqCst) {
                if sender.send(synthetic_event(seq)).is_err() {
                    break;
                }
                seq += 1;
                thread::sleep(interval);
            }
        })
    }

    fn spawn<F>(name: &str, body: F) -> Result<Self, FeedError>
    where
        F: FnOnce(Sender<RawPacketEvent>, Arc<AtomicBool>) + Send + 'static,
    {
        let (sender, receiver) = unbounded();
        let running = Arc::new(AtomicBool::new(true));
        let flag = running.clone();

        let worker = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                body(sender, flag.clone());
                flag.store(false, Ordering::SeqCst);
            })
            .map_err(|e| FeedError::SpawnFailed(e.to_string()))?;

        Ok(Self {
            receiver,
            running,
            worker: Some(worker),
        })
    }

    /// Get the receiver for inbound events.
    pub fn receiver(&self) -> &Receiver<RawPacketEvent> {
        &self.receiver
    }

    /// Check if the producer is still running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Ask the producer to stop.
    ///
    /// A reader blocked on input only notices at its next line, so the thread is
    /// detached rather than joined.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        self.worker.take();
    }
}

impl Drop for EventFeed {
    fn drop(&mut self) {
        self.stop();
    }
}

/// The `seq`-th event of the synthetic sequence.
///
/// Roughly one in four events is non-benign; those carry the alert flag.
pub fn synthetic_event(seq: u64) -> RawPacketEvent {
    let label = match seq % 12 {
        3 => ClassificationLabel::Probe,
        6 => ClassificationLabel::DoS,
        9 => ClassificationLabel::R2L,
        11 if seq % 24 == 23 => ClassificationLabel::U2R,
        _ => ClassificationLabel::Benign,
    };
    RawPacketEvent {
        time: Local::now().format("%H:%M:%S").to_string(),
        src: format!("192.168.1.{}", 10 + seq % 40),
        dst: Some("10.0.0.1".to_string()),
        label: label.as_str().to_string(),
        alert: label != ClassificationLabel::Benign,
    }
}
