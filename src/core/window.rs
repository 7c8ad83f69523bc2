//! Fixed-length intensity window sampled on a timer.
//!
//! Alert events accumulate into a pending bucket; every sample period the bucket is
//! pushed as the newest sample and the oldest sample falls off. The window therefore
//! shows per-interval alert counts regardless of how fast packets arrive.

use crate::core::dashboard::SharedDashboard;
use crossbeam_channel::{bounded, select, tick, Sender};
use std::collections::VecDeque;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Number of samples in the intensity window.
pub const INTENSITY_WINDOW_LEN: usize = 20;

/// Default wall-clock period between samples.
pub const DEFAULT_SAMPLE_PERIOD: Duration = Duration::from_secs(2);

/// The recent-activity series, oldest sample first.
#[derive(Debug, Clone)]
pub struct SlidingWindow {
    samples: VecDeque<u32>,
    interval_count: u32,
}

impl SlidingWindow {
    /// Create a window of zeros.
    pub fn new() -> Self {
        Self {
            samples: std::iter::repeat(0).take(INTENSITY_WINDOW_LEN).collect(),
            interval_count: 0,
        }
    }

    /// Count one alert event towards the current interval.
    pub fn record_alert(&mut self) {
        self.interval_count = self.interval_count.saturating_add(1);
    }

    /// Close the current interval.
    ///
    /// Returns the sample that was appended.
    pub fn tick(&mut self) -> u32 {
        let sample = std::mem::take(&mut self.interval_count);
        self.samples.push_back(sample);
        self.samples.pop_front();
        debug_assert_eq!(self.samples.len(), INTENSITY_WINDOW_LEN);
        sample
    }

    /// Alerts counted since the last tick.
    pub fn pending(&self) -> u32 {
        self.interval_count
    }

    /// Copy of the samples, oldest first.
    pub fn snapshot(&self) -> Vec<u32> {
        self.samples.iter().copied().collect()
    }

    /// Most recent completed sample.
    pub fn latest(&self) -> u32 {
        self.samples.back().copied().unwrap_or(0)
    }
}

impl Default for SlidingWindow {
    fn default() -> Self {
        Self::new()
    }
}

/// Periodic task that ticks a dashboard's intensity window.
pub struct Sampler;

impl Sampler {
    /// Start ticking `dashboard` every `period` on a background thread.
    ///
    /// The task runs until [`SamplerHandle::stop`] is called or the handle is dropped.
    pub fn spawn(dashboard: SharedDashboard, period: Duration) -> std::io::Result<SamplerHandle> {
        let (stop_tx, stop_rx) = bounded::<()>(1);
        let ticker = tick(period);

        let join = thread::Builder::new()
            .name("nids-sampler".to_string())
            .spawn(move || loop {
                select! {
                    recv(ticker) -> _ => {
                        let mut dashboard = match dashboard.lock() {
                            Ok(guard) => guard,
                            Err(poisoned) => poisoned.into_inner(),
                        };
                        dashboard.tick();
                    }
                    recv(stop_rx) -> _ => break,
                }
            })?;

        tracing::debug!("Sampler started with period {:?}", period);

        Ok(SamplerHandle {
            stop_tx: Some(stop_tx),
            join: Some(join),
        })
    }
}

/// Cancellation handle for a running [`Sampler`].
pub struct SamplerHandle {
    stop_tx: Option<Sender<()>>,
    join: Option<JoinHandle<()>>,
}

impl SamplerHandle {
    /// Stop the sampler and wait for its thread to exit.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        // Dropping the sender disconnects the stop channel, which also wakes the select.
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.try_send(());
        }
        if let Some(join) = self.join.take() {
            if join.join().is_err() {
                tracing::warn!("Sampler thread panicked");
            }
            tracing::debug!("Sampler stopped");
        }
    }
}

impl Drop for SamplerHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}
