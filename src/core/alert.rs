//! Audible alert policy.
//!
//! The decision ([`should_alert`]) is kept apart from the side effect
//! ([`AlertSink::emit`]); tone generation lives entirely behind the sink.

use crate::event::types::ClassificationLabel;
use crossbeam_channel::Sender;
use serde::{Deserialize, Serialize};
use std::io::Write;

/// Whether an event warrants an audible cue.
///
/// True iff the classifier flagged the event and its label is not low-risk.
pub fn should_alert(alert: bool, label: ClassificationLabel) -> bool {
    alert && !label.is_low_risk()
}

/// Signal sent to the audio boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertSignal {
    pub label: ClassificationLabel,
}

impl AlertSignal {
    /// The cue the dashboard plays for this signal.
    pub fn tone(&self) -> ToneCue {
        ToneCue::ALERT
    }
}

/// Description of an alert tone, for whichever audio backend consumes signals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToneCue {
    pub waveform: Waveform,
    /// Frequency at the start of the cue
    pub start_hz: f32,
    /// Frequency the cue ramps down to
    pub end_hz: f32,
    pub duration_ms: u32,
    pub gain: f32,
}

impl ToneCue {
    pub const ALERT: ToneCue = ToneCue {
        waveform: Waveform::Square,
        start_hz: 880.0,
        end_hz: 440.0,
        duration_ms: 300,
        gain: 0.05,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Waveform {
    Sine,
    Square,
}

/// Receiver of alert signals (the audio boundary).
pub trait AlertSink: Send {
    fn emit(&mut self, signal: AlertSignal);
}

/// Discards every signal.
#[derive(Debug, Default)]
pub struct NullSink;

impl AlertSink for NullSink {
    fn emit(&mut self, _signal: AlertSignal) {}
}

/// Forwards signals over a channel to another thread.
pub struct ChannelSink {
    sender: Sender<AlertSignal>,
}

impl ChannelSink {
    pub fn new(sender: Sender<AlertSignal>) -> Self {
        Self { sender }
    }
}

impl AlertSink for ChannelSink {
    fn emit(&mut self, signal: AlertSignal) {
        if self.sender.try_send(signal).is_err() {
            tracing::debug!("Alert channel full or closed, dropping {}", signal.label);
        }
    }
}

/// Rings the terminal bell.
#[derive(Debug, Default)]
pub struct BellSink;

impl AlertSink for BellSink {
    fn emit(&mut self, signal: AlertSignal) {
        let mut out = std::io::stdout();
        let _ = out.write_all(b"\x07");
        let _ = out.flush();
        tracing::info!(label = %signal.label, "Threat alert");
    }
}

/// Applies [`should_alert`] and emits qualifying signals to a sink.
pub struct AlertDispatcher {
    sink: Box<dyn AlertSink>,
    dispatched: u64,
}

impl AlertDispatcher {
    pub fn new(sink: Box<dyn AlertSink>) -> Self {
        Self {
            sink,
            dispatched: 0,
        }
    }

    /// Consider an alert-flagged event carrying `label`.
    ///
    /// Low-risk labels are suppressed. Returns whether a signal was emitted.
    pub fn consider(&mut self, label: ClassificationLabel) -> bool {
        if !should_alert(true, label) {
            return false;
        }
        self.sink.emit(AlertSignal { label });
        self.dispatched += 1;
        true
    }

    /// Number of signals emitted this session.
    pub fn dispatched(&self) -> u64 {
        self.dispatched
    }
}

impl Default for AlertDispatcher {
    fn default() -> Self {
        Self::new(Box::new(NullSink))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;

    #[test]
    fn test_should_alert_truth_table() {
        for label in ClassificationLabel::ALL {
            assert!(!should_alert(false, label));
        }
        assert!(!should_alert(true, ClassificationLabel::Benign));
        assert!(!should_alert(true, ClassificationLabel::Probe));
        assert!(should_alert(true, ClassificationLabel::DoS));
        assert!(should_alert(true, ClassificationLabel::R2L));
        assert!(should_alert(true, ClassificationLabel::U2R));
    }

    #[test]
    fn test_dispatcher_filters_low_risk() {
        let (tx, rx) = unbounded();
        let mut dispatcher = AlertDispatcher::new(Box::new(ChannelSink::new(tx)));

        assert!(!dispatcher.consider(ClassificationLabel::Probe));
        assert!(dispatcher.consider(ClassificationLabel::DoS));

        let signals: Vec<AlertSignal> = rx.try_iter().collect();
        assert_eq!(
            signals,
            vec![AlertSignal {
                label: ClassificationLabel::DoS
            }]
        );
        assert_eq!(dispatcher.dispatched(), 1);
    }

    #[test]
    fn test_alert_tone_description() {
        let cue = AlertSignal {
            label: ClassificationLabel::U2R,
        }
        .tone();
        assert_eq!(cue.waveform, Waveform::Square);
        assert!(cue.start_hz > cue.end_hz);
        assert_eq!(cue.duration_ms, 300);
    }
}
