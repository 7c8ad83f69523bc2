//! Live dashboard state and the event ingestor.
//!
//! A [`Dashboard`] owns every piece of session state. Each inbound event and each
//! sampler tick is one call on `&mut Dashboard`, so an event's sub-steps are never
//! observed half-applied. Share it across threads as a [`SharedDashboard`].

use crate::core::aggregation::{AggregationState, CategorySnapshot};
use crate::core::alert::{AlertDispatcher, AlertSink};
use crate::core::log_buffer::{LogBuffer, LogEntry};
use crate::core::window::SlidingWindow;
use crate::event::types::{PacketEvent, RawPacketEvent, UnknownLabelError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Session state behind a single lock; events and ticks take turns.
pub type SharedDashboard = Arc<Mutex<Dashboard>>;

/// All live state for one monitoring session.
pub struct Dashboard {
    aggregation: AggregationState,
    window: SlidingWindow,
    log: LogBuffer,
    alerts: AlertDispatcher,
    paused: bool,
    /// Events rejected for carrying an unknown label
    rejected: u64,
    /// Sampler ticks completed
    ticks: u64,
    session_id: String,
    session_start: DateTime<Utc>,
}

impl Dashboard {
    /// Create an empty session that emits alerts to `sink`.
    pub fn new(sink: Box<dyn AlertSink>) -> Self {
        Self {
            aggregation: AggregationState::new(),
            window: SlidingWindow::new(),
            log: LogBuffer::new(),
            alerts: AlertDispatcher::new(sink),
            paused: false,
            rejected: 0,
            ticks: 0,
            session_id: Uuid::new_v4().to_string(),
            session_start: Utc::now(),
        }
    }

    /// Wrap this dashboard for sharing with a sampler or other threads.
    pub fn into_shared(self) -> SharedDashboard {
        Arc::new(Mutex::new(self))
    }

    /// Process one accepted event.
    ///
    /// Counters and the intensity window always update; the log only when not paused.
    pub fn handle(&mut self, event: PacketEvent) {
        self.aggregation.increment(event.label, event.alert);

        let mut alerted = false;
        if event.alert {
            self.window.record_alert();
            alerted = self.alerts.consider(event.label);
        }

        if !self.paused {
            self.log.insert_front(LogEntry::from_event(&event));
        }

        tracing::debug!(
            src = %event.source,
            label = %event.label,
            alert = event.alert,
            alerted,
            paused = self.paused,
            "Event processed"
        );
    }

    /// Validate and process one event from the wire.
    ///
    /// An unknown label is rejected before any state is touched and counted as rejected.
    pub fn handle_raw(&mut self, raw: RawPacketEvent) -> Result<(), UnknownLabelError> {
        match PacketEvent::try_from(raw) {
            Ok(event) => {
                self.handle(event);
                Ok(())
            }
            Err(e) => {
                self.rejected += 1;
                tracing::warn!("Rejected event: {}", e);
                Err(e)
            }
        }
    }

    /// Close the current intensity interval.
    pub fn tick(&mut self) -> u32 {
        let sample = self.window.tick();
        self.ticks += 1;
        tracing::debug!(sample, tick = self.ticks, "Intensity window sampled");
        sample
    }

    /// Stop adding rows to the log. Counters keep running.
    pub fn pause(&mut self) {
        if !self.paused {
            tracing::info!("Log feed paused");
        }
        self.paused = true;
    }

    pub fn resume(&mut self) {
        if self.paused {
            tracing::info!("Log feed resumed");
        }
        self.paused = false;
    }

    /// Flip the pause flag, returning the new state.
    pub fn toggle_pause(&mut self) -> bool {
        if self.paused {
            self.resume();
        } else {
            self.pause();
        }
        self.paused
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Wipe the log. Counters and the intensity window are untouched.
    ///
    /// The caller owns confirmation; this executes unconditionally.
    pub fn clear_log(&mut self) {
        let dropped = self.log.len();
        self.log.clear();
        tracing::info!("Cleared {} log rows", dropped);
    }

    pub fn aggregation(&self) -> &AggregationState {
        &self.aggregation
    }

    pub fn window(&self) -> &SlidingWindow {
        &self.window
    }

    pub fn log(&self) -> &LogBuffer {
        &self.log
    }

    pub fn rejected(&self) -> u64 {
        self.rejected
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Consistent copy of everything a rendering consumer needs.
    pub fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot {
            session_id: self.session_id.clone(),
            categories: self.aggregation.snapshot(),
            intensity: self.window.snapshot(),
            log: self.log.all(),
            paused: self.paused,
            rejected: self.rejected,
            alerts_dispatched: self.alerts.dispatched(),
            taken_at: Utc::now(),
        }
    }

    /// Get a summary string for display.
    pub fn summary(&self) -> String {
        let categories = self.aggregation.snapshot();
        let breakdown: Vec<String> = categories
            .counts
            .iter()
            .map(|c| format!("{}: {}", c.label, c.count))
            .collect();

        format!(
            "Session Statistics:\n\
             - Session: {}\n\
             - Packets processed: {}\n\
             - Threats flagged: {}\n\
             - Audible alerts: {}\n\
             - Rejected events: {}\n\
             - Intensity samples: {}\n\
             - Log rows visible: {}\n\
             - Session duration: {} seconds\n\
             \n\
             Breakdown: {}",
            self.session_id,
            categories.total,
            categories.threats,
            self.alerts.dispatched(),
            self.rejected,
            self.ticks,
            self.log.len(),
            (Utc::now() - self.session_start).num_seconds(),
            breakdown.join(", ")
        )
    }
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new(Box::new(crate::core::alert::NullSink))
    }
}

/// Read-only copy of the dashboard for rendering consumers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub session_id: String,
    pub categories: CategorySnapshot,
    /// Intensity samples, oldest first
    pub intensity: Vec<u32>,
    /// Log rows, most recent first
    pub log: Vec<LogEntry>,
    pub paused: bool,
    pub rejected: u64,
    pub alerts_dispatched: u64,
    pub taken_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::alert::{AlertSignal, ChannelSink};
    use crate::core::log_buffer::LOG_CAPACITY;
    use crate::core::window::INTENSITY_WINDOW_LEN;
    use crate::event::types::{ClassificationLabel, RiskLevel};
    use crossbeam_channel::{unbounded, Receiver};

    fn dashboard_with_channel() -> (Dashboard, Receiver<AlertSignal>) {
        let (tx, rx) = unbounded();
        (Dashboard::new(Box::new(ChannelSink::new(tx))), rx)
    }

    fn event(label: ClassificationLabel, alert: bool) -> PacketEvent {
        PacketEvent::new("12:00:01", "10.0.0.1", label, alert)
    }

    #[test]
    fn test_handle_updates_all_components() {
        let (mut dashboard, rx) = dashboard_with_channel();
        dashboard.handle(event(ClassificationLabel::DoS, true));

        let snapshot = dashboard.snapshot();
        assert_eq!(snapshot.categories.total, 1);
        assert_eq!(snapshot.categories.threats, 1);
        assert_eq!(dashboard.window().pending(), 1);
        assert_eq!(snapshot.log.len(), 1);
        assert_eq!(snapshot.log[0].risk, RiskLevel::High);
        assert_eq!(rx.try_iter().count(), 1);
    }

    #[test]
    fn test_benign_alert_counts_threat_without_sound() {
        let (mut dashboard, rx) = dashboard_with_channel();
        dashboard.handle(event(ClassificationLabel::Benign, true));

        assert_eq!(dashboard.aggregation().threats(), 1);
        assert_eq!(dashboard.window().pending(), 1);
        assert_eq!(rx.try_iter().count(), 0);
    }

    #[test]
    fn test_unflagged_event_never_alerts() {
        let (mut dashboard, rx) = dashboard_with_channel();
        dashboard.handle(event(ClassificationLabel::U2R, false));

        assert_eq!(dashboard.aggregation().threats(), 0);
        assert_eq!(dashboard.window().pending(), 0);
        assert_eq!(dashboard.log().all()[0].risk, RiskLevel::Low);
        assert_eq!(rx.try_iter().count(), 0);
    }

    #[test]
    fn test_pause_suppresses_log_only() {
        let (mut dashboard, rx) = dashboard_with_channel();
        dashboard.handle(event(ClassificationLabel::Benign, false));
        dashboard.pause();
        let frozen = dashboard.log().all();

        dashboard.handle(event(ClassificationLabel::R2L, true));
        dashboard.handle(event(ClassificationLabel::Probe, false));

        assert_eq!(dashboard.log().all(), frozen);
        assert_eq!(dashboard.aggregation().total(), 3);
        assert_eq!(dashboard.window().pending(), 1);
        assert_eq!(rx.try_iter().count(), 1);

        dashboard.resume();
        dashboard.handle(event(ClassificationLabel::DoS, true));
        assert_eq!(dashboard.log().len(), 2);
        assert_eq!(dashboard.log().all()[0].label, ClassificationLabel::DoS);
    }

    #[test]
    fn test_toggle_pause() {
        let mut dashboard = Dashboard::default();
        assert!(dashboard.toggle_pause());
        assert!(dashboard.is_paused());
        assert!(!dashboard.toggle_pause());
        dashboard.resume();
        assert!(!dashboard.is_paused());
    }

    #[test]
    fn test_clear_log_keeps_counters() {
        let mut dashboard = Dashboard::default();
        for _ in 0..5 {
            dashboard.handle(event(ClassificationLabel::Probe, true));
        }
        let counts = dashboard.aggregation().snapshot();
        let pending = dashboard.window().pending();

        dashboard.clear_log();

        assert!(dashboard.log().is_empty());
        assert_eq!(dashboard.aggregation().snapshot(), counts);
        assert_eq!(dashboard.window().pending(), pending);
    }

    #[test]
    fn test_unknown_label_rejected_without_side_effects() {
        let (mut dashboard, rx) = dashboard_with_channel();
        let raw = RawPacketEvent {
            time: "12:00:01".to_string(),
            src: "10.0.0.1".to_string(),
            dst: None,
            label: "Worm".to_string(),
            alert: true,
        };

        let err = dashboard.handle_raw(raw).unwrap_err();
        assert_eq!(err.0, "Worm");
        assert_eq!(dashboard.rejected(), 1);
        assert_eq!(dashboard.aggregation().total(), 0);
        assert_eq!(dashboard.aggregation().threats(), 0);
        assert_eq!(dashboard.window().pending(), 0);
        assert!(dashboard.log().is_empty());
        assert_eq!(rx.try_iter().count(), 0);
    }

    #[test]
    fn test_invariants_over_long_run() {
        let mut dashboard = Dashboard::default();
        for i in 0..500u64 {
            let label = ClassificationLabel::ALL[(i % 5) as usize];
            dashboard.handle(event(label, i % 3 == 0));
            if i % 7 == 0 {
                dashboard.tick();
            }

            let snapshot = dashboard.snapshot();
            assert_eq!(
                snapshot.categories.values().iter().sum::<u64>(),
                snapshot.categories.total
            );
            assert!(snapshot.categories.threats <= snapshot.categories.total);
            assert_eq!(snapshot.intensity.len(), INTENSITY_WINDOW_LEN);
            assert!(snapshot.log.len() <= LOG_CAPACITY);
        }
        assert_eq!(dashboard.aggregation().total(), 500);
    }

    #[test]
    fn test_tick_moves_pending_into_window() {
        let mut dashboard = Dashboard::default();
        dashboard.handle(event(ClassificationLabel::DoS, true));
        dashboard.handle(event(ClassificationLabel::DoS, true));

        assert_eq!(dashboard.tick(), 2);
        dashboard.handle(event(ClassificationLabel::DoS, true));

        let intensity = dashboard.snapshot().intensity;
        assert_eq!(intensity[INTENSITY_WINDOW_LEN - 1], 2);
        assert_eq!(dashboard.window().pending(), 1);
        assert_eq!(dashboard.ticks(), 1);
    }

    #[test]
    fn test_summary_format() {
        let mut dashboard = Dashboard::default();
        dashboard.handle(event(ClassificationLabel::DoS, true));
        let summary = dashboard.summary();

        assert!(summary.contains("Packets processed: 1"));
        assert!(summary.contains("Threats flagged: 1"));
        assert!(summary.contains("DoS: 1"));
    }
}
