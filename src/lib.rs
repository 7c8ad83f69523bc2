//! NIDS Live Core - live state for a network intrusion monitoring dashboard.
//!
//! This library turns a stream of classified packet events into the aggregated,
//! bounded and windowed state that charts, tables, alert tones and CSV reports are
//! built from. It renders nothing and plays nothing itself.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        NIDS Live Core                        │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐   ┌─────────────┐   ┌──────────────────┐    │
//! │  │  EventFeed  │──▶│  Dashboard  │──▶│ AggregationState │    │
//! │  │ (channel)   │   │ (ingestor)  │   │ SlidingWindow    │    │
//! │  └─────────────┘   └─────────────┘   │ LogBuffer        │    │
//! │                       │      ▲       └──────────────────┘    │
//! │                       ▼      │                │              │
//! │  ┌─────────────┐   ┌─────────────┐   ┌──────────────────┐    │
//! │  │  AlertSink  │◀──│  Dispatcher │   │  ReportExporter  │    │
//! │  │  (audio)    │   │   Sampler   │   │      (CSV)       │    │
//! │  └─────────────┘   └─────────────┘   └──────────────────┘    │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use nids_live_core::{ClassificationLabel, Dashboard, PacketEvent, ReportExporter};
//!
//! let mut dashboard = Dashboard::default();
//! dashboard.handle(PacketEvent::new("12:00:01", "10.0.0.1", ClassificationLabel::DoS, true));
//!
//! let csv = ReportExporter::default()
//!     .export(dashboard.log())
//!     .expect("log has one row");
//! println!("{csv}");
//! ```

pub mod config;
pub mod core;
pub mod event;

// Re-export key types at crate root for convenience
pub use config::{Config, ConfigError};
pub use self::core::{
    should_alert, AggregationState, AlertDispatcher, AlertSignal, AlertSink, Dashboard,
    DashboardSnapshot, ExportError, LogBuffer, LogEntry, ReportExporter, Sampler, SamplerHandle,
    SharedDashboard, SlidingWindow,
};
pub use event::{ClassificationLabel, EventFeed, PacketEvent, RawPacketEvent, RiskLevel};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crate_root_exports() {
        let mut dashboard = Dashboard::default();
        dashboard.handle(PacketEvent::new(
            "12:00:01",
            "10.0.0.1",
            ClassificationLabel::DoS,
            true,
        ));
        assert!(ReportExporter::default().export(dashboard.log()).is_ok());
        assert!(!VERSION.is_empty());
    }
}
