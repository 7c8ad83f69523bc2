//! Core state of the monitoring dashboard.
//!
//! This module contains:
//! - Per-category counters for the session
//! - The timer-sampled intensity window and its sampler task
//! - The bounded recent-activity log
//! - Alert policy and the audio boundary
//! - The dashboard that ingests events into all of the above
//! - CSV report export

pub mod aggregation;
pub mod alert;
pub mod dashboard;
pub mod export;
pub mod log_buffer;
pub mod window;

// Re-export commonly used types
pub use aggregation::{AggregationState, CategoryCount, CategorySnapshot};
pub use alert::{
    should_alert, AlertDispatcher, AlertSignal, AlertSink, BellSink, ChannelSink, NullSink,
    ToneCue, Waveform,
};
pub use dashboard::{Dashboard, DashboardSnapshot, SharedDashboard};
pub use export::{render_csv, report_filename, ExportError, ReportExporter, REPORT_HEADER};
pub use log_buffer::{LogBuffer, LogEntry, LOG_CAPACITY};
pub use window::{
    Sampler, SamplerHandle, SlidingWindow, DEFAULT_SAMPLE_PERIOD, INTENSITY_WINDOW_LEN,
};
