//! CSV report of the visible log.
//!
//! Rows are written in display order (most recent first), so the report mirrors the
//! table on screen rather than chronological order.

use crate::core::log_buffer::LogBuffer;
use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use std::path::{Path, PathBuf};

/// Header line of every report.
pub const REPORT_HEADER: &str = "Timestamp,Source IP,Classification,Risk Level";

/// Errors that can occur while exporting a report.
#[derive(Debug)]
pub enum ExportError {
    /// The log has no rows; nothing is produced.
    EmptyBuffer,
    IoError(String),
}

impl std::fmt::Display for ExportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportError::EmptyBuffer => write!(
                f,
                "No data available to export. Please wait for packets to be captured."
            ),
            ExportError::IoError(e) => write!(f, "IO error: {e}"),
        }
    }
}

impl std::error::Error for ExportError {}

/// Serializes a [`LogBuffer`] into a CSV artifact.
#[derive(Debug, Clone)]
pub struct ReportExporter {
    timezone: Tz,
}

impl ReportExporter {
    /// Create an exporter that dates reports in `timezone`.
    pub fn new(timezone: Tz) -> Self {
        Self { timezone }
    }

    /// Render the buffer as CSV text.
    pub fn export(&self, buffer: &LogBuffer) -> Result<String, ExportError> {
        render_csv(buffer)
    }

    /// Suggested file name for a report produced today.
    pub fn suggested_filename(&self) -> String {
        report_filename(self.today())
    }

    /// Today's date in the exporter's time zone.
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.timezone).date_naive()
    }

    /// Render the buffer and write it into `dir`.
    ///
    /// Returns the path of the written report. An empty buffer writes nothing.
    pub fn save(&self, buffer: &LogBuffer, dir: &Path) -> Result<PathBuf, ExportError> {
        let csv = self.export(buffer)?;
        self.write_csv(&csv, dir)
    }

    /// Write already rendered report text into `dir` under today's file name.
    ///
    /// Lets callers render while holding the dashboard and write after letting go of it.
    pub fn write_csv(&self, csv: &str, dir: &Path) -> Result<PathBuf, ExportError> {
        std::fs::create_dir_all(dir).map_err(|e| ExportError::IoError(e.to_string()))?;
        let path = dir.join(self.suggested_filename());
        std::fs::write(&path, csv).map_err(|e| ExportError::IoError(e.to_string()))?;

        tracing::info!(
            "Exported {} log rows to {:?}",
            csv.lines().count().saturating_sub(1),
            path
        );
        Ok(path)
    }
}

impl Default for ReportExporter {
    fn default() -> Self {
        Self::new(Tz::UTC)
    }
}

/// Render the buffer as CSV text, header first.
pub fn render_csv(buffer: &LogBuffer) -> Result<String, ExportError> {
    if buffer.is_empty() {
        return Err(ExportError::EmptyBuffer);
    }

    let mut csv = String::with_capacity(REPORT_HEADER.len() + 1 + buffer.len() * 48);
    csv.push_str(REPORT_HEADER);
    csv.push('\n');

    for entry in buffer.iter() {
        let fields = [
            entry.timestamp.as_str(),
            entry.source.as_str(),
            entry.label.as_str(),
            entry.risk.as_str(),
        ];
        let row: Vec<String> = fields.iter().map(|f| quote_field(f)).collect();
        csv.push_str(&row.join(","));
        csv.push('\n');
    }

    Ok(csv)
}

/// File name for a report dated `date`.
pub fn report_filename(date: NaiveDate) -> String {
    format!("NIDS_Threat_Report_{}.csv", date.format("%Y-%m-%d"))
}

fn quote_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::log_buffer::LogEntry;
    use crate::event::types::{ClassificationLabel, RiskLevel};

    fn row(time: &str, src: &str, label: ClassificationLabel, risk: RiskLevel) -> LogEntry {
        LogEntry {
            timestamp: time.to_string(),
            source: src.to_string(),
            label,
            risk,
        }
    }

    #[test]
    fn test_single_row_report() {
        let mut buffer = LogBuffer::new();
        buffer.insert_front(row(
            "12:00:01",
            "10.0.0.1",
            ClassificationLabel::DoS,
            RiskLevel::High,
        ));

        let csv = render_csv(&buffer).unwrap();
        assert_eq!(
            csv,
            "Timestamp,Source IP,Classification,Risk Level\n\"12:00:01\",\"10.0.0.1\",\"DoS\",\"HIGH\"\n"
        );
    }

    #[test]
    fn test_empty_buffer_fails() {
        let buffer = LogBuffer::new();
        assert!(matches!(render_csv(&buffer), Err(ExportError::EmptyBuffer)));
    }

    #[test]
    fn test_rows_follow_display_order() {
        let mut buffer = LogBuffer::new();
        buffer.insert_front(row("1", "a", ClassificationLabel::Benign, RiskLevel::Low));
        buffer.insert_front(row("2", "b", ClassificationLabel::R2L, RiskLevel::High));

        let csv = render_csv(&buffer).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "\"2\",\"b\",\"R2L\",\"HIGH\"");
        assert_eq!(lines[2], "\"1\",\"a\",\"Benign\",\"LOW\"");
    }

    #[test]
    fn test_quotes_are_doubled() {
        let mut buffer = LogBuffer::new();
        buffer.insert_front(row(
            "12:00",
            "host \"x\", y",
            ClassificationLabel::Probe,
            RiskLevel::High,
        ));

        let csv = render_csv(&buffer).unwrap();
        assert!(csv.contains("\"host \"\"x\"\", y\""));
    }

    #[test]
    fn test_report_filename() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(report_filename(date), "NIDS_Threat_Report_2024-03-07.csv");
    }

    #[test]
    fn test_save_writes_file() {
        let dir = std::env::temp_dir().join(format!("nids-export-test-{}", uuid::Uuid::new_v4()));
        let exporter = ReportExporter::default();

        let empty = LogBuffer::new();
        assert!(matches!(
            exporter.save(&empty, &dir),
            Err(ExportError::EmptyBuffer)
        ));
        assert!(!dir.exists());

        let mut buffer = LogBuffer::new();
        buffer.insert_front(row("t", "s", ClassificationLabel::U2R, RiskLevel::High));
        let path = exporter.save(&buffer, &dir).unwrap();

        assert!(path.ends_with(exporter.suggested_filename()));
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with(REPORT_HEADER));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_write_rendered_report_from_shared_dashboard() {
        use crate::core::dashboard::Dashboard;
        use crate::event::types::PacketEvent;

        let dir = std::env::temp_dir().join(format!("nids-export-test-{}", uuid::Uuid::new_v4()));
        let exporter = ReportExporter::default();
        let dashboard = Dashboard::default().into_shared();
        dashboard.lock().unwrap().handle(PacketEvent::new(
            "12:00:01",
            "10.0.0.1",
            ClassificationLabel::DoS,
            true,
        ));

        let csv = exporter.export(dashboard.lock().unwrap().log()).unwrap();
        // The lock is free again while the file is written.
        assert!(dashboard.try_lock().is_ok());
        let path = exporter.write_csv(&csv, &dir).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), csv);
        assert!(csv.ends_with("\"12:00:01\",\"10.0.0.1\",\"DoS\",\"HIGH\"\n"));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
