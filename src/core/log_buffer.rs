//! Bounded, most-recent-first log of display rows.

use crate::event::types::{ClassificationLabel, PacketEvent, RiskLevel};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Maximum number of rows kept in the log.
pub const LOG_CAPACITY: usize = 25;

/// One row of the recent-activity table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub source: String,
    pub label: ClassificationLabel,
    pub risk: RiskLevel,
}

impl LogEntry {
    pub fn from_event(event: &PacketEvent) -> Self {
        Self {
            timestamp: event.timestamp.clone(),
            source: event.source.clone(),
            label: event.label,
            risk: event.risk(),
        }
    }

    /// Whether a renderer should draw this row as a threat.
    pub fn is_highlighted(&self) -> bool {
        self.risk == RiskLevel::High
    }
}

/// Recent rows, newest at index 0.
#[derive(Debug, Clone, Default)]
pub struct LogBuffer {
    entries: VecDeque<LogEntry>,
}

impl LogBuffer {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::with_capacity(LOG_CAPACITY + 1),
        }
    }

    /// Insert a row at the front, evicting the oldest row beyond capacity.
    pub fn insert_front(&mut self, entry: LogEntry) {
        self.entries.push_front(entry);
        self.entries.truncate(LOG_CAPACITY);
    }

    /// Drop every row.
    ///
    /// Callers are expected to have confirmed the wipe with the user.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Iterate rows in display order (most recent first).
    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    /// Copy of all rows in display order.
    pub fn all(&self) -> Vec<LogEntry> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
