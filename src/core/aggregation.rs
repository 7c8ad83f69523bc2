//! Per-category event counters for the session.

use crate::event::types::ClassificationLabel;
use serde::{Deserialize, Serialize};

/// Running counts for the session.
///
/// Counts only ever grow; there is no decrement or reset.
#[derive(Debug, Clone, Default)]
pub struct AggregationState {
    counts: [u64; ClassificationLabel::ALL.len()],
    total: u64,
    threats: u64,
}

impl AggregationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one event under `label`, and as a threat when `alert` is set.
    ///
    /// Threats are only counted alongside their event, so `threats <= total` always holds.
    pub fn increment(&mut self, label: ClassificationLabel, alert: bool) {
        self.counts[label.index()] += 1;
        self.total += 1;
        if alert {
            self.threats += 1;
        }
    }

    pub fn count(&self, label: ClassificationLabel) -> u64 {
        self.counts[label.index()]
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn threats(&self) -> u64 {
        self.threats
    }

    /// Copy of the five counts in enumeration order.
    pub fn snapshot(&self) -> CategorySnapshot {
        CategorySnapshot {
            counts: ClassificationLabel::ALL
                .iter()
                .map(|&label| CategoryCount {
                    label,
                    count: self.count(label),
                })
                .collect(),
            total: self.total,
            threats: self.threats,
        }
    }
}

/// One label's count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub label: ClassificationLabel,
    pub count: u64,
}

/// Read-only view of [`AggregationState`] for rendering consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySnapshot {
    /// Always five entries, in enumeration order
    pub counts: Vec<CategoryCount>,
    pub total: u64,
    pub threats: u64,
}

impl CategorySnapshot {
    /// Just the counts, in enumeration order.
    pub fn values(&self) -> Vec<u64> {
        self.counts.iter().map(|c| c.count).collect()
    }
}
