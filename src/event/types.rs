//! Classified packet events as delivered by the capture side.
//!
//! The classifier has already run by the time an event reaches us; these types only
//! carry its verdict (label + alert flag) together with the display fields.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Risk category assigned to a packet by the classifier.
///
/// The variant order is the enumeration order used by every snapshot.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ClassificationLabel {
    Benign,
    Probe,
    DoS,
    R2L,
    U2R,
}

impl ClassificationLabel {
    /// All labels in enumeration order.
    pub const ALL: [ClassificationLabel; 5] = [
        ClassificationLabel::Benign,
        ClassificationLabel::Probe,
        ClassificationLabel::DoS,
        ClassificationLabel::R2L,
        ClassificationLabel::U2R,
    ];

    /// Display name, as shown in the log table and the CSV report.
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassificationLabel::Benign => "Benign",
            ClassificationLabel::Probe => "Probe",
            ClassificationLabel::DoS => "DoS",
            ClassificationLabel::R2L => "R2L",
            ClassificationLabel::U2R => "U2R",
        }
    }

    /// Position of this label in [`ClassificationLabel::ALL`].
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Map a classifier output class (0..=4) to its label.
    pub fn from_class_index(index: u8) -> Result<Self, UnknownLabelError> {
        Self::ALL
            .get(index as usize)
            .copied()
            .ok_or_else(|| UnknownLabelError(index.to_string()))
    }

    /// Labels that never warrant an audible cue.
    pub fn is_low_risk(&self) -> bool {
        matches!(self, ClassificationLabel::Benign | ClassificationLabel::Probe)
    }
}

impl fmt::Display for ClassificationLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClassificationLabel {
    type Err = UnknownLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|label| label.as_str() == s)
            .copied()
            .ok_or_else(|| UnknownLabelError(s.to_string()))
    }
}

/// An inbound label outside the closed enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLabelError(pub String);

impl fmt::Display for UnknownLabelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown classification label: {:?}", self.0)
    }
}

impl std::error::Error for UnknownLabelError {}

/// Derived per-row risk tag: HIGH iff the event's alert flag was set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    High,
    Low,
}

impl RiskLevel {
    pub fn from_alert(alert: bool) -> Self {
        if alert {
            RiskLevel::High
        } else {
            RiskLevel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::High => "HIGH",
            RiskLevel::Low => "LOW",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One observed and classified packet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacketEvent {
    /// Display timestamp (e.g. `12:00:01`)
    pub timestamp: String,
    /// Source address
    pub source: String,
    /// Destination address, carried through but never displayed
    pub destination: Option<String>,
    /// Classifier verdict
    pub label: ClassificationLabel,
    /// Whether the classifier considers this packet notable
    pub alert: bool,
}

impl PacketEvent {
    pub fn new(
        timestamp: impl Into<String>,
        source: impl Into<String>,
        label: ClassificationLabel,
        alert: bool,
    ) -> Self {
        Self {
            timestamp: timestamp.into(),
            source: source.into(),
            destination: None,
            label,
            alert,
        }
    }

    /// Build an event from a raw classifier prediction.
    ///
    /// Every class other than 0 (benign) raises the alert flag.
    pub fn from_prediction(
        timestamp: impl Into<String>,
        source: impl Into<String>,
        destination: Option<String>,
        class_index: u8,
    ) -> Result<Self, UnknownLabelError> {
        let label = ClassificationLabel::from_class_index(class_index)?;
        Ok(Self {
            timestamp: timestamp.into(),
            source: source.into(),
            destination,
            label,
            alert: class_index != 0,
        })
    }

    pub fn risk(&self) -> RiskLevel {
        RiskLevel::from_alert(self.alert)
    }
}

/// Wire shape of an inbound event, before the label is validated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawPacketEvent {
    pub time: String,
    pub src: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dst: Option<String>,
    pub label: String,
    pub alert: bool,
}

impl TryFrom<RawPacketEvent> for PacketEvent {
    type Error = UnknownLabelError;

    fn try_from(raw: RawPacketEvent) -> Result<Self, Self::Error> {
        let label = raw.label.parse()?;
        Ok(Self {
            timestamp: raw.time,
            source: raw.src,
            destination: raw.dst,
            label,
            alert: raw.alert,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_round_trips_display_name() {
        for label in ClassificationLabel::ALL {
            assert_eq!(label.as_str().parse::<ClassificationLabel>(), Ok(label));
        }
        assert_eq!(ClassificationLabel::DoS.to_string(), "DoS");
    }

    #[test]
    fn test_unknown_label_rejected() {
        let err = "dos".parse::<ClassificationLabel>().unwrap_err();
        assert_eq!(err, UnknownLabelError("dos".to_string()));
        assert!("Worm".parse::<ClassificationLabel>().is_err());
    }

    #[test]
    fn test_enumeration_order() {
        let indices: Vec<usize> = ClassificationLabel::ALL.iter().map(|l| l.index()).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_from_prediction() {
        let benign = PacketEvent::from_prediction("12:00:00", "10.0.0.1", None, 0).unwrap();
        assert_eq!(benign.label, ClassificationLabel::Benign);
        assert!(!benign.alert);

        let r2l =
            PacketEvent::from_prediction("12:00:00", "10.0.0.1", Some("10.0.0.2".into()), 3)
                .unwrap();
        assert_eq!(r2l.label, ClassificationLabel::R2L);
        assert!(r2l.alert);
        assert_eq!(r2l.risk(), RiskLevel::High);

        assert!(PacketEvent::from_prediction("12:00:00", "10.0.0.1", None, 5).is_err());
    }

    #[test]
    fn test_raw_event_conversion() {
        let raw: RawPacketEvent = serde_json::from_str(
            r#"{"time":"12:00:01","src":"10.0.0.1","dst":"10.0.0.9","label":"U2R","alert":true}"#,
        )
        .unwrap();
        let event = PacketEvent::try_from(raw).unwrap();
        assert_eq!(event.label, ClassificationLabel::U2R);
        assert_eq!(event.destination.as_deref(), Some("10.0.0.9"));

        let raw: RawPacketEvent =
            serde_json::from_str(r#"{"time":"t","src":"s","label":"Zero-day","alert":true}"#)
                .unwrap();
        assert!(PacketEvent::try_from(raw).is_err());
    }

    #[test]
    fn test_risk_level_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&RiskLevel::High).unwrap(), "\"HIGH\"");
        assert_eq!(RiskLevel::from_alert(false).to_string(), "LOW");
    }
}
