//! Inbound side of the dashboard.
//!
//! This module defines the classified packet events the core consumes and the
//! feed that delivers them over a channel.

pub mod feed;
pub mod types;

// Re-export commonly used types
pub use feed::{synthetic_event, EventFeed, FeedError};
pub use types::{ClassificationLabel, PacketEvent, RawPacketEvent, RiskLevel, UnknownLabelError};
