//! Status enums for drafts, deliveries, and tracking events.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a saved draft.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DraftStatus {
    /// Saved and editable, not yet sent.
    #[default]
    Draft,
    /// At least one live delivery has gone out.
    Sent,
    /// A deferred delivery exists for this draft.
    Scheduled,
}

/// State of one concrete delivery attempt.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DeliveryStatus {
    /// The transport accepted the message (or is about to; see dispatcher).
    Sent,
    /// Recorded for a future send; claimed later by the scheduler.
    Scheduled,
    /// A claimed scheduled delivery whose transport call failed.
    Failed,
}

/// Kind of tracking event observed for a delivery.
///
/// Serialized uppercase (`OPEN`/`CLICK`) both on the wire and in storage.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum EventType {
    /// The tracking pixel was fetched.
    Open,
    /// A rewritten link was followed.
    Click,
}

/// Whether a dispatch targets real recipients or a single test address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchMode {
    /// Single test recipient, no plan gate, subject prefixed `[TEST]`.
    Test,
    /// Real recipient list, pro plan required.
    Live,
}

/// Outcome reported to the client after a dispatch request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryDisposition {
    /// Immediate live send handed to the transport.
    Sent,
    /// Immediate test send handed to the transport.
    SentTest,
    /// Live send recorded for a future time.
    Scheduled,
    /// Test send recorded for a future time.
    ScheduledTest,
}
