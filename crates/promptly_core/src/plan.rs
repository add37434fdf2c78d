//! Subscription plan types.

use serde::{Deserialize, Serialize};

/// Subscription plan for a user profile.
///
/// Plans are persisted as lowercase text and default to `free` for any
/// profile that has never been through checkout.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Plan {
    /// Free tier, subject to the daily generation cap.
    #[default]
    Free,
    /// Paid tier, unlimited generation and live sending.
    Pro,
}

impl Plan {
    /// True when live sending and unlimited generation are allowed.
    pub fn is_pro(&self) -> bool {
        matches!(self, Plan::Pro)
    }
}
