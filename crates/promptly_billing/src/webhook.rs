//! Webhook signature verification and event handling.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use promptly_core::Plan;
use promptly_error::{BillingError, BillingErrorKind};
use serde::Deserialize;
use sha2::Sha256;
use std::collections::HashMap;
use tracing::{debug, warn};

type HmacSha256 = Hmac<Sha256>;

/// Maximum accepted age of a signed webhook timestamp.
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

/// Verify a `Stripe-Signature` header against the raw request payload.
///
/// The header carries `t=<unix ts>,v1=<hex hmac>[,v1=…]`; the signed message
/// is `{t}.{payload}` keyed with the endpoint secret. Timestamps outside the
/// tolerance window are rejected to limit replay.
///
/// # Errors
///
/// Returns an error when the header is malformed, the timestamp is stale, or
/// no candidate signature matches.
pub fn verify_signature(
    payload: &str,
    header: &str,
    secret: &str,
    now: DateTime<Utc>,
) -> Result<(), BillingError> {
    let mut timestamp = "";
    let mut candidates: Vec<&str> = Vec::new();

    for part in header.split(',') {
        if let Some((key, value)) = part.split_once('=') {
            match key.trim() {
                "t" => timestamp = value,
                "v1" => candidates.push(value),
                _ => {}
            }
        }
    }

    if timestamp.is_empty() || candidates.is_empty() {
        return Err(BillingError::new(BillingErrorKind::MissingSignature));
    }

    let ts: i64 = timestamp
        .parse()
        .map_err(|_| BillingError::new(BillingErrorKind::InvalidSignature))?;
    let age_secs = (now.timestamp() - ts).abs();
    if age_secs > SIGNATURE_TOLERANCE_SECS {
        warn!(age_secs, "Webhook timestamp outside tolerance");
        return Err(BillingError::new(BillingErrorKind::StaleTimestamp {
            age_secs,
        }));
    }

    let signed_payload = format!("{timestamp}.{payload}");
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| BillingError::new(BillingErrorKind::InvalidSignature))?;
    mac.update(signed_payload.as_bytes());
    let expected = hex::encode(mac.finalize().into_bytes());

    if candidates.iter().any(|candidate| *candidate == expected) {
        Ok(())
    } else {
        Err(BillingError::new(BillingErrorKind::InvalidSignature))
    }
}

/// Object payload inside a webhook event (subset of fields we act on).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventObject {
    /// Arbitrary metadata attached at session/subscription creation
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    /// Checkout sessions carry the user id here as a fallback
    #[serde(default)]
    pub client_reference_id: Option<String>,
    /// Subscription status (`canceled`, `active`, …)
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventData {
    #[serde(default)]
    pub object: EventObject,
}

/// A Stripe webhook event, reduced to what the plan logic needs.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeEvent {
    /// Event type, e.g. `checkout.session.completed`
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub data: EventData,
}

impl StripeEvent {
    /// Parse an event from the raw payload.
    ///
    /// # Errors
    ///
    /// Returns a parse error when the payload is not a Stripe event.
    pub fn from_payload(payload: &str) -> Result<Self, BillingError> {
        serde_json::from_str(payload)
            .map_err(|e| BillingError::new(BillingErrorKind::Parse(e.to_string())))
    }

    fn user_id(&self) -> Option<String> {
        self.data
            .object
            .metadata
            .get("userId")
            .cloned()
            .or_else(|| self.data.object.client_reference_id.clone())
            .filter(|id| !id.is_empty())
    }
}

/// A plan change derived from a webhook event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanUpdate {
    /// The user whose plan changes
    pub user_id: String,
    /// The plan to apply
    pub plan: Plan,
}

/// Map a webhook event to the plan change it implies, if any.
///
/// Checkout completion upgrades to pro; subscription deletion, or an update
/// landing in `canceled`, downgrades to free. Everything else is
/// acknowledged without action.
pub fn plan_update(event: &StripeEvent) -> Option<PlanUpdate> {
    match event.event_type.as_str() {
        "checkout.session.completed" => event.user_id().map(|user_id| PlanUpdate {
            user_id,
            plan: Plan::Pro,
        }),
        "customer.subscription.deleted" => event.user_id().map(|user_id| PlanUpdate {
            user_id,
            plan: Plan::Free,
        }),
        "customer.subscription.updated" => {
            if event.data.object.status.as_deref() == Some("canceled") {
                event.user_id().map(|user_id| PlanUpdate {
                    user_id,
                    plan: Plan::Free,
                })
            } else {
                None
            }
        }
        other => {
            debug!(event_type = %other, "Unhandled webhook event type");
            None
        }
    }
}
