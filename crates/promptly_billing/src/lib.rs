//! Stripe billing integration.
//!
//! Uses the Stripe REST API directly rather than an SDK: webhook signature
//! verification (HMAC-SHA256 over the raw payload), a small typed view of the
//! webhook events we act on, and checkout-session creation for upgrades.

mod checkout;
mod webhook;

pub use checkout::{CheckoutSession, StripeClient, StripeConfig};
pub use webhook::{
    PlanUpdate, SIGNATURE_TOLERANCE_SECS, StripeEvent, plan_update, verify_signature,
};
