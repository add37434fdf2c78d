//! Stripe webhook and checkout endpoints.

use crate::auth::AuthenticatedUser;
use crate::error::ApiError;
use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use chrono::Utc;
use promptly_billing::{StripeClient, StripeEvent, plan_update, verify_signature};
use serde::Serialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{info, instrument};

fn stripe_client(state: &AppState) -> Result<&Arc<StripeClient>, ApiError> {
    state
        .stripe
        .as_ref()
        .ok_or_else(|| ApiError::Internal("Stripe is not configured".to_string()))
}

/// `POST /api/stripe/webhook`
///
/// Verifies the signature against the raw payload before any parsing.
/// Events that imply no plan change are acknowledged without action, so
/// Stripe does not retry them.
#[instrument(skip_all)]
pub async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: String,
) -> Result<Json<Value>, ApiError> {
    let stripe = stripe_client(&state)?;
    let signature = headers
        .get("stripe-signature")
        .and_then(|value| value.to_str().ok())
        .ok_or(ApiError::InvalidSignature)?;
    verify_signature(&payload, signature, stripe.webhook_secret(), Utc::now())?;

    let event = StripeEvent::from_payload(&payload)?;
    if let Some(update) = plan_update(&event) {
        state.store.set_plan(&update.user_id, update.plan).await?;
        info!(user_id = %update.user_id, plan = %update.plan, "Applied plan change");
    }

    Ok(Json(json!({ "received": true })))
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub session_id: String,
    pub url: Option<String>,
}

/// `POST /api/billing/checkout`
#[instrument(skip(state), fields(user_id = %user.0))]
pub async fn checkout(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<CheckoutResponse>, ApiError> {
    let stripe = stripe_client(&state)?;
    let session = stripe.create_checkout_session(&user.0).await?;
    Ok(Json(CheckoutResponse {
        session_id: session.id().clone(),
        url: session.url().clone(),
    }))
}
