//! Public waitlist signup.

use crate::error::ApiError;
use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use promptly_database::Store;
use regex::Regex;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::LazyLock;
use tracing::debug;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email pattern"));

#[derive(Debug, Clone, Deserialize)]
pub struct WaitlistRequest {
    #[serde(default)]
    pub email: String,
    /// Honeypot field; real clients leave it empty
    #[serde(default)]
    pub hp: Option<String>,
}

/// `POST /api/waitlist`
pub async fn join(
    State(state): State<AppState>,
    Json(request): Json<WaitlistRequest>,
) -> Result<Json<Value>, ApiError> {
    Ok(Json(join_waitlist(state.store.as_ref(), &request).await?))
}

/// Record a waitlist signup.
///
/// A filled honeypot gets the same success response as a real signup so bots
/// learn nothing; the address is simply dropped. Duplicate signups are also
/// reported as success.
pub async fn join_waitlist(
    store: &dyn Store,
    request: &WaitlistRequest,
) -> Result<Value, ApiError> {
    if request.hp.as_deref().is_some_and(|hp| !hp.is_empty()) {
        debug!("Dropping honeypot waitlist signup");
        return Ok(json!({ "ok": true }));
    }

    let email = request.email.trim().to_lowercase();
    if !EMAIL_RE.is_match(&email) {
        return Err(ApiError::Validation("Valid email required".to_string()));
    }

    store.add_waitlist_email(&email).await?;
    Ok(json!({ "ok": true }))
}
