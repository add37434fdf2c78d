//! Quota introspection endpoint.

use crate::auth::AuthenticatedUser;
use crate::error::ApiError;
use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use chrono::Utc;
use promptly_core::Plan;
use promptly_quota::{FREE_DAILY_GENERATIONS, remaining_today};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct LimitsResponse {
    pub plan: Plan,
    /// Generations left today; `-1` means unlimited
    pub left: i64,
}

/// `GET /api/limits`
///
/// Read-only: a user without a profile row is reported at the full free cap
/// without creating one.
pub async fn limits(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<LimitsResponse>, ApiError> {
    let response = match state.store.find_profile(&user.0).await? {
        Some(profile) => LimitsResponse {
            plan: profile.plan(),
            left: remaining_today(&profile.quota_state(), Utc::now()).as_api_value(),
        },
        None => LimitsResponse {
            plan: Plan::Free,
            left: i64::from(FREE_DAILY_GENERATIONS),
        },
    };
    Ok(Json(response))
}
