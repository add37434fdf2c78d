//! Copy generation endpoint with the daily quota gate.

use crate::auth::AuthenticatedUser;
use crate::error::ApiError;
use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use chrono::Utc;
use promptly_core::{Brief, CopySource};
use promptly_database::Store;
use promptly_generate::CopyGenerator;
use promptly_quota::{remaining_today, start_of_day, window_is_stale};
use serde::Serialize;
use tracing::instrument;

#[derive(Debug, Clone, Serialize)]
pub struct GenerateResponse {
    pub subject: String,
    pub body: String,
    pub source: CopySource,
    /// Generations left today; `-1` means unlimited
    pub remaining: i64,
}

/// `POST /api/generate`
#[instrument(skip(state, brief), fields(user_id = %user.0))]
pub async fn generate_copy(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(brief): Json<Brief>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let response =
        generate_for_user(state.store.as_ref(), state.generator.as_ref(), &user.0, &brief).await?;
    Ok(Json(response))
}

/// Run a generation for the user, enforcing the daily quota.
///
/// The quota check happens before the generator is invoked and the counter
/// is incremented only after a successful generation, so failures never
/// consume quota. A stale window is reset in place before the check so the
/// stored counter matches what the client is told.
pub async fn generate_for_user(
    store: &dyn Store,
    generator: &dyn CopyGenerator,
    user_id: &str,
    brief: &Brief,
) -> Result<GenerateResponse, ApiError> {
    let now = Utc::now();
    let window_start = start_of_day(now);

    let mut profile = store.ensure_profile(user_id, window_start).await?;
    if window_is_stale(profile.generation_period_start, now) {
        profile = store.reset_generation_window(user_id, window_start).await?;
    }

    if remaining_today(&profile.quota_state(), now).is_exhausted() {
        return Err(ApiError::LimitReached);
    }

    let copy = generator.generate(brief).await?;
    let profile = store.increment_generation_count(user_id).await?;
    let remaining = remaining_today(&profile.quota_state(), now).as_api_value();

    Ok(GenerateResponse {
        subject: copy.subject().clone(),
        body: copy.body().clone(),
        source: *copy.source(),
        remaining,
    })
}
