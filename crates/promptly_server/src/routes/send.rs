//! Send endpoint; the real work lives in the dispatcher.

use crate::auth::AuthenticatedUser;
use crate::dispatch::{DispatchOutcome, DispatchRequest};
use crate::error::ApiError;
use crate::state::AppState;
use axum::Json;
use axum::extract::State;

/// `POST /api/send`
pub async fn send(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<DispatchRequest>,
) -> Result<Json<DispatchOutcome>, ApiError> {
    let outcome = state.dispatcher.dispatch(&user.0, &request).await?;
    Ok(Json(outcome))
}
