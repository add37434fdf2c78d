//! Aggregate engagement numbers for the dashboard.

use crate::auth::AuthenticatedUser;
use crate::error::ApiError;
use crate::state::AppState;
use axum::Json;
use axum::extract::{Query, State};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct SummaryQuery {
    /// Window length; defaults to 30, clamped to one year
    #[serde(default)]
    pub days: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    pub period_days: i64,
    pub sends: i64,
    pub opens: i64,
    pub clicks: i64,
    pub open_rate: f64,
    pub click_rate: f64,
}

/// `GET /api/analytics/summary?days=N`
///
/// Rates are per sent delivery, not per recipient, and report zero rather
/// than dividing by a zero send count.
pub async fn summary(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<SummaryResponse>, ApiError> {
    let period_days = query.days.unwrap_or(30).clamp(1, 365);
    let since = Utc::now() - Duration::days(period_days);
    let counts = state.store.delivery_summary(&user.0, since).await?;

    let rate = |events: i64| {
        if counts.sends > 0 {
            events as f64 / counts.sends as f64
        } else {
            0.0
        }
    };

    Ok(Json(SummaryResponse {
        period_days,
        sends: counts.sends,
        opens: counts.opens,
        clicks: counts.clicks,
        open_rate: rate(counts.opens),
        click_rate: rate(counts.clicks),
    }))
}
