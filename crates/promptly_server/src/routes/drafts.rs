//! Draft persistence endpoints.

use crate::auth::AuthenticatedUser;
use crate::error::ApiError;
use crate::state::AppState;
use axum::Json;
use axum::extract::{Path, State};
use chrono::{DateTime, Utc};
use promptly_core::DraftStatus;
use promptly_database::DraftRow;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::instrument;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveDraftRequest {
    /// Present for updates, absent for creates
    #[serde(default)]
    pub email_id: Option<Uuid>,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftResponse {
    pub email_id: Uuid,
    pub subject: String,
    pub body: String,
    pub status: DraftStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<DraftRow> for DraftResponse {
    fn from(row: DraftRow) -> Self {
        Self {
            email_id: row.id,
            status: row.status(),
            subject: row.subject,
            body: row.body,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// `POST /api/emails`
///
/// Creates a draft, or updates one the caller owns when `emailId` is given.
/// Edits keep the draft's current status.
#[instrument(skip(state, request), fields(user_id = %user.0))]
pub async fn save_draft(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Json(request): Json<SaveDraftRequest>,
) -> Result<Json<Value>, ApiError> {
    let subject = request.subject.trim();
    let body = request.body.trim();
    if subject.is_empty() || body.is_empty() {
        return Err(ApiError::Validation(
            "Subject and body are required".to_string(),
        ));
    }

    let draft = match request.email_id {
        Some(draft_id) => {
            let existing = state
                .store
                .find_draft(draft_id, &user.0)
                .await?
                .ok_or_else(|| ApiError::NotFound("Email not found".to_string()))?;
            state
                .store
                .update_draft(draft_id, &user.0, subject, body, existing.status())
                .await?
        }
        None => state.store.create_draft(&user.0, subject, body).await?,
    };

    Ok(Json(json!({ "emailId": draft.id })))
}

/// `GET /api/emails`
pub async fn list_drafts(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<DraftResponse>>, ApiError> {
    let drafts = state.store.list_drafts(&user.0).await?;
    Ok(Json(drafts.into_iter().map(DraftResponse::from).collect()))
}

/// `GET /api/emails/{id}`
pub async fn get_draft(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(draft_id): Path<Uuid>,
) -> Result<Json<DraftResponse>, ApiError> {
    let draft = state
        .store
        .find_draft(draft_id, &user.0)
        .await?
        .ok_or_else(|| ApiError::NotFound("Email not found".to_string()))?;
    Ok(Json(draft.into()))
}
