//! Router assembly.

use crate::routes::{analytics, billing, drafts, generate, limits, send, track, waitlist};
use crate::state::AppState;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};

/// Build the application router over the shared state.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/generate", post(generate::generate_copy))
        .route("/api/emails", post(drafts::save_draft).get(drafts::list_drafts))
        .route("/api/emails/:id", get(drafts::get_draft))
        .route("/api/limits", get(limits::limits))
        .route("/api/send", post(send::send))
        .route("/api/analytics/summary", get(analytics::summary))
        .route("/api/billing/checkout", post(billing::checkout))
        .route("/api/stripe/webhook", post(billing::webhook))
        .route("/api/waitlist", post(waitlist::join))
        .route("/o/:pixel", get(track::open_pixel))
        .route("/r", get(track::click_redirect))
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
