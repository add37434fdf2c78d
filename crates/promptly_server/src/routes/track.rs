//! Tracking endpoints: the open pixel and the click redirect.
//!
//! Both endpoints are unauthenticated by nature, they are fetched by mail
//! clients. Event writes are fire-and-forget; the pixel and the redirect are
//! served even when the delivery id is garbage or the write fails.

use crate::error::ApiError;
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use uuid::Uuid;

/// A 1x1 transparent GIF.
pub(crate) const PIXEL_GIF: &[u8] = &[
    0x47, 0x49, 0x46, 0x38, 0x39, 0x61, 0x01, 0x00, 0x01, 0x00, 0x80, 0x00, 0x00, 0x00, 0x00,
    0x00, 0xff, 0xff, 0xff, 0x21, 0xf9, 0x04, 0x01, 0x00, 0x00, 0x00, 0x00, 0x2c, 0x00, 0x00,
    0x00, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x02, 0x02, 0x44, 0x01, 0x00, 0x3b,
];

/// `GET /o/{deliveryId}.gif`
///
/// Always answers with the pixel; recording the OPEN is a side effect that
/// only happens when the path carries a well-formed delivery id.
pub async fn open_pixel(State(state): State<AppState>, Path(pixel): Path<String>) -> Response {
    if let Some(delivery_id) = pixel
        .strip_suffix(".gif")
        .and_then(|id| Uuid::parse_str(id).ok())
    {
        state.recorder.record_open(delivery_id);
    }
    (
        [
            (header::CONTENT_TYPE, "image/gif"),
            (
                header::CACHE_CONTROL,
                "no-store, no-cache, must-revalidate, max-age=0",
            ),
        ],
        PIXEL_GIF,
    )
        .into_response()
}

#[derive(Debug, Deserialize)]
pub struct ClickQuery {
    /// Delivery id
    #[serde(default)]
    d: Option<String>,
    /// Original target URL
    #[serde(default)]
    u: Option<String>,
}

/// `GET /r?d={deliveryId}&u={encodedUrl}`
///
/// 302 to the original target. The redirect goes out regardless of whether
/// the CLICK event lands.
pub async fn click_redirect(
    State(state): State<AppState>,
    Query(query): Query<ClickQuery>,
) -> Result<Response, ApiError> {
    let (Some(delivery_id), Some(target)) = (query.d, query.u) else {
        return Err(ApiError::Validation("Missing params".to_string()));
    };
    if target.is_empty() {
        return Err(ApiError::Validation("Missing params".to_string()));
    }

    if let Ok(delivery_id) = Uuid::parse_str(&delivery_id) {
        state.recorder.record_click(delivery_id, target.clone());
    }

    Ok((StatusCode::FOUND, [(header::LOCATION, target)]).into_response())
}
