use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::HeaderMap,
};
use chrono::Utc;

use crate::{
    error::{AppError, AppResult},
    payments::webhook::{self, DEFAULT_TOLERANCE_SECS, SIGNATURE_HEADER, WebhookEvent},
    services::checkout_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/webhook", axum::routing::post(stripe_webhook))
}

// The signature covers the raw bytes, so the body must not go through the
// Json extractor first.
#[utoipa::path(
    post,
    path = "/api/webhook",
    request_body(content = String, content_type = "application/json"),
    responses(
        (status = 200, description = "Event processed"),
        (status = 400, description = "Invalid signature or payload"),
    ),
    tag = "webhooks"
)]
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<serde_json::Value>> {
    let header = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::BadRequest("Missing signature header".into()))?;

    webhook::verify_signature(
        &state.config.stripe_webhook_secret,
        header,
        &body,
        Utc::now().timestamp(),
        DEFAULT_TOLERANCE_SECS,
    )
    .map_err(|err| {
        tracing::warn!(error = %err, "webhook signature rejected");
        AppError::BadRequest("Invalid signature".into())
    })?;

    let event: WebhookEvent = serde_json::from_slice(&body)
        .map_err(|_| AppError::BadRequest("Invalid payload".into()))?;

    checkout_service::handle_webhook_event(&state, event).await?;

    Ok(Json(serde_json::json!({ "received": true })))
}
