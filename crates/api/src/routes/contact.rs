use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use chrono::{DateTime, Utc};
use jasiri_core::contact::ContactSubmission;
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/contact", post(submit))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Received {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
struct ContactResponse {
    success: bool,
    message: &'static str,
    data: Received,
}

/// First `X-Forwarded-For` hop, then `X-Real-IP`.
pub(crate) fn client_ip(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .or_else(|| headers.get("x-real-ip"))
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

async fn submit(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<ContactSubmission>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let ip = client_ip(&headers);
    if !state.contact_limiter().check(&ip) {
        tracing::warn!(client_ip = %ip, "contact form rate limited");
        return Err(ApiError::TooManyRequests);
    }

    let Json(submission) =
        body.map_err(|_| ApiError::BadRequest("Invalid request format".to_string()))?;

    let errors = submission.validate();
    if !errors.is_empty() {
        let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
        return Err(ApiError::Validation {
            message: "Validation failed".to_string(),
            details: json!(messages),
        });
    }

    if submission.is_suspicious() {
        tracing::warn!(client_ip = %ip, "suspicious contact form submission");
        return Err(ApiError::BadRequest(
            "Message could not be processed. Please contact us directly.".to_string(),
        ));
    }

    let message = submission.into_message(Utc::now());
    state.contacts().insert_contact(&message).await?;
    tracing::info!(message_id = %message.id, client_ip = %ip, "contact message stored");

    Ok((
        StatusCode::CREATED,
        Json(ContactResponse {
            success: true,
            message: "Message sent successfully!",
            data: Received {
                id: message.id,
                timestamp: message.created_at,
            },
        }),
    ))
}
