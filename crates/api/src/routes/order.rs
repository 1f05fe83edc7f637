use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use chrono::Utc;
use jasiri_core::order::OrderSubmission;
use serde::Serialize;
use serde_json::json;

use super::contact::{client_ip, Received};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/send-order", post(submit))
}

#[derive(Debug, Serialize)]
struct OrderResponse {
    success: bool,
    message: &'static str,
    data: Received,
}

async fn submit(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<OrderSubmission>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let ip = client_ip(&headers);
    if !state.order_limiter().check(&ip) {
        tracing::warn!(client_ip = %ip, "order form rate limited");
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

    let order = submission.into_order(Utc::now());
    state.contacts().insert_order(&order).await?;
    tracing::info!(
        order_id = %order.id,
        items = order.items.len(),
        quantity = order.total_quantity(),
        client_ip = %ip,
        "order received"
    );
    tracing::debug!(order_id = %order.id, summary = %order.summary(), "order details");

    Ok((
        StatusCode::CREATED,
        Json(OrderResponse {
            success: true,
            message: "Order submitted successfully!",
            data: Received {
                id: order.id,
                timestamp: order.created_at,
            },
        }),
    ))
}
