pub mod admin;
pub mod blog;
pub mod contact;
pub mod health;
pub mod order;
pub mod upload;

use axum::Router;
use serde::Serialize;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;

use crate::state::AppState;

/// Success body: `{ "success": true, "data": ... }`.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: T,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Success body without data: `{ "success": true, "message": ... }`.
#[derive(Debug, Serialize)]
pub struct Message {
    pub success: bool,
    pub message: &'static str,
}

impl Message {
    pub fn ok(message: &'static str) -> Self {
        Self {
            success: true,
            message,
        }
    }
}

/// Assemble the full router with all route groups.
pub fn build_router(state: AppState) -> Router {
    let upload_dir = state.config().upload_dir.clone();
    let max_body = state.config().max_body_bytes;

    Router::new()
        .merge(health::routes())
        .merge(blog::routes())
        .merge(admin::routes())
        .merge(upload::routes())
        .merge(contact::routes())
        .merge(order::routes())
        .nest_service("/uploads", ServeDir::new(upload_dir))
        .layer(RequestBodyLimitLayer::new(max_body))
        .with_state(state)
}
