//! Public, read-only blog routes.

use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use super::Envelope;
use crate::error::ApiResult;
use crate::state::AppState;

const LIST_CACHE: &str = "public, s-maxage=60, stale-while-revalidate=120";
const POST_CACHE: &str = "public, s-maxage=300, stale-while-revalidate=600";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/blog", get(list_published))
        .route("/api/blog/slug/{slug}", get(get_by_slug))
}

/// Published posts, newest first.
async fn list_published(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let posts = state.posts().list_published().await?;
    tracing::debug!(count = posts.len(), "listed published posts");
    Ok(([(header::CACHE_CONTROL, LIST_CACHE)], Json(Envelope::ok(posts))))
}

/// One published post. Counts as a view.
async fn get_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let post = state.posts().get_published_by_slug(&slug).await?;
    Ok(([(header::CACHE_CONTROL, POST_CACHE)], Json(Envelope::ok(post))))
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use jasiri_core::post::{PostInput, PostStatus};
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::routes::build_router;
    use crate::state::test_support;

    #[tokio::test]
    async fn only_published_posts_are_public() {
        let (state, _) = test_support::state();
        state
            .posts()
            .create(PostInput {
                title: "Secret draft".into(),
                content: "<p>wip</p>".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        state
            .posts()
            .create(PostInput {
                title: "Harvest update".into(),
                content: "<p>news</p>".into(),
                status: Some(PostStatus::Published),
                ..Default::default()
            })
            .await
            .unwrap();
        let app = build_router(state);

        let response = app
            .clone()
            .oneshot(Request::get("/api/blog").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("cache-control"));
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
        assert_eq!(body["data"][0]["slug"], "harvest-update");

        let response = app
            .clone()
            .oneshot(Request::get("/api/blog/slug/secret-draft").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app
            .oneshot(Request::get("/api/blog/slug/harvest-update").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
