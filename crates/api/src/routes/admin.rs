//! Admin routes: post CRUD and login/logout. Every post call passes the
//! caller's token through to the token-checked [`PostApi`].

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jasiri_core::admin::PostApi;
use jasiri_core::auth::{ADMIN_COOKIE, COOKIE_MAX_AGE_SECS};
use jasiri_core::post::{Post, PostInput, PostPatch};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Envelope, Message};
use crate::error::{ApiError, ApiResult};
use crate::middleware::admin_auth::AdminCredentials;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/admin/blog", get(list_posts).post(create_post))
        .route(
            "/api/admin/blog/{id}",
            get(get_post).put(update_post).delete(delete_post),
        )
        .route("/api/admin/auth", post(login).delete(logout))
}

#[derive(Debug, Serialize)]
struct PostList {
    success: bool,
    data: Vec<Post>,
    total: usize,
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    #[serde(default)]
    token: String,
}

fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest("Invalid blog post ID".to_string()))
}

/// Every post, drafts included, newest first.
async fn list_posts(
    State(state): State<AppState>,
    AdminCredentials(token): AdminCredentials,
) -> ApiResult<Json<PostList>> {
    let posts = state.admin().list(&token).await?;
    Ok(Json(PostList {
        success: true,
        total: posts.len(),
        data: posts,
    }))
}

async fn create_post(
    State(state): State<AppState>,
    AdminCredentials(token): AdminCredentials,
    Json(input): Json<PostInput>,
) -> ApiResult<impl IntoResponse> {
    let post = state.admin().create(&token, input).await?;
    Ok((StatusCode::CREATED, Json(Envelope::ok(post))))
}

/// A single post by id. Not counted as a view.
async fn get_post(
    State(state): State<AppState>,
    AdminCredentials(token): AdminCredentials,
    Path(id): Path<String>,
) -> ApiResult<Json<Envelope<Post>>> {
    let post = state.admin().get(&token, parse_id(&id)?).await?;
    Ok(Json(Envelope::ok(post)))
}

async fn update_post(
    State(state): State<AppState>,
    AdminCredentials(token): AdminCredentials,
    Path(id): Path<String>,
    Json(patch): Json<PostPatch>,
) -> ApiResult<Json<Envelope<Post>>> {
    let post = state.admin().update(&token, parse_id(&id)?, patch).await?;
    Ok(Json(Envelope::ok(post)))
}

async fn delete_post(
    State(state): State<AppState>,
    AdminCredentials(token): AdminCredentials,
    Path(id): Path<String>,
) -> ApiResult<Json<Message>> {
    state.admin().delete(&token, parse_id(&id)?).await?;
    Ok(Json(Message::ok("Blog deleted successfully")))
}

/// Exchange the admin secret for an HttpOnly session cookie.
async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> ApiResult<(CookieJar, Json<Message>)> {
    if let Err(err) = state.secret().verify(Some(request.token.as_str())) {
        tracing::warn!(error = %err, "admin login rejected");
        return Err(err.into());
    }

    let cookie = Cookie::build((ADMIN_COOKIE, request.token))
        .path("/")
        .http_only(true)
        .secure(state.config().secure_cookies)
        .same_site(SameSite::Strict)
        .max_age(time::Duration::seconds(COOKIE_MAX_AGE_SECS));

    tracing::info!("admin logged in");
    Ok((jar.add(cookie), Json(Message::ok("Authentication successful"))))
}

async fn logout(jar: CookieJar) -> (CookieJar, Json<Message>) {
    let jar = jar.remove(Cookie::build(ADMIN_COOKIE).path("/"));
    (jar, Json(Message::ok("Logged out successfully")))
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use axum::Router;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::routes::build_router;
    use crate::state::test_support::{self, TEST_TOKEN};

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-admin-token", TEST_TOKEN)
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    #[tokio::test]
    async fn requests_without_token_are_401() {
        let (state, _) = test_support::state();
        let app = build_router(state);
        let request = Request::get("/api/admin/blog").body(Body::empty()).unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["message"], "Authentication required");
    }

    #[tokio::test]
    async fn wrong_token_is_401() {
        let (state, _) = test_support::state();
        let app = build_router(state);
        let request = Request::get("/api/admin/blog")
            .header("x-admin-token", "guess")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["message"], "Invalid authentication credentials");
    }

    #[tokio::test]
    async fn crud_round_trip() {
        let (state, _) = test_support::state();
        let app = build_router(state);

        let (status, created) = send(
            &app,
            json_request(
                "POST",
                "/api/admin/blog",
                json!({ "title": "My Post", "content": "<p>Hello</p>" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["data"]["slug"], "my-post");
        assert_eq!(created["data"]["status"], "draft");
        let id = created["data"]["id"].as_str().unwrap().to_string();

        let (_, second) = send(
            &app,
            json_request(
                "POST",
                "/api/admin/blog",
                json!({ "title": "My Post", "content": "<p>Again</p>" }),
            ),
        )
        .await;
        assert_eq!(second["data"]["slug"], "my-post-1");

        let (status, updated) = send(
            &app,
            json_request(
                "PUT",
                &format!("/api/admin/blog/{id}"),
                json!({ "status": "published" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(updated["data"]["publishedDate"].is_string());

        let (_, listed) = send(&app, json_request("GET", "/api/admin/blog", Value::Null)).await;
        assert_eq!(listed["total"], 2);

        let path = format!("/api/admin/blog/{id}");
        let (status, _) = send(&app, json_request("DELETE", &path, Value::Null)).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(&app, json_request("GET", &path, Value::Null)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn validation_errors_list_fields() {
        let (state, _) = test_support::state();
        let app = build_router(state);
        let (status, body) = send(
            &app,
            json_request("POST", "/api/admin/blog", json!({ "title": "", "content": "<p></p>" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["details"]["title"], "Title is required");
        assert_eq!(body["error"]["details"]["content"], "Content is required");
    }

    #[tokio::test]
    async fn malformed_id_is_400() {
        let (state, _) = test_support::state();
        let app = build_router(state);
        let request = json_request("GET", "/api/admin/blog/not-a-uuid", Value::Null);
        let (status, _) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn login_sets_http_only_cookie() {
        let (state, _) = test_support::state();
        let app = build_router(state);

        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/admin/auth", json!({ "token": TEST_TOKEN })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .unwrap()
            .to_string();
        assert!(cookie.starts_with("admin-token="));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Strict"));
        assert!(cookie.contains("Max-Age=86400"));

        let (status, _) = send(
            &app,
            json_request("POST", "/api/admin/auth", json!({ "token": "nope" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn cookie_authenticates_admin_calls() {
        let (state, _) = test_support::state();
        let app = build_router(state);
        let request = Request::get("/api/admin/blog")
            .header(header::COOKIE, format!("admin-token={TEST_TOKEN}"))
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 0);
    }
}
