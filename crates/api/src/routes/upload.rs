use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use jasiri_core::media::{self, MAX_UPLOAD_BYTES};
use serde::Serialize;

use super::Envelope;
use crate::error::{ApiError, ApiResult};
use crate::middleware::admin_auth::AdminCredentials;
use crate::state::AppState;

/// Room for multipart framing around the largest accepted file.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/api/admin/upload",
        post(upload_image).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + MULTIPART_OVERHEAD)),
    )
}

#[derive(Debug, Serialize)]
struct Uploaded {
    url: String,
}

/// Accept one image in the multipart field `file` and store it under the
/// upload directory with a fresh name.
async fn upload_image(
    State(state): State<AppState>,
    AdminCredentials(token): AdminCredentials,
    mut multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    state.secret().verify_token(&token)?;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let mime = field.content_type().unwrap_or_default().to_string();
        let bytes = field.bytes().await?;

        let kind = media::validate_upload(&bytes, &mime, &file_name)?;
        let stored = media::stored_file_name(kind);

        let dir = &state.config().upload_dir;
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| ApiError::Internal(format!("cannot create upload dir: {e}")))?;
        tokio::fs::write(dir.join(&stored), &bytes)
            .await
            .map_err(|e| ApiError::Internal(format!("cannot write upload: {e}")))?;

        tracing::info!(file = %stored, size = bytes.len(), kind = ?kind, "image uploaded");
        let url = state.config().upload_url(&stored);
        return Ok((StatusCode::CREATED, Json(Envelope::ok(Uploaded { url }))));
    }

    Err(media::UploadError::Empty.into())
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::routes::build_router;
    use crate::state::test_support::{self, TEST_TOKEN};

    const BOUNDARY: &str = "jasiri-boundary";

    fn multipart_request(file_name: &str, mime: &str, bytes: &[u8]) -> Request<Body> {
        let mut body = format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n\
             Content-Type: {mime}\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        Request::post("/api/admin/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .header("x-admin-token", TEST_TOKEN)
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn stores_valid_png_and_returns_url() {
        let (state, _) = test_support::state();
        let dir = state.config().upload_dir.clone();
        let app = build_router(state);

        let png = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0];
        let response = app
            .oneshot(multipart_request("hero.png", "image/png", &png))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        let url = body["data"]["url"].as_str().unwrap();
        assert!(url.starts_with("/uploads/") && url.ends_with(".png"));

        let name = url.trim_start_matches("/uploads/");
        assert_eq!(std::fs::read(dir.join(name)).unwrap(), png);
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn spoofed_type_is_415() {
        let (state, _) = test_support::state();
        let app = build_router(state);
        let response = app
            .oneshot(multipart_request("evil.png", "image/png", b"<svg onload=alert(1)>"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }
}
