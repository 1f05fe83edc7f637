use axum::http::{header, HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};

use jasiri_core::auth::ADMIN_HEADER;

/// Build the CORS layer. With a configured origin, credentials (the admin
/// cookie) are allowed from that origin only; otherwise any origin may read
/// without credentials.
pub fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let methods = [Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS];

    match origin.and_then(|o| HeaderValue::from_str(o).ok()) {
        Some(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(methods)
            .allow_headers([
                header::CONTENT_TYPE,
                header::HeaderName::from_static(ADMIN_HEADER),
            ])
            .allow_credentials(true),
        None => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any),
    }
}
