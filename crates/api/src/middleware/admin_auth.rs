use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::CookieJar;

use jasiri_core::auth::{AdminToken, AuthError, ADMIN_COOKIE, ADMIN_HEADER};

use crate::error::ApiError;

/// The admin token a request carries: the `X-Admin-Token` header, else the
/// `admin-token` cookie. Only presence is checked here; the value is
/// verified by whatever the handler calls with it.
#[derive(Debug, Clone)]
pub struct AdminCredentials(pub AdminToken);

impl<S> FromRequestParts<S> for AdminCredentials
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let from_header = parts
            .headers
            .get(ADMIN_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let token = from_header
            .or_else(|| {
                CookieJar::from_headers(&parts.headers)
                    .get(ADMIN_COOKIE)
                    .map(|c| c.value().to_string())
            })
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::Missing)?;

        Ok(Self(AdminToken::new(token)))
    }
}
