//! Shared-secret admin authentication.
//!
//! There are no user accounts: the admin presents the server's secret token,
//! either in the `admin-token` cookie set at login or the `X-Admin-Token`
//! header, and it is compared for exact equality.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const ADMIN_COOKIE: &str = "admin-token";
pub const ADMIN_HEADER: &str = "x-admin-token";
/// Lifetime of the login cookie: 24 hours.
pub const COOKIE_MAX_AGE_SECS: i64 = 86_400;
/// Secrets shorter than this are reported at startup.
pub const MIN_SECRET_CHARS: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Authentication required")]
    Missing,
    #[error("Invalid authentication credentials")]
    Invalid,
    #[error("Admin access is not configured")]
    NotConfigured,
}

/// A token presented by a caller. Never printed.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdminToken(String);

impl AdminToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for AdminToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AdminToken(<redacted>)")
    }
}

/// The server-side secret. `None` disables admin access entirely.
#[derive(Clone, Default)]
pub struct AdminSecret(Option<String>);

impl AdminSecret {
    pub fn new(secret: Option<String>) -> Self {
        Self(secret.filter(|s| !s.is_empty()))
    }

    pub fn is_configured(&self) -> bool {
        self.0.is_some()
    }

    pub fn verify(&self, token: Option<&str>) -> Result<(), AuthError> {
        let secret = self.0.as_deref().ok_or(AuthError::NotConfigured)?;
        match token {
            None | Some("") => Err(AuthError::Missing),
            Some(token) if token == secret => Ok(()),
            Some(_) => Err(AuthError::Invalid),
        }
    }

    pub fn verify_token(&self, token: &AdminToken) -> Result<(), AuthError> {
        self.verify(Some(token.as_str()))
    }

    /// Human-readable problems with the configured secret.
    pub fn weaknesses(&self) -> Vec<&'static str> {
        let Some(secret) = self.0.as_deref() else {
            return vec!["admin secret is not set; admin routes are disabled"];
        };
        let mut found = Vec::new();
        if secret.chars().count() < MIN_SECRET_CHARS {
            found.push("admin secret is shorter than 32 characters");
        }
        let has_letter = secret.chars().any(|c| c.is_ascii_alphabetic());
        let has_digit = secret.chars().any(|c| c.is_ascii_digit());
        if !(has_letter && has_digit) {
            found.push("admin secret should mix letters and digits");
        }
        found
    }
}

impl fmt::Debug for AdminSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AdminSecret")
            .field(&self.0.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_distinguishes_missing_and_invalid() {
        let secret = AdminSecret::new(Some("s3cret".into()));
        assert_eq!(secret.verify(None), Err(AuthError::Missing));
        assert_eq!(secret.verify(Some("")), Err(AuthError::Missing));
        assert_eq!(secret.verify(Some("S3CRET")), Err(AuthError::Invalid));
        assert_eq!(secret.verify(Some("s3cret")), Ok(()));
    }

    #[test]
    fn unset_secret_rejects_everything() {
        let secret = AdminSecret::new(Some(String::new()));
        assert!(!secret.is_configured());
        assert_eq!(secret.verify(Some("")), Err(AuthError::NotConfigured));
    }

    #[test]
    fn weak_secrets_reported() {
        assert_eq!(AdminSecret::new(Some("abc".into())).weaknesses().len(), 2);
        let strong = AdminSecret::new(Some("a1".repeat(16)));
        assert!(strong.weaknesses().is_empty());
    }

    #[test]
    fn token_debug_is_redacted() {
        let token = AdminToken::new("hunter2");
        assert!(!format!("{token:?}").contains("hunter2"));
    }
}
