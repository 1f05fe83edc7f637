//! Contact form submissions: validation, sanitization and spam screening.

mod rate_limit;

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub use rate_limit::{RateLimiter, RATE_LIMIT_MAX_REQUESTS, RATE_LIMIT_WINDOW};

pub const MAX_EMAIL_CHARS: usize = 254;

pub(crate) static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("email pattern is valid")
});

static URL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)https?://\S+").expect("url pattern is valid"));

static SPAM_KEYWORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(viagra|casino|lottery|winner|congratulations)\b")
        .expect("spam pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContactError {
    #[error("Name is required")]
    NameRequired,
    #[error("Name must be between 2 and 100 characters")]
    NameLength,
    #[error("Email is required")]
    EmailRequired,
    #[error("Please provide a valid email address")]
    EmailInvalid,
    #[error("Topic is required")]
    TopicRequired,
    #[error("Topic must be between 3 and 200 characters")]
    TopicLength,
    #[error("Message is required")]
    MessageRequired,
    #[error("Message must be between 10 and 1000 characters")]
    MessageLength,
}

/// A contact form as posted by a visitor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactSubmission {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub message: String,
}

/// A stored contact message. Text fields hold sanitized HTML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub topic: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl ContactSubmission {
    /// Every rule the submission breaks, in field order. Empty means valid.
    pub fn validate(&self) -> Vec<ContactError> {
        let mut errors = Vec::new();

        check_length(
            &self.name,
            2..=100,
            ContactError::NameRequired,
            ContactError::NameLength,
            &mut errors,
        );

        let email = self.email.trim();
        if email.is_empty() {
            errors.push(ContactError::EmailRequired);
        } else if email.len() > MAX_EMAIL_CHARS || !EMAIL_PATTERN.is_match(email) {
            errors.push(ContactError::EmailInvalid);
        }

        check_length(
            &self.topic,
            3..=200,
            ContactError::TopicRequired,
            ContactError::TopicLength,
            &mut errors,
        );
        check_length(
            &self.message,
            10..=1000,
            ContactError::MessageRequired,
            ContactError::MessageLength,
            &mut errors,
        );

        errors
    }

    /// Links or known spam words anywhere in the free-text fields.
    pub fn is_suspicious(&self) -> bool {
        [&self.name, &self.topic, &self.message]
            .iter()
            .any(|text| URL_PATTERN.is_match(text) || SPAM_KEYWORDS.is_match(text))
    }

    /// Escape the free-text fields for HTML and normalize the email.
    pub fn sanitized(&self) -> Self {
        Self {
            name: sanitize_html(&self.name),
            email: self.email.trim().to_lowercase(),
            topic: sanitize_html(&self.topic),
            message: sanitize_html(&self.message),
        }
    }

    /// Sanitize and stamp the submission for storage.
    pub fn into_message(self, now: DateTime<Utc>) -> ContactMessage {
        let clean = self.sanitized();
        ContactMessage {
            id: Uuid::now_v7(),
            name: clean.name,
            email: clean.email,
            topic: clean.topic,
            message: clean.message,
            created_at: now,
        }
    }
}

pub(crate) fn check_length<E>(
    value: &str,
    bounds: std::ops::RangeInclusive<usize>,
    missing: E,
    out_of_range: E,
    errors: &mut Vec<E>,
) {
    let value = value.trim();
    if value.is_empty() {
        errors.push(missing);
    } else if !bounds.contains(&value.chars().count()) {
        errors.push(out_of_range);
    }
}

pub(crate) fn sanitize_html(text: &str) -> String {
    html_escape::encode_safe(text.trim()).replace('\n', "<br>")
}
