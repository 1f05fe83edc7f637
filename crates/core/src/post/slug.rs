//! Slug utilities.
//!
//! Slugs are URL-safe post identifiers derived from the title:
//! - lowercase ASCII letters and digits
//! - single hyphens between words, none leading or trailing
//! - unique across posts; collisions get a numeric suffix (`my-post-1`)

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// Candidates tried before giving up on finding a free slug.
pub const MAX_SLUG_ATTEMPTS: u32 = 1000;

/// Used when a title has no slug-able characters at all.
const FALLBACK_SLUG: &str = "post";

static SLUG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(-[a-z0-9]+)*$").expect("slug pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SlugError {
    #[error("no free slug for '{base}' after {attempts} attempts")]
    Exhausted { base: String, attempts: u32 },
}

pub fn is_valid_slug(slug: &str) -> bool {
    SLUG_PATTERN.is_match(slug)
}

/// Derive a slug from a title.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_dash = false;
    for ch in title.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch);
        } else {
            pending_dash = true;
        }
    }
    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}

/// The slugs to try for `base`, in order: `base`, `base-1`, `base-2`, ...
/// bounded by [`MAX_SLUG_ATTEMPTS`].
pub fn candidates(base: &str) -> impl Iterator<Item = String> + '_ {
    (0..MAX_SLUG_ATTEMPTS).map(move |n| {
        if n == 0 {
            base.to_string()
        } else {
            format!("{base}-{n}")
        }
    })
}

pub fn exhausted(base: &str) -> SlugError {
    SlugError::Exhausted {
        base: base.to_string(),
        attempts: MAX_SLUG_ATTEMPTS,
    }
}
