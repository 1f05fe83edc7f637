//! Field-level post validation, run before every save.

use std::collections::BTreeMap;

use serde::ser::{Serialize, SerializeMap, Serializer};
use thiserror::Error;

use super::input::{PostInput, MAX_TAGS, MAX_TITLE_CHARS};
use super::model::Post;
use super::slug::is_valid_slug;
use crate::block::EMPTY_MARKUP;

pub const MIN_TITLE_CHARS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("Title is required")]
    TitleRequired,
    #[error("Title must be at least 3 characters")]
    TitleTooShort,
    #[error("Title cannot be more than 200 characters")]
    TitleTooLong,
    #[error("Slug is required")]
    SlugRequired,
    #[error("Slug can only contain lowercase letters and numbers separated by single hyphens")]
    SlugInvalid,
    #[error("Content is required")]
    ContentRequired,
    #[error("A post can have at most 10 tags")]
    TooManyTags,
    #[error("Tags must be unique")]
    DuplicateTags,
}

impl FieldError {
    pub fn field(&self) -> &'static str {
        match self {
            FieldError::TitleRequired | FieldError::TitleTooShort | FieldError::TitleTooLong => {
                "title"
            }
            FieldError::SlugRequired | FieldError::SlugInvalid => "slug",
            FieldError::ContentRequired => "content",
            FieldError::TooManyTags | FieldError::DuplicateTags => "tags",
        }
    }
}

/// Field name to error; empty means valid. Serializes as `{ field: message }`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors(BTreeMap<&'static str, FieldError>);

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: &str) -> Option<&FieldError> {
        self.0.get(field)
    }

    /// Record `error` unless its field already has one.
    pub fn add(&mut self, error: FieldError) {
        self.0.entry(error.field()).or_insert(error);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FieldError)> {
        self.0.iter().map(|(k, v)| (*k, v))
    }

    /// Messages keyed by field name.
    pub fn to_messages(&self) -> BTreeMap<String, String> {
        self.iter()
            .map(|(field, err)| (field.to_string(), err.to_string()))
            .collect()
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, err) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {err}")?;
            first = false;
        }
        Ok(())
    }
}

impl Serialize for ValidationErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (field, err) in self.iter() {
            map.serialize_entry(field, &err.to_string())?;
        }
        map.end()
    }
}

/// The fields validation looks at, borrowed from a post or an input.
#[derive(Debug, Clone, Copy)]
pub struct PostFields<'a> {
    pub title: &'a str,
    pub slug: &'a str,
    pub content: &'a str,
    pub tags: &'a [String],
}

impl Post {
    pub fn fields(&self) -> PostFields<'_> {
        PostFields {
            title: &self.title,
            slug: &self.slug,
            content: &self.content,
            tags: &self.tags,
        }
    }
}

impl PostInput {
    /// Fields as they would be saved; an absent slug counts as `slug`.
    pub fn fields_with_slug<'a>(&'a self, slug: &'a str) -> PostFields<'a> {
        PostFields {
            title: &self.title,
            slug: self.slug.as_deref().unwrap_or(slug),
            content: &self.content,
            tags: &self.tags,
        }
    }
}

/// Validate a post's fields. Pure: the same input always gives the same map.
/// Draft and published posts are checked alike.
pub fn validate(fields: PostFields<'_>) -> ValidationErrors {
    let mut errors = ValidationErrors::default();

    let title = fields.title.trim();
    if title.is_empty() {
        errors.add(FieldError::TitleRequired);
    } else if title.chars().count() < MIN_TITLE_CHARS {
        errors.add(FieldError::TitleTooShort);
    } else if title.chars().count() > MAX_TITLE_CHARS {
        errors.add(FieldError::TitleTooLong);
    }

    if fields.slug.trim().is_empty() {
        errors.add(FieldError::SlugRequired);
    } else if !is_valid_slug(fields.slug) {
        errors.add(FieldError::SlugInvalid);
    }

    if is_blank_content(fields.content) {
        errors.add(FieldError::ContentRequired);
    }

    if fields.tags.len() > MAX_TAGS {
        errors.add(FieldError::TooManyTags);
    } else {
        let mut seen = std::collections::HashSet::new();
        if !fields.tags.iter().all(|t| seen.insert(t.as_str())) {
            errors.add(FieldError::DuplicateTags);
        }
    }

    errors
}

/// Blank markup or the canonical empty paragraph.
pub fn is_blank_content(content: &str) -> bool {
    let content = content.trim();
    content.is_empty() || content == EMPTY_MARKUP
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields<'a>(title: &'a str, slug: &'a str, content: &'a str) -> PostFields<'a> {
        PostFields {
            title,
            slug,
            content,
            tags: &[],
        }
    }

    #[test]
    fn valid_post_has_no_errors() {
        assert!(validate(fields("Hello world", "hello-world", "<p>Hi</p>")).is_empty());
    }

    #[test]
    fn missing_fields_reported_per_field() {
        let errors = validate(fields("  ", "", ""));
        assert_eq!(errors.len(), 3);
        assert_eq!(errors.get("title"), Some(&FieldError::TitleRequired));
        assert_eq!(errors.get("slug"), Some(&FieldError::SlugRequired));
        assert_eq!(errors.get("content"), Some(&FieldError::ContentRequired));
    }

    #[test]
    fn short_title_rejected() {
        let errors = validate(fields("Hi", "hi", "<p>x</p>"));
        assert_eq!(errors.get("title"), Some(&FieldError::TitleTooShort));
    }

    #[test]
    fn slug_format_enforced() {
        for slug in ["Hello", "a--b", "-a", "a b", "a_b"] {
            let errors = validate(fields("Title", slug, "<p>x</p>"));
            assert_eq!(errors.get("slug"), Some(&FieldError::SlugInvalid), "{slug}");
        }
    }

    #[test]
    fn empty_paragraph_is_not_content() {
        let errors = validate(fields("Title", "title", " <p></p> "));
        assert_eq!(errors.get("content"), Some(&FieldError::ContentRequired));
    }

    #[test]
    fn tag_rules() {
        let dupes = vec!["a".to_string(), "a".to_string()];
        let errors = validate(PostFields {
            tags: &dupes,
            ..fields("Title", "title", "<p>x</p>")
        });
        assert_eq!(errors.get("tags"), Some(&FieldError::DuplicateTags));

        let many: Vec<String> = (0..11).map(|n| n.to_string()).collect();
        let errors = validate(PostFields {
            tags: &many,
            ..fields("Title", "title", "<p>x</p>")
        });
        assert_eq!(errors.get("tags"), Some(&FieldError::TooManyTags));
    }

    #[test]
    fn validation_is_repeatable() {
        let input = PostInput {
            title: "x".into(),
            content: "<p></p>".into(),
            ..Default::default()
        };
        let before = input.clone();
        let first = validate(input.fields_with_slug("BAD"));
        let second = validate(input.fields_with_slug("BAD"));
        assert_eq!(first, second);
        assert_eq!(input, before);
    }

    #[test]
    fn serializes_as_message_map() {
        let errors = validate(fields("", "ok", "<p>x</p>"));
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json["title"], "Title is required");
    }
}
