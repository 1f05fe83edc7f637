//! Create and update payloads for posts, as sent by the admin editor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use super::model::{Post, PostStatus};

pub const MAX_TITLE_CHARS: usize = 200;
pub const MAX_AUTHOR_CHARS: usize = 100;
pub const MAX_META_DESCRIPTION_CHARS: usize = 200;
pub const MAX_TAGS: usize = 10;
pub const DEFAULT_AUTHOR: &str = "Admin";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostInput {
    pub title: String,
    /// Derived from the title when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hero_image_url: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PostStatus>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_date: Option<DateTime<Utc>>,
}

impl PostInput {
    /// Trim and bound every free-text field, default the author and status.
    pub fn sanitized(self) -> Self {
        Self {
            title: truncate_chars(self.title.trim(), MAX_TITLE_CHARS),
            slug: self
                .slug
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            author: Some(
                self.author
                    .as_deref()
                    .map(str::trim)
                    .filter(|a| !a.is_empty())
                    .map(|a| truncate_chars(a, MAX_AUTHOR_CHARS))
                    .unwrap_or_else(|| DEFAULT_AUTHOR.to_string()),
            ),
            hero_image_url: self.hero_image_url.map(|u| u.trim().to_string()),
            content: self.content.trim().to_string(),
            meta_description: self
                .meta_description
                .map(|m| truncate_chars(m.trim(), MAX_META_DESCRIPTION_CHARS)),
            tags: normalize_tags(self.tags),
            status: Some(self.status.unwrap_or_default()),
            featured: self.featured,
            published_date: self.published_date,
        }
    }

    /// Materialize a post with the given identity and resolved slug.
    pub fn into_post(self, id: Uuid, slug: String, now: DateTime<Utc>) -> Post {
        let mut post = Post {
            id,
            title: self.title,
            slug,
            author: self
                .author
                .unwrap_or_else(|| DEFAULT_AUTHOR.to_string()),
            hero_image_url: self.hero_image_url.unwrap_or_default(),
            content: self.content,
            meta_description: self.meta_description.unwrap_or_default(),
            tags: self.tags,
            status: PostStatus::Draft,
            featured: self.featured,
            published_date: self.published_date,
            view_count: 0,
            created_at: now,
            updated_at: now,
        };
        post.set_status(self.status.unwrap_or_default(), now);
        post
    }
}

/// Partial update. Absent fields are left alone; `publishedDate: null`
/// clears the date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hero_image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PostStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured: Option<bool>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub published_date: Option<Option<DateTime<Utc>>>,
}

impl PostPatch {
    pub fn is_empty(&self) -> bool {
        *self == PostPatch::default()
    }

    /// Apply the patch to `post`, with the same trimming rules as creation.
    /// An explicit `publishedDate` is applied before the status transition.
    pub fn apply(self, post: &mut Post, now: DateTime<Utc>) {
        if let Some(title) = self.title {
            post.title = truncate_chars(title.trim(), MAX_TITLE_CHARS);
        }
        if let Some(slug) = self.slug {
            post.slug = slug.trim().to_string();
        }
        if let Some(author) = self.author {
            let author = author.trim();
            post.author = if author.is_empty() {
                DEFAULT_AUTHOR.to_string()
            } else {
                truncate_chars(author, MAX_AUTHOR_CHARS)
            };
        }
        if let Some(url) = self.hero_image_url {
            post.hero_image_url = url.trim().to_string();
        }
        if let Some(content) = self.content {
            post.content = content.trim().to_string();
        }
        if let Some(meta) = self.meta_description {
            post.meta_description = truncate_chars(meta.trim(), MAX_META_DESCRIPTION_CHARS);
        }
        if let Some(tags) = self.tags {
            post.tags = normalize_tags(tags);
        }
        if let Some(featured) = self.featured {
            post.featured = featured;
        }
        if let Some(date) = self.published_date {
            post.published_date = date;
        }
        let status = self.status.unwrap_or(post.status);
        post.set_status(status, now);
        post.updated_at = now;
    }
}

fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Trim tags, drop blanks and duplicates (keeping first occurrence), cap at [`MAX_TAGS`].
pub fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.trim();
        if tag.is_empty() || out.iter().any(|t| t == tag) {
            continue;
        }
        out.push(tag.to_string());
        if out.len() == MAX_TAGS {
            break;
        }
    }
    out
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sanitize_trims_and_defaults() {
        let input = PostInput {
            title: "  Hello  ".into(),
            slug: Some("   ".into()),
            author: Some("  ".into()),
            content: " <p>x</p> ".into(),
            ..Default::default()
        }
        .sanitized();

        assert_eq!(input.title, "Hello");
        assert_eq!(input.slug, None);
        assert_eq!(input.author.as_deref(), Some("Admin"));
        assert_eq!(input.content, "<p>x</p>");
        assert_eq!(input.status, Some(PostStatus::Draft));
    }

    #[test]
    fn sanitize_truncates_long_fields() {
        let input = PostInput {
            title: "t".repeat(300),
            author: Some("a".repeat(150)),
            meta_description: Some("m".repeat(250)),
            ..Default::default()
        }
        .sanitized();

        assert_eq!(input.title.chars().count(), MAX_TITLE_CHARS);
        assert_eq!(input.author.unwrap().chars().count(), MAX_AUTHOR_CHARS);
        assert_eq!(
            input.meta_description.unwrap().chars().count(),
            MAX_META_DESCRIPTION_CHARS
        );
    }

    #[test]
    fn tags_are_unique_and_bounded() {
        let tags: Vec<String> = ["a", " a ", "", "b"]
            .into_iter()
            .map(String::from)
            .chain((0..20).map(|n| format!("t{n}")))
            .collect();
        let normalized = normalize_tags(tags);
        assert_eq!(normalized.len(), MAX_TAGS);
        assert_eq!(&normalized[..3], &["a", "b", "t0"]);
    }

    #[test]
    fn published_input_gets_date() {
        let now = Utc::now();
        let post = PostInput {
            title: "Hi".into(),
            content: "<p>x</p>".into(),
            status: Some(PostStatus::Published),
            ..Default::default()
        }
        .sanitized()
        .into_post(Uuid::nil(), "hi".into(), now);

        assert_eq!(post.published_date, Some(now));
        assert_eq!(post.author, "Admin");
    }

    #[test]
    fn patch_distinguishes_null_from_absent() {
        let absent: PostPatch = serde_json::from_value(json!({"title": "x"})).unwrap();
        assert_eq!(absent.published_date, None);

        let cleared: PostPatch = serde_json::from_value(json!({"publishedDate": null})).unwrap();
        assert_eq!(cleared.published_date, Some(None));
    }

    #[test]
    fn patch_to_draft_clears_published_date() {
        let now = Utc::now();
        let mut post = PostInput {
            title: "Hi".into(),
            content: "<p>x</p>".into(),
            status: Some(PostStatus::Published),
            ..Default::default()
        }
        .sanitized()
        .into_post(Uuid::nil(), "hi".into(), now);

        PostPatch {
            status: Some(PostStatus::Draft),
            ..Default::default()
        }
        .apply(&mut post, now);

        assert_eq!(post.status, PostStatus::Draft);
        assert_eq!(post.published_date, None);
    }

    #[test]
    fn empty_patch_only_touches_updated_at() {
        let created = Utc::now();
        let mut post = PostInput {
            title: "Hi".into(),
            ..Default::default()
        }
        .into_post(Uuid::nil(), "hi".into(), created);
        let before = post.clone();

        let later = created + chrono::Duration::seconds(5);
        let patch = PostPatch::default();
        assert!(patch.is_empty());
        patch.apply(&mut post, later);

        assert_eq!(post.updated_at, later);
        post.updated_at = before.updated_at;
        assert_eq!(post, before);
    }
}
