use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Cache tag covering every listing of posts.
pub const BLOG_POSTS_TAG: &str = "blog-posts";

/// Cache tag for a single post page.
pub fn post_tag(slug: &str) -> String {
    format!("blog-post-{slug}")
}

/// Events emitted after successful mutations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BlogEvent {
    Welcome,
    /// Cached pages carrying `tag` are stale.
    Revalidate { tag: String },
    PostChanged(PostChangeEvent),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Created,
    Updated,
    Deleted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostChangeEvent {
    pub post_id: Uuid,
    pub slug: String,
    pub change: ChangeKind,
    pub timestamp: DateTime<Utc>,
}

impl BlogEvent {
    pub fn revalidate(tag: impl Into<String>) -> Self {
        BlogEvent::Revalidate { tag: tag.into() }
    }
}
