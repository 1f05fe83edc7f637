use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::block::{self, Document};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Draft,
    Published,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(PostStatus::Draft),
            "published" => Ok(PostStatus::Published),
            other => Err(format!("unknown post status '{other}'")),
        }
    }
}

/// A blog post as persisted. `content` is serialized block markup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub author: String,
    pub hero_image_url: String,
    pub content: String,
    pub meta_description: String,
    pub tags: Vec<String>,
    pub status: PostStatus,
    pub featured: bool,
    pub published_date: Option<DateTime<Utc>>,
    pub view_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Rebuild the editable block form of the stored content.
    pub fn document(&self) -> Document {
        block::parse_str(&self.content)
    }

    /// Move to `status`. Publishing stamps `published_date` if unset;
    /// returning to draft clears it.
    pub fn set_status(&mut self, status: PostStatus, now: DateTime<Utc>) {
        match status {
            PostStatus::Published => {
                if self.published_date.is_none() {
                    self.published_date = Some(now);
                }
            }
            PostStatus::Draft => self.published_date = None,
        }
        self.status = status;
    }

    pub fn is_published(&self) -> bool {
        self.status == PostStatus::Published
    }

    /// Date used for "newest first" ordering.
    pub fn sort_date(&self) -> DateTime<Utc> {
        self.published_date.unwrap_or(self.created_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn post() -> Post {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Post {
            id: Uuid::nil(),
            title: "Hello".into(),
            slug: "hello".into(),
            author: "Admin".into(),
            hero_image_url: String::new(),
            content: "<h2>Hi</h2>".into(),
            meta_description: String::new(),
            tags: vec![],
            status: PostStatus::Draft,
            featured: false,
            published_date: None,
            view_count: 0,
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn publishing_stamps_date_once() {
        let mut p = post();
        let first = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();

        p.set_status(PostStatus::Published, first);
        assert_eq!(p.published_date, Some(first));

        p.set_status(PostStatus::Published, later);
        assert_eq!(p.published_date, Some(first));
    }

    #[test]
    fn drafting_clears_date() {
        let mut p = post();
        p.set_status(PostStatus::Published, Utc::now());
        p.set_status(PostStatus::Draft, Utc::now());
        assert_eq!(p.published_date, None);
        assert_eq!(p.sort_date(), p.created_at);
    }

    #[test]
    fn status_round_trips_through_str() {
        for status in [PostStatus::Draft, PostStatus::Published] {
            assert_eq!(status.as_str().parse::<PostStatus>(), Ok(status));
        }
        assert!("archived".parse::<PostStatus>().is_err());
    }

    #[test]
    fn json_is_camel_case() {
        let value = serde_json::to_value(post()).unwrap();
        assert!(value.get("heroImageUrl").is_some());
        assert!(value.get("publishedDate").is_some());
        assert_eq!(value["status"], "draft");
    }

    #[test]
    fn document_from_content() {
        let doc = post().document();
        assert_eq!(doc.blocks().len(), 1);
    }
}
