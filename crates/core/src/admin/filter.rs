//! Search, filter and ordering for the admin post table.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::post::{Post, PostStatus};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Draft,
    Published,
}

impl StatusFilter {
    fn admits(self, status: PostStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Draft => status == PostStatus::Draft,
            StatusFilter::Published => status == PostStatus::Published,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Date,
    Title,
    Author,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// What the admin table shows. The default matches everything, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterSpec {
    /// Case-insensitive substring over title, content, author and tags.
    pub query: String,
    /// Exact author; `None` means any author.
    pub author: Option<String>,
    pub status: StatusFilter,
    pub sort_by: SortKey,
    pub sort_order: SortOrder,
}

impl FilterSpec {
    pub fn status(status: StatusFilter) -> Self {
        Self {
            status,
            ..Self::default()
        }
    }

    fn matches(&self, post: &Post, query: &str) -> bool {
        if let Some(author) = self.author.as_deref().filter(|a| !a.is_empty()) {
            if post.author != author {
                return false;
            }
        }
        if !self.status.admits(post.status) {
            return false;
        }
        query.is_empty()
            || post.title.to_lowercase().contains(query)
            || post.content.to_lowercase().contains(query)
            || post.author.to_lowercase().contains(query)
            || post.tags.iter().any(|t| t.to_lowercase().contains(query))
    }

    fn compare(&self, a: &Post, b: &Post) -> Ordering {
        match self.sort_by {
            SortKey::Date => a.sort_date().cmp(&b.sort_date()),
            SortKey::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
            SortKey::Author => a.author.to_lowercase().cmp(&b.author.to_lowercase()),
        }
    }
}

/// Matching posts in display order. Posts that compare equal keep their
/// relative order from `items`, in both directions.
pub fn apply_filter(items: &[Post], spec: &FilterSpec) -> Vec<Post> {
    let query = spec.query.trim().to_lowercase();
    let mut out: Vec<Post> = items
        .iter()
        .filter(|post| spec.matches(post, &query))
        .cloned()
        .collect();

    match spec.sort_order {
        SortOrder::Asc => out.sort_by(|a, b| spec.compare(a, b)),
        SortOrder::Desc => out.sort_by(|a, b| spec.compare(b, a)),
    }
    out
}

/// Number of pages for `len` items; never less than one.
pub fn page_count(len: usize, page_size: usize) -> usize {
    len.div_ceil(page_size.max(1)).max(1)
}

/// The 1-based `page` of `items`. Out-of-range pages are empty.
pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    let page_size = page_size.max(1);
    let start = page.saturating_sub(1).saturating_mul(page_size);
    if start >= items.len() {
        return &[];
    }
    let end = (start + page_size).min(items.len());
    &items[start..end]
}
