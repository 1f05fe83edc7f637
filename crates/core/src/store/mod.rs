//! Persistence for posts, contact messages and orders.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::contact::ContactMessage;
use crate::order::Order;
use crate::post::Post;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("slug already in use: {0}")]
    SlugConflict(String),
    #[error("post not found: {0}")]
    NotFound(Uuid),
    #[error("corrupt record: {0}")]
    Corrupt(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Post storage. Implementations enforce slug uniqueness on write.
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Cheap connectivity check.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Every post, oldest first.
    async fn list(&self) -> Result<Vec<Post>, StoreError>;

    async fn get(&self, id: Uuid) -> Result<Option<Post>, StoreError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, StoreError>;

    /// Whether a post other than `except` already uses `slug`.
    async fn slug_exists(&self, slug: &str, except: Option<Uuid>) -> Result<bool, StoreError>;

    async fn insert(&self, post: &Post) -> Result<(), StoreError>;

    /// Overwrite an existing post.
    async fn save(&self, post: &Post) -> Result<(), StoreError>;

    /// Remove a post, returning it if it existed.
    async fn delete(&self, id: Uuid) -> Result<Option<Post>, StoreError>;

    async fn increment_views(&self, id: Uuid) -> Result<(), StoreError>;
}

/// Visitor submissions: contact messages and orders. Write-only.
#[async_trait]
pub trait ContactStore: Send + Sync {
    async fn insert_contact(&self, message: &ContactMessage) -> Result<(), StoreError>;

    async fn insert_order(&self, order: &Order) -> Result<(), StoreError>;
}
