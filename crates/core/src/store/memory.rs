use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{ContactStore, PostStore, StoreError};
use crate::contact::ContactMessage;
use crate::order::Order;
use crate::post::Post;

/// In-process store used when no database is configured, and in tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    posts: RwLock<Vec<Post>>,
    contacts: RwLock<Vec<ContactMessage>>,
    orders: RwLock<Vec<Order>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn contacts(&self) -> Vec<ContactMessage> {
        self.contacts.read().await.clone()
    }

    pub async fn orders(&self) -> Vec<Order> {
        self.orders.read().await.clone()
    }
}

#[async_trait]
impl PostStore for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Post>, StoreError> {
        Ok(self.posts.read().await.clone())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Post>, StoreError> {
        Ok(self.posts.read().await.iter().find(|p| p.id == id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, StoreError> {
        Ok(self
            .posts
            .read()
            .await
            .iter()
            .find(|p| p.slug == slug)
            .cloned())
    }

    async fn slug_exists(&self, slug: &str, except: Option<Uuid>) -> Result<bool, StoreError> {
        Ok(self
            .posts
            .read()
            .await
            .iter()
            .any(|p| p.slug == slug && Some(p.id) != except))
    }

    async fn insert(&self, post: &Post) -> Result<(), StoreError> {
        let mut posts = self.posts.write().await;
        if posts.iter().any(|p| p.slug == post.slug) {
            return Err(StoreError::SlugConflict(post.slug.clone()));
        }
        posts.push(post.clone());
        Ok(())
    }

    async fn save(&self, post: &Post) -> Result<(), StoreError> {
        let mut posts = self.posts.write().await;
        if posts.iter().any(|p| p.slug == post.slug && p.id != post.id) {
            return Err(StoreError::SlugConflict(post.slug.clone()));
        }
        let slot = posts
            .iter_mut()
            .find(|p| p.id == post.id)
            .ok_or(StoreError::NotFound(post.id))?;
        *slot = post.clone();
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Post>, StoreError> {
        let mut posts = self.posts.write().await;
        Ok(posts
            .iter()
            .position(|p| p.id == id)
            .map(|index| posts.remove(index)))
    }

    async fn increment_views(&self, id: Uuid) -> Result<(), StoreError> {
        let mut posts = self.posts.write().await;
        let post = posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(StoreError::NotFound(id))?;
        post.view_count += 1;
        Ok(())
    }
}

#[async_trait]
impl ContactStore for MemoryStore {
    async fn insert_contact(&self, message: &ContactMessage) -> Result<(), StoreError> {
        self.contacts.write().await.push(message.clone());
        Ok(())
    }

    async fn insert_order(&self, order: &Order) -> Result<(), StoreError> {
        self.orders.write().await.push(order.clone());
        Ok(())
    }
}
