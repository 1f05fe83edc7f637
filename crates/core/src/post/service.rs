//! Post lifecycle: create, update, delete and the public read paths.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

use super::input::{PostInput, PostPatch};
use super::model::Post;
use super::slug::{self, SlugError};
use super::validate::{validate, ValidationErrors};
use crate::events::{
    post_tag, BlogEvent, ChangeKind, EventBus, PostChangeEvent, BLOG_POSTS_TAG,
};
use crate::store::{PostStore, StoreError};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),
    #[error(transparent)]
    Slug(#[from] SlugError),
    #[error("slug already in use: {0}")]
    SlugTaken(String),
    #[error("post not found: {0}")]
    NotFound(Uuid),
    #[error("no published post with slug '{0}'")]
    SlugNotFound(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Business rules around the post store. Cheap to clone.
#[derive(Clone)]
pub struct PostService {
    store: Arc<dyn PostStore>,
    events: EventBus,
}

impl PostService {
    pub fn new(store: Arc<dyn PostStore>, events: EventBus) -> Self {
        Self { store, events }
    }

    pub fn store(&self) -> &Arc<dyn PostStore> {
        &self.store
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Create a post. A missing slug is derived from the title; a taken one
    /// gets the first free numeric suffix.
    pub async fn create(&self, input: PostInput) -> Result<Post, ServiceError> {
        let input = input.sanitized();
        let base = input
            .slug
            .clone()
            .unwrap_or_else(|| slug::slugify(&input.title));

        let errors = validate(input.fields_with_slug(&base));
        if !errors.is_empty() {
            return Err(ServiceError::Validation(errors));
        }

        let slug = self.unique_slug(&base).await?;
        let post = input.into_post(Uuid::now_v7(), slug, Utc::now());
        self.store.insert(&post).await?;

        tracing::info!(
            post_id = %post.id,
            slug = %post.slug,
            status = %post.status,
            "post created"
        );
        self.events.notify(BlogEvent::revalidate(BLOG_POSTS_TAG));
        self.announce(&post, ChangeKind::Created);
        Ok(post)
    }

    /// Apply a partial update. An explicit slug change must not collide.
    pub async fn update(&self, id: Uuid, patch: PostPatch) -> Result<Post, ServiceError> {
        let current = self.store.get(id).await?.ok_or(ServiceError::NotFound(id))?;

        let mut post = current.clone();
        patch.apply(&mut post, Utc::now());

        let errors = validate(post.fields());
        if !errors.is_empty() {
            return Err(ServiceError::Validation(errors));
        }

        if post.slug != current.slug && self.store.slug_exists(&post.slug, Some(id)).await? {
            return Err(ServiceError::SlugTaken(post.slug));
        }

        self.store.save(&post).await?;

        tracing::info!(
            post_id = %post.id,
            slug = %post.slug,
            status = %post.status,
            "post updated"
        );
        self.events.notify(BlogEvent::revalidate(BLOG_POSTS_TAG));
        self.events.notify(BlogEvent::revalidate(post_tag(&post.slug)));
        if post.slug != current.slug {
            self.events.notify(BlogEvent::revalidate(post_tag(&current.slug)));
        }
        self.announce(&post, ChangeKind::Updated);
        Ok(post)
    }

    pub async fn delete(&self, id: Uuid) -> Result<Post, ServiceError> {
        let post = self.store.delete(id).await?.ok_or(ServiceError::NotFound(id))?;

        tracing::info!(post_id = %post.id, slug = %post.slug, "post deleted");
        self.events.notify(BlogEvent::revalidate(BLOG_POSTS_TAG));
        self.events.notify(BlogEvent::revalidate(post_tag(&post.slug)));
        self.announce(&post, ChangeKind::Deleted);
        Ok(post)
    }

    /// Any post by id, drafts included. Does not count as a view.
    pub async fn get(&self, id: Uuid) -> Result<Post, ServiceError> {
        self.store.get(id).await?.ok_or(ServiceError::NotFound(id))
    }

    /// Every post, most recently created first.
    pub async fn list_all(&self) -> Result<Vec<Post>, ServiceError> {
        let mut posts = self.store.list().await?;
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }

    /// Published posts, most recently published first.
    pub async fn list_published(&self) -> Result<Vec<Post>, ServiceError> {
        let mut posts: Vec<Post> = self
            .store
            .list()
            .await?
            .into_iter()
            .filter(Post::is_published)
            .collect();
        posts.sort_by(|a, b| b.sort_date().cmp(&a.sort_date()));
        Ok(posts)
    }

    /// A published post for public display. Counts a view; failing to
    /// count it does not fail the read.
    pub async fn get_published_by_slug(&self, slug: &str) -> Result<Post, ServiceError> {
        let post = self
            .store
            .find_by_slug(slug)
            .await?
            .filter(Post::is_published)
            .ok_or_else(|| ServiceError::SlugNotFound(slug.to_string()))?;

        if let Err(err) = self.store.increment_views(post.id).await {
            tracing::warn!(post_id = %post.id, error = %err, "failed to increment view count");
        }
        Ok(post)
    }

    async fn unique_slug(&self, base: &str) -> Result<String, ServiceError> {
        for candidate in slug::candidates(base) {
            if !self.store.slug_exists(&candidate, None).await? {
                return Ok(candidate);
            }
        }
        Err(slug::exhausted(base).into())
    }

    fn announce(&self, post: &Post, change: ChangeKind) {
        self.events.notify(BlogEvent::PostChanged(PostChangeEvent {
            post_id: post.id,
            slug: post.slug.clone(),
            change,
            timestamp: Utc::now(),
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::post::PostStatus;
    use crate::store::MemoryStore;

    fn service() -> (PostService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (PostService::new(store.clone(), EventBus::new(64)), store)
    }

    fn input(title: &str) -> PostInput {
        PostInput {
            title: title.into(),
            content: "<p>Body</p>".into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn slug_search_gives_up_after_bounded_attempts() {
        let (service, store) = service();
        for candidate in slug::candidates("my-post") {
            let post = input("My Post").into_post(Uuid::new_v4(), candidate, Utc::now());
            store.insert(&post).await.unwrap();
        }

        let err = service.create(input("My Post")).await.unwrap_err();
        assert!(matches!(
            &err,
            ServiceError::Slug(SlugError::Exhausted { base, attempts })
                if base == "my-post" && *attempts == slug::MAX_SLUG_ATTEMPTS
        ));
        assert_eq!(crate::admin::ApiFailure::from(err).status, 409);
        assert_eq!(
            store.list().await.unwrap().len(),
            slug::MAX_SLUG_ATTEMPTS as usize
        );
    }

    #[tokio::test]
    async fn same_title_gets_suffixed_slug() {
        let (service, _) = service();
        let first = service.create(input("My Post")).await.unwrap();
        let second = service.create(input("My Post")).await.unwrap();
        assert_eq!(first.slug, "my-post");
        assert_eq!(second.slug, "my-post-1");
    }

    #[tokio::test]
    async fn invalid_input_is_not_stored() {
        let (service, store) = service();
        let err = service
            .create(PostInput {
                title: "Hi".into(),
                ..Default::default()
            })
            .await
            .unwrap_err();
        let ServiceError::Validation(errors) = err else {
            panic!("expected validation error, got {err:?}");
        };
        assert!(errors.get("title").is_some());
        assert!(errors.get("content").is_some());
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn explicit_bad_slug_rejected() {
        let (service, _) = service();
        let err = service
            .create(PostInput {
                slug: Some("Not A Slug".into()),
                ..input("Valid title")
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(ref e) if e.get("slug").is_some()));
    }

    #[tokio::test]
    async fn publishing_stamps_date_and_draft_clears_it() {
        let (service, _) = service();
        let post = service.create(input("Launch notes")).await.unwrap();
        assert_eq!(post.published_date, None);

        let published = service
            .update(
                post.id,
                PostPatch {
                    status: Some(PostStatus::Published),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(published.published_date.is_some());

        let draft = service
            .update(
                post.id,
                PostPatch {
                    status: Some(PostStatus::Draft),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(draft.published_date, None);
    }

    #[tokio::test]
    async fn slug_change_must_be_free() {
        let (service, _) = service();
        service.create(input("First post")).await.unwrap();
        let second = service.create(input("Second post")).await.unwrap();

        let err = service
            .update(
                second.id,
                PostPatch {
                    slug: Some("first-post".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::SlugTaken(ref s) if s == "first-post"));
    }

    #[tokio::test]
    async fn public_reads_only_see_published_posts() {
        let (service, store) = service();
        let draft = service.create(input("Hidden draft")).await.unwrap();
        let live = service
            .create(PostInput {
                status: Some(PostStatus::Published),
                ..input("Live post")
            })
            .await
            .unwrap();

        let listed = service.list_published().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, live.id);

        assert!(matches!(
            service.get_published_by_slug(&draft.slug).await,
            Err(ServiceError::SlugNotFound(_))
        ));

        service.get_published_by_slug("live-post").await.unwrap();
        assert_eq!(store.get(live.id).await.unwrap().unwrap().view_count, 1);
    }

    #[tokio::test]
    async fn list_all_is_newest_first() {
        let (service, _) = service();
        let older = service.create(input("Older one")).await.unwrap();
        let newer = service.create(input("Newer one")).await.unwrap();
        let ids: Vec<Uuid> = service.list_all().await.unwrap().iter().map(|p| p.id).collect();
        if newer.created_at > older.created_at {
            assert_eq!(ids, vec![newer.id, older.id]);
        } else {
            assert_eq!(ids.len(), 2);
        }
    }

    #[tokio::test]
    async fn mutations_publish_revalidation() {
        let (service, _) = service();
        let mut rx = service.events().subscribe();

        let post = service.create(input("Evented post")).await.unwrap();
        assert_eq!(rx.recv().await.unwrap(), BlogEvent::revalidate("blog-posts"));
        assert!(matches!(
            rx.recv().await.unwrap(),
            BlogEvent::PostChanged(e) if e.change == ChangeKind::Created
        ));

        service.delete(post.id).await.unwrap();
        assert_eq!(rx.recv().await.unwrap(), BlogEvent::revalidate("blog-posts"));
        assert_eq!(
            rx.recv().await.unwrap(),
            BlogEvent::revalidate("blog-post-evented-post")
        );
    }

    #[tokio::test]
    async fn missing_posts_are_not_found() {
        let (service, _) = service();
        let id = Uuid::now_v7();
        assert!(matches!(service.get(id).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(service.delete(id).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(
            service.update(id, PostPatch::default()).await,
            Err(ServiceError::NotFound(_))
        ));
    }
}
