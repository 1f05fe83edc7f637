use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use super::{ContactStore, PostStore, StoreError};
use crate::contact::ContactMessage;
use crate::order::Order;
use crate::post::{Post, PostStatus};

const POST_COLUMNS: &str = "id, title, slug, author, hero_image_url, content, meta_description, \
     tags, status, featured, published_date, view_count, created_at, updated_at";

/// Database row representation of a post.
#[derive(Debug, Clone, sqlx::FromRow)]
struct PostRow {
    id: Uuid,
    title: String,
    slug: String,
    author: String,
    hero_image_url: String,
    content: String,
    meta_description: String,
    tags: Vec<String>,
    status: String,
    featured: bool,
    published_date: Option<DateTime<Utc>>,
    view_count: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PostRow> for Post {
    type Error = StoreError;

    fn try_from(row: PostRow) -> Result<Self, Self::Error> {
        let status: PostStatus = row.status.parse().map_err(StoreError::Corrupt)?;
        Ok(Post {
            id: row.id,
            title: row.title,
            slug: row.slug,
            author: row.author,
            hero_image_url: row.hero_image_url,
            content: row.content,
            meta_description: row.meta_description,
            tags: row.tags,
            status,
            featured: row.featured,
            published_date: row.published_date,
            view_count: row.view_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// PostgreSQL-backed store. Schema lives in the workspace `migrations/`.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    async fn fetch_optional(
        &self,
        sql: &str,
        bind: impl ToString,
    ) -> Result<Option<Post>, StoreError> {
        sqlx::query_as::<_, PostRow>(sql)
            .bind(bind.to_string())
            .fetch_optional(&self.pool)
            .await?
            .map(Post::try_from)
            .transpose()
    }
}

/// Unique-index violations on `slug` surface as conflicts.
fn map_write_error(err: sqlx::Error, slug: &str) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::SlugConflict(slug.to_string())
        }
        _ => StoreError::Database(err),
    }
}

#[async_trait]
impl PostStore for PgStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Post>, StoreError> {
        let sql = format!("SELECT {POST_COLUMNS} FROM posts ORDER BY created_at ASC, id ASC");
        sqlx::query_as::<_, PostRow>(&sql)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Post::try_from)
            .collect()
    }

    async fn get(&self, id: Uuid) -> Result<Option<Post>, StoreError> {
        let sql = format!("SELECT {POST_COLUMNS} FROM posts WHERE id = $1");
        sqlx::query_as::<_, PostRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Post::try_from)
            .transpose()
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, StoreError> {
        let sql = format!("SELECT {POST_COLUMNS} FROM posts WHERE slug = $1");
        self.fetch_optional(&sql, slug).await
    }

    async fn slug_exists(&self, slug: &str, except: Option<Uuid>) -> Result<bool, StoreError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM posts \
             WHERE slug = $1 AND ($2::uuid IS NULL OR id <> $2))",
        )
        .bind(slug)
        .bind(except)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn insert(&self, post: &Post) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO posts (id, title, slug, author, hero_image_url, content, \
             meta_description, tags, status, featured, published_date, view_count, \
             created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)",
        )
        .bind(post.id)
        .bind(&post.title)
        .bind(&post.slug)
        .bind(&post.author)
        .bind(&post.hero_image_url)
        .bind(&post.content)
        .bind(&post.meta_description)
        .bind(&post.tags)
        .bind(post.status.as_str())
        .bind(post.featured)
        .bind(post.published_date)
        .bind(post.view_count)
        .bind(post.created_at)
        .bind(post.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, &post.slug))?;
        Ok(())
    }

    async fn save(&self, post: &Post) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE posts SET title = $2, slug = $3, author = $4, hero_image_url = $5, \
             content = $6, meta_description = $7, tags = $8, status = $9, featured = $10, \
             published_date = $11, updated_at = $12 WHERE id = $1",
        )
        .bind(post.id)
        .bind(&post.title)
        .bind(&post.slug)
        .bind(&post.author)
        .bind(&post.hero_image_url)
        .bind(&post.content)
        .bind(&post.meta_description)
        .bind(&post.tags)
        .bind(post.status.as_str())
        .bind(post.featured)
        .bind(post.published_date)
        .bind(post.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, &post.slug))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(post.id));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Post>, StoreError> {
        let sql = format!("DELETE FROM posts WHERE id = $1 RETURNING {POST_COLUMNS}");
        sqlx::query_as::<_, PostRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Post::try_from)
            .transpose()
    }

    async fn increment_views(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE posts SET view_count = view_count + 1 WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }
}

#[async_trait]
impl ContactStore for PgStore {
    async fn insert_contact(&self, message: &ContactMessage) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO contact_messages (id, name, email, topic, message, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(message.id)
        .bind(&message.name)
        .bind(&message.email)
        .bind(&message.topic)
        .bind(&message.message)
        .bind(message.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn insert_order(&self, order: &Order) -> Result<(), StoreError> {
        let client = &order.client_info;
        sqlx::query(
            "INSERT INTO orders (id, client_name, client_email, client_phone, items, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(order.id)
        .bind(&client.name)
        .bind(&client.email)
        .bind(&client.phone)
        .bind(Json(&order.items))
        .bind(order.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
