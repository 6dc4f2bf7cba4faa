//! Page persistence behind a trait so the resolver and handlers never name the backend.
//!
//! `AppState` carries an `Arc<dyn PageStore>`; production uses `PgPageStore`, tests use
//! the in-memory store below.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::with_retry;
use crate::errors::AppError;
use crate::models::page::{NewPage, PageMetadataUpdate, PageRow};

#[async_trait]
pub trait PageStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<PageRow>, AppError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<PageRow>, AppError>;

    /// Published slugs, most recently updated first, at most `limit` of them.
    async fn list_published_slugs(&self, limit: i64) -> Result<Vec<String>, AppError>;

    async fn list_by_owner(&self, user_id: Uuid) -> Result<Vec<PageRow>, AppError>;

    /// Inserts a page with an empty layout. Duplicate slugs yield `AppError::Conflict`.
    async fn create(&self, page: &NewPage) -> Result<PageRow, AppError>;

    /// The mutations below only touch rows owned by `user_id`; `None` means no such row.
    async fn update_metadata(
        &self,
        id: Uuid,
        user_id: Uuid,
        update: &PageMetadataUpdate,
    ) -> Result<Option<PageRow>, AppError>;

    async fn set_published(
        &self,
        id: Uuid,
        user_id: Uuid,
        published: bool,
    ) -> Result<Option<PageRow>, AppError>;

    async fn save_layout(
        &self,
        id: Uuid,
        user_id: Uuid,
        layout: Option<&Value>,
    ) -> Result<Option<PageRow>, AppError>;

    async fn increment_view_count(&self, id: Uuid) -> Result<(), AppError>;
}

const PAGE_COLUMNS: &str = "id, user_id, slug, title, description, layout, published, \
                            view_count, created_at, updated_at";

/// PostgreSQL-backed store. Every query runs through `with_retry`.
#[derive(Clone)]
pub struct PgPageStore {
    pool: PgPool,
    retry_attempts: u32,
}

impl PgPageStore {
    pub fn new(pool: PgPool, retry_attempts: u32) -> Self {
        Self {
            pool,
            retry_attempts,
        }
    }
}

fn map_write_error(err: sqlx::Error) -> AppError {
    match err.as_database_error() {
        Some(db_err) if db_err.is_unique_violation() => {
            AppError::Conflict("A page with this slug already exists".to_string())
        }
        _ => AppError::Database(err),
    }
}

#[async_trait]
impl PageStore for PgPageStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<PageRow>, AppError> {
        let sql = format!("SELECT {PAGE_COLUMNS} FROM pages WHERE id = $1");
        let pool = &self.pool;
        Ok(with_retry(self.retry_attempts, || {
            sqlx::query_as::<_, PageRow>(&sql)
                .bind(id)
                .fetch_optional(pool)
        })
        .await?)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<PageRow>, AppError> {
        let sql = format!("SELECT {PAGE_COLUMNS} FROM pages WHERE slug = $1");
        let pool = &self.pool;
        Ok(with_retry(self.retry_attempts, || {
            sqlx::query_as::<_, PageRow>(&sql)
                .bind(slug)
                .fetch_optional(pool)
        })
        .await?)
    }

    async fn list_published_slugs(&self, limit: i64) -> Result<Vec<String>, AppError> {
        let pool = &self.pool;
        Ok(with_retry(self.retry_attempts, || {
            sqlx::query_scalar::<_, String>(
                "SELECT slug FROM pages WHERE published ORDER BY updated_at DESC LIMIT $1",
            )
            .bind(limit)
            .fetch_all(pool)
        })
        .await?)
    }

    async fn list_by_owner(&self, user_id: Uuid) -> Result<Vec<PageRow>, AppError> {
        let sql = format!(
            "SELECT {PAGE_COLUMNS} FROM pages WHERE user_id = $1 ORDER BY updated_at DESC"
        );
        let pool = &self.pool;
        Ok(with_retry(self.retry_attempts, || {
            sqlx::query_as::<_, PageRow>(&sql)
                .bind(user_id)
                .fetch_all(pool)
        })
        .await?)
    }

    async fn create(&self, page: &NewPage) -> Result<PageRow, AppError> {
        let sql = format!(
            "INSERT INTO pages (id, user_id, slug, title, description, layout, published) \
             VALUES ($1, $2, $3, $4, $5, NULL, FALSE) \
             RETURNING {PAGE_COLUMNS}"
        );
        let id = Uuid::new_v4();
        let pool = &self.pool;
        with_retry(self.retry_attempts, || {
            sqlx::query_as::<_, PageRow>(&sql)
                .bind(id)
                .bind(page.user_id)
                .bind(&page.slug)
                .bind(&page.title)
                .bind(&page.description)
                .fetch_one(pool)
        })
        .await
        .map_err(map_write_error)
    }

    async fn update_metadata(
        &self,
        id: Uuid,
        user_id: Uuid,
        update: &PageMetadataUpdate,
    ) -> Result<Option<PageRow>, AppError> {
        let sql = format!(
            "UPDATE pages \
             SET title = COALESCE($1, title), \
                 description = COALESCE($2, description), \
                 slug = COALESCE($3, slug), \
                 updated_at = NOW() \
             WHERE id = $4 AND user_id = $5 \
             RETURNING {PAGE_COLUMNS}"
        );
        let pool = &self.pool;
        with_retry(self.retry_attempts, || {
            sqlx::query_as::<_, PageRow>(&sql)
                .bind(&update.title)
                .bind(&update.description)
                .bind(&update.slug)
                .bind(id)
                .bind(user_id)
                .fetch_optional(pool)
        })
        .await
        .map_err(map_write_error)
    }

    async fn set_published(
        &self,
        id: Uuid,
        user_id: Uuid,
        published: bool,
    ) -> Result<Option<PageRow>, AppError> {
        let sql = format!(
            "UPDATE pages SET published = $1, updated_at = NOW() \
             WHERE id = $2 AND user_id = $3 \
             RETURNING {PAGE_COLUMNS}"
        );
        let pool = &self.pool;
        Ok(with_retry(self.retry_attempts, || {
            sqlx::query_as::<_, PageRow>(&sql)
                .bind(published)
                .bind(id)
                .bind(user_id)
                .fetch_optional(pool)
        })
        .await?)
    }

    async fn save_layout(
        &self,
        id: Uuid,
        user_id: Uuid,
        layout: Option<&Value>,
    ) -> Result<Option<PageRow>, AppError> {
        let sql = format!(
            "UPDATE pages SET layout = $1, updated_at = NOW() \
             WHERE id = $2 AND user_id = $3 \
             RETURNING {PAGE_COLUMNS}"
        );
        let pool = &self.pool;
        Ok(with_retry(self.retry_attempts, || {
            sqlx::query_as::<_, PageRow>(&sql)
                .bind(layout)
                .bind(id)
                .bind(user_id)
                .fetch_optional(pool)
        })
        .await?)
    }

    async fn increment_view_count(&self, id: Uuid) -> Result<(), AppError> {
        let pool = &self.pool;
        with_retry(self.retry_attempts, || {
            sqlx::query("UPDATE pages SET view_count = view_count + 1 WHERE id = $1")
                .bind(id)
                .execute(pool)
        })
        .await?;
        Ok(())
    }
}
