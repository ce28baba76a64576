use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use super::models::{ArticleModel, NewArticle};
use crate::shared::AppError;

/// Owner-scoped article storage. Every operation is restricted to rows whose
/// `user_id` matches the caller.
#[async_trait]
pub trait ArticleRepository {
    async fn create(&self, user_id: i64, article: NewArticle) -> Result<ArticleModel, AppError>;
    /// Newest first. Returns the requested page and the user's total article count.
    async fn list(
        &self,
        user_id: i64,
        page: i64,
        page_size: i64,
    ) -> Result<(Vec<ArticleModel>, i64), AppError>;
    async fn get(&self, user_id: i64, id: i64) -> Result<Option<ArticleModel>, AppError>;
    /// Returns whether a row was removed
    async fn delete(&self, user_id: i64, id: i64) -> Result<bool, AppError>;
}

fn offset(page: i64, page_size: i64) -> i64 {
    (page.max(1) - 1).saturating_mul(page_size)
}

/// In-memory implementation of ArticleRepository for development and testing
pub struct InMemoryArticleRepository {
    articles: RwLock<Vec<ArticleModel>>,
    next_id: RwLock<i64>,
}

impl Default for InMemoryArticleRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryArticleRepository {
    pub fn new() -> Self {
        Self {
            articles: RwLock::new(Vec::new()),
            next_id: RwLock::new(1),
        }
    }
}

#[async_trait]
impl ArticleRepository for InMemoryArticleRepository {
    #[instrument(skip(self, article))]
    async fn create(&self, user_id: i64, article: NewArticle) -> Result<ArticleModel, AppError> {
        let mut next_id = self.next_id.write().await;
        let model = ArticleModel::from_new(*next_id, user_id, article, Utc::now());
        *next_id += 1;

        self.articles.write().await.push(model.clone());
        debug!(article_id = model.id, "Article created in memory");
        Ok(model)
    }

    #[instrument(skip(self))]
    async fn list(
        &self,
        user_id: i64,
        page: i64,
        page_size: i64,
    ) -> Result<(Vec<ArticleModel>, i64), AppError> {
        let articles = self.articles.read().await;
        let mut owned: Vec<_> = articles
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = owned.len() as i64;
        let items = owned
            .into_iter()
            .skip(offset(page, page_size) as usize)
            .take(page_size.max(0) as usize)
            .collect();
        Ok((items, total))
    }

    #[instrument(skip(self))]
    async fn get(&self, user_id: i64, id: i64) -> Result<Option<ArticleModel>, AppError> {
        Ok(self
            .articles
            .read()
            .await
            .iter()
            .find(|a| a.user_id == user_id && a.id == id)
            .cloned())
    }

    #[instrument(skip(self))]
    async fn delete(&self, user_id: i64, id: i64) -> Result<bool, AppError> {
        let mut articles = self.articles.write().await;
        let before = articles.len();
        articles.retain(|a| !(a.user_id == user_id && a.id == id));
        Ok(articles.len() < before)
    }
}

/// SQLite implementation of the article store
pub struct SqliteArticleRepository {
    pool: SqlitePool,
}

impl SqliteArticleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

const ARTICLE_COLUMNS: &str = "id, user_id, title, url, source, url_to_image, description, published_at, created_at, updated_at";

#[async_trait]
impl ArticleRepository for SqliteArticleRepository {
    #[instrument(skip(self, article))]
    async fn create(&self, user_id: i64, article: NewArticle) -> Result<ArticleModel, AppError> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO articles (user_id, title, url, source, url_to_image, description, published_at, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(&article.title)
        .bind(&article.url)
        .bind(&article.source)
        .bind(&article.url_to_image)
        .bind(&article.description)
        .bind(&article.published_at)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to create article in database");
            AppError::DatabaseError(e.to_string())
        })?;

        let model = ArticleModel::from_new(result.last_insert_rowid(), user_id, article, now);
        debug!(article_id = model.id, "Article created in database");
        Ok(model)
    }

    #[instrument(skip(self))]
    async fn list(
        &self,
        user_id: i64,
        page: i64,
        page_size: i64,
    ) -> Result<(Vec<ArticleModel>, i64), AppError> {
        let items = sqlx::query_as::<_, ArticleModel>(&format!(
            "SELECT {ARTICLE_COLUMNS} FROM articles WHERE user_id = ? \
             ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?"
        ))
        .bind(user_id)
        .bind(page_size)
        .bind(offset(page, page_size))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to list articles from database");
            AppError::DatabaseError(e.to_string())
        })?;

        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM articles WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to count articles in database");
                AppError::DatabaseError(e.to_string())
            })?;

        debug!(returned = items.len(), total = total, "Articles listed from database");
        Ok((items, total))
    }

    #[instrument(skip(self))]
    async fn get(&self, user_id: i64, id: i64) -> Result<Option<ArticleModel>, AppError> {
        sqlx::query_as::<_, ArticleModel>(&format!(
            "SELECT {ARTICLE_COLUMNS} FROM articles WHERE user_id = ? AND id = ?"
        ))
        .bind(user_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, article_id = id, "Failed to fetch article from database");
            AppError::DatabaseError(e.to_string())
        })
    }

    #[instrument(skip(self))]
    async fn delete(&self, user_id: i64, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM articles WHERE user_id = ? AND id = ?")
            .bind(user_id)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, article_id = id, "Failed to delete article from database");
                AppError::DatabaseError(e.to_string())
            })?;

        Ok(result.rows_affected() > 0)
    }
}
