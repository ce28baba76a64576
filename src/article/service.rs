use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{
    models::ArticleModel,
    repository::ArticleRepository,
    types::{ArticlePage, CreateArticleRequest, ListArticlesQuery},
};
use crate::shared::AppError;

/// Business logic for a user's saved articles
pub struct ArticleService {
    repository: Arc<dyn ArticleRepository + Send + Sync>,
}

impl ArticleService {
    pub fn new(repository: Arc<dyn ArticleRepository + Send + Sync>) -> Self {
        Self { repository }
    }

    #[instrument(skip(self, request))]
    pub async fn save(
        &self,
        user_id: i64,
        request: CreateArticleRequest,
    ) -> Result<ArticleModel, AppError> {
        let article = request.validate()?;
        let created = self.repository.create(user_id, article).await?;
        info!(article_id = created.id, "Article saved");
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        user_id: i64,
        query: &ListArticlesQuery,
    ) -> Result<ArticlePage, AppError> {
        let (page, page_size) = query.validate()?;
        let (items, total) = self.repository.list(user_id, page, page_size).await?;
        Ok(ArticlePage { items, total })
    }

    #[instrument(skip(self))]
    pub async fn get(&self, user_id: i64, id: i64) -> Result<ArticleModel, AppError> {
        self.repository.get(user_id, id).await?.ok_or_else(|| {
            warn!(article_id = id, "Article not found for user");
            AppError::NotFound("article not found".to_string())
        })
    }

    #[instrument(skip(self))]
    pub async fn remove(&self, user_id: i64, id: i64) -> Result<(), AppError> {
        if !self.repository.delete(user_id, id).await? {
            warn!(article_id = id, "Article not found for deletion");
            return Err(AppError::NotFound("article not found".to_string()));
        }
        info!(article_id = id, "Article removed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::article::repository::InMemoryArticleRepository;

    fn request(title: &str) -> CreateArticleRequest {
        CreateArticleRequest {
            title: Some(title.to_string()),
            url: Some("https://example.com/story".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_save_and_list() {
        let service = ArticleService::new(Arc::new(InMemoryArticleRepository::new()));
        service.save(1, request("Hello world")).await.unwrap();

        let page = service.list(1, &ListArticlesQuery::default()).await.unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].title, "Hello world");
    }

    #[tokio::test]
    async fn test_invalid_article_not_stored() {
        let repository = Arc::new(InMemoryArticleRepository::new());
        let service = ArticleService::new(repository.clone());
        let result = service.save(1, request("x")).await;
        assert!(matches!(result, Err(AppError::Validation(_))));

        let (_, total) = repository.list(1, 1, 10).await.unwrap();
        assert_eq!(total, 0);
    }

    #[tokio::test]
    async fn test_get_and_remove_missing() {
        let service = ArticleService::new(Arc::new(InMemoryArticleRepository::new()));
        assert!(matches!(service.get(1, 99).await, Err(AppError::NotFound(_))));
        assert!(matches!(service.remove(1, 99).await, Err(AppError::NotFound(_))));
    }
}
