use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Database model for the articles table. Every row belongs to exactly one user.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct ArticleModel {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub url: String,
    pub source: Option<String>,
    #[serde(rename = "urlToImage")]
    pub url_to_image: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "publishedAt")]
    pub published_at: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated, sanitised article fields ready for storage
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewArticle {
    pub title: String,
    pub url: String,
    pub source: Option<String>,
    pub url_to_image: Option<String>,
    pub description: Option<String>,
    pub published_at: Option<String>,
}

impl ArticleModel {
    pub fn from_new(id: i64, user_id: i64, article: NewArticle, now: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id,
            title: article.title,
            url: article.url,
            source: article.source,
            url_to_image: article.url_to_image,
            description: article.description,
            published_at: article.published_at,
            created_at: now,
            updated_at: now,
        }
    }
}
