use serde::{Deserialize, Serialize};

use super::models::{ArticleModel, NewArticle};
use crate::shared::{is_http_url, parse_ranged, AppError, Validator};

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MIN_PAGE_SIZE: i64 = 5;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Body of POST /api/articles
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateArticleRequest {
    pub title: Option<String>,
    pub url: Option<String>,
    pub source: Option<String>,
    #[serde(rename = "urlToImage")]
    pub url_to_image: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "publishedAt")]
    pub published_at: Option<String>,
}

impl CreateArticleRequest {
    /// Validates field lengths and URLs, then strips markup from title and description
    pub fn validate(self) -> Result<NewArticle, AppError> {
        let mut validator = Validator::new();

        let title = self.title.unwrap_or_default();
        let title_len = title.chars().count();
        validator.check(
            (2..=300).contains(&title_len),
            "title",
            "title must be between 2 and 300 characters",
        );

        let url = self.url.unwrap_or_default();
        validator.check(is_http_url(&url), "url", "url must be an absolute http(s) URL");

        if let Some(source) = &self.source {
            validator.check(
                source.chars().count() <= 120,
                "source",
                "source must be at most 120 characters",
            );
        }
        if let Some(image) = &self.url_to_image {
            validator.check(
                is_http_url(image) && image.chars().count() <= 500,
                "urlToImage",
                "urlToImage must be a URL of at most 500 characters",
            );
        }
        if let Some(description) = &self.description {
            validator.check(
                description.chars().count() <= 1000,
                "description",
                "description must be at most 1000 characters",
            );
        }
        if let Some(published_at) = &self.published_at {
            validator.check(
                published_at.chars().count() <= 50,
                "publishedAt",
                "publishedAt must be at most 50 characters",
            );
        }

        validator.finish()?;

        Ok(NewArticle {
            title: strip_markup(&title),
            url,
            source: self.source,
            url_to_image: self.url_to_image,
            description: self.description.as_deref().map(strip_markup),
            published_at: self.published_at,
        })
    }
}

/// Removes all HTML tags, keeping only text
pub fn strip_markup(text: &str) -> String {
    nanohtml2text::html2text(text).trim().to_string()
}

/// Raw query string of GET /api/articles
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListArticlesQuery {
    pub page: Option<String>,
    #[serde(rename = "pageSize")]
    pub page_size: Option<String>,
}

impl ListArticlesQuery {
    /// Returns `(page, page_size)` with defaults applied
    pub fn validate(&self) -> Result<(i64, i64), AppError> {
        let mut validator = Validator::new();
        let page = parse_ranged(&mut validator, "page", self.page.as_deref(), 1, 1, i64::MAX);
        let page_size = parse_ranged(
            &mut validator,
            "pageSize",
            self.page_size.as_deref(),
            DEFAULT_PAGE_SIZE,
            MIN_PAGE_SIZE,
            MAX_PAGE_SIZE,
        );
        validator.finish()?;
        Ok((page, page_size))
    }
}

/// One page of a user's saved articles
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ArticlePage {
    pub items: Vec<ArticleModel>,
    pub total: i64,
}

/// Parses an article id path segment; must be a positive integer
pub fn parse_article_id(raw: &str) -> Result<i64, AppError> {
    let mut validator = Validator::new();
    let id = parse_ranged(&mut validator, "id", Some(raw), 0, 1, i64::MAX);
    validator.finish()?;
    Ok(id)
}
