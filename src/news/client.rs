use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use super::types::{NewsResponse, NewsSearch};
use crate::shared::AppError;

/// Upstream news search
#[async_trait]
pub trait NewsClient {
    async fn search(&self, search: &NewsSearch) -> Result<NewsResponse, AppError>;
}

/// Client for the NewsAPI `everything` endpoint
pub struct NewsApiClient {
    http_client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl NewsApiClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            http_client: reqwest::Client::builder()
                .timeout(Duration::from_secs(15))
                .build()
                .unwrap_or_default(),
            base_url: base_url.into(),
            api_key,
        }
    }
}

fn upstream_message(body: &Value) -> String {
    body.get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| "error querying the news API".to_string())
}

#[async_trait]
impl NewsClient for NewsApiClient {
    #[instrument(skip(self), fields(q = %search.q))]
    async fn search(&self, search: &NewsSearch) -> Result<NewsResponse, AppError> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            warn!("News search requested but NEWSAPI_KEY is not configured");
            AppError::Config("NEWSAPI_KEY is not configured".to_string())
        })?;

        let mut query = search.query_pairs();
        query.push(("apiKey", api_key.to_string()));

        let response = self
            .http_client
            .get(&self.base_url)
            .query(&query)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "News API request failed");
                AppError::Internal
            })?;

        let status = response.status();
        let body: Value = match response.json().await {
            Ok(body) => body,
            Err(e) if status.is_success() => {
                warn!(error = %e, "News API returned an unreadable body");
                return Err(AppError::Internal);
            }
            Err(_) => Value::Null,
        };

        if !status.is_success() || body.get("status").and_then(Value::as_str) == Some("error") {
            let message = upstream_message(&body);
            warn!(status = %status, message = %message, "News API reported an error");
            return Err(AppError::Upstream(message));
        }

        let total_results = body
            .get("totalResults")
            .and_then(Value::as_u64)
            .unwrap_or(0);
        let articles = body
            .get("articles")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        debug!(total_results = total_results, returned = articles.len(), "News search completed");
        Ok(NewsResponse {
            status: "ok".to_string(),
            total_results,
            articles,
        })
    }
}
