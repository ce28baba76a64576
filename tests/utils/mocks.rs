use async_trait::async_trait;
use std::sync::Mutex;

use newsdesk::{
    news::{
        types::{NewsResponse, NewsSearch},
        NewsClient,
    },
    AppError,
};

/// News client that records every search and answers with a canned result
pub struct StubNewsClient {
    searches: Mutex<Vec<NewsSearch>>,
    fail_with: Option<String>,
}

#[allow(dead_code)]
impl StubNewsClient {
    pub fn new() -> Self {
        Self {
            searches: Mutex::new(Vec::new()),
            fail_with: None,
        }
    }

    /// Every search fails as if the upstream answered with `message`
    pub fn failing(message: &str) -> Self {
        Self {
            searches: Mutex::new(Vec::new()),
            fail_with: Some(message.to_string()),
        }
    }

    pub fn searches(&self) -> Vec<NewsSearch> {
        self.searches.lock().unwrap().clone()
    }
}

#[async_trait]
impl NewsClient for StubNewsClient {
    async fn search(&self, search: &NewsSearch) -> Result<NewsResponse, AppError> {
        self.searches.lock().unwrap().push(search.clone());

        if let Some(message) = &self.fail_with {
            return Err(AppError::Upstream(message.clone()));
        }

        Ok(NewsResponse {
            status: "ok".to_string(),
            total_results: 1,
            articles: vec![serde_json::json!({
                "title": format!("About {}", search.q),
                "url": "https://news.example.com/story",
            })],
        })
    }
}
