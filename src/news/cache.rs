use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;

use super::client::NewsClient;
use super::types::{NewsResponse, NewsSearch};
use crate::shared::AppError;

pub const NEWS_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// Serves repeated identical searches from memory for `ttl`.
/// Only successful results are stored.
pub struct CachedNewsClient {
    inner: Arc<dyn NewsClient + Send + Sync>,
    ttl: Duration,
    entries: RwLock<HashMap<NewsSearch, (Instant, NewsResponse)>>,
}

impl CachedNewsClient {
    pub fn new(inner: Arc<dyn NewsClient + Send + Sync>, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait]
impl NewsClient for CachedNewsClient {
    async fn search(&self, search: &NewsSearch) -> Result<NewsResponse, AppError> {
        if let Some((stored_at, response)) = self.entries.read().await.get(search) {
            if stored_at.elapsed() < self.ttl {
                debug!(q = %search.q, "News cache hit");
                return Ok(response.clone());
            }
        }

        let response = self.inner.search(search).await?;

        let now = Instant::now();
        let mut entries = self.entries.write().await;
        entries.retain(|_, (stored_at, _)| now.duration_since(*stored_at) < self.ttl);
        entries.insert(search.clone(), (now, response.clone()));
        Ok(response)
    }
}
