use axum::Router;
use std::sync::Arc;
use std::time::Duration;

use newsdesk::{
    article::repository::{ArticleRepository, InMemoryArticleRepository, SqliteArticleRepository},
    database,
    news::{CachedNewsClient, NewsClient},
    ratelimit::{SlidingWindowRateLimiter, RATE_LIMIT_WINDOW},
    router,
    user::{InMemoryUserRepository, SqliteUserRepository, UserRepository},
    AppState, InMemoryRevocationRegistry, SessionService, TokenConfig,
};

use super::mocks::StubNewsClient;

pub const TEST_SECRET: &str = "integration-test-secret";

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

#[allow(dead_code)]
pub struct TestSetup {
    pub app: Router,
    pub revocations: Arc<InMemoryRevocationRegistry>,
    pub news_client: Arc<StubNewsClient>,
    pub token_config: TokenConfig,
}

pub struct TestSetupBuilder {
    news_client: Arc<StubNewsClient>,
    news_cache_ttl: Option<Duration>,
    rate_limit: Option<usize>,
    sqlite: bool,
}

#[allow(dead_code)]
impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            news_client: Arc::new(StubNewsClient::new()),
            news_cache_ttl: None,
            rate_limit: None,
            sqlite: false,
        }
    }

    /// Put a response cache with `ttl` in front of the stub news client
    pub fn with_news_cache(mut self, ttl: Duration) -> Self {
        self.news_cache_ttl = Some(ttl);
        self
    }

    /// Limit each client to `max` requests per window
    pub fn with_rate_limit(mut self, max: usize) -> Self {
        self.rate_limit = Some(max);
        self
    }

    pub fn with_news_client(mut self, client: StubNewsClient) -> Self {
        self.news_client = Arc::new(client);
        self
    }

    /// Back the stores with an in-memory SQLite database instead of plain maps
    pub fn with_sqlite(mut self) -> Self {
        self.sqlite = true;
        self
    }

    pub async fn build(self) -> TestSetup {
        let (users, articles): (
            Arc<dyn UserRepository + Send + Sync>,
            Arc<dyn ArticleRepository + Send + Sync>,
        ) = if self.sqlite {
            let pool = database::connect("sqlite::memory:", 1).await.unwrap();
            database::ensure_schema(&pool).await.unwrap();
            (
                Arc::new(SqliteUserRepository::new(pool.clone())),
                Arc::new(SqliteArticleRepository::new(pool)),
            )
        } else {
            (
                Arc::new(InMemoryUserRepository::new()),
                Arc::new(InMemoryArticleRepository::new()),
            )
        };

        let revocations = Arc::new(InMemoryRevocationRegistry::new());
        let token_config = TokenConfig::new(TEST_SECRET);
        let session_service = Arc::new(SessionService::new(
            users,
            revocations.clone(),
            token_config.clone(),
            4,
        ));

        let stub: Arc<dyn NewsClient + Send + Sync> = self.news_client.clone();
        let news_client: Arc<dyn NewsClient + Send + Sync> = match self.news_cache_ttl {
            Some(ttl) => Arc::new(CachedNewsClient::new(stub, ttl)),
            None => stub,
        };
        let mut state = AppState::new(session_service, articles, news_client);
        if let Some(max) = self.rate_limit {
            state = state.with_rate_limiter(Arc::new(SlidingWindowRateLimiter::new(
                max,
                RATE_LIMIT_WINDOW,
            )));
        }

        TestSetup {
            app: router(state, false),
            revocations,
            news_client: self.news_client,
            token_config,
        }
    }
}
