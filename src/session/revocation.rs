use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::interval;
use tracing::{debug, info, instrument};

/// Set of revoked token identifiers.
///
/// A revoked identifier must never authenticate again. Implementations may forget an
/// identifier once its token's own expiry has passed, since expired tokens are rejected
/// before the registry is consulted.
#[async_trait]
pub trait RevocationRegistry {
    /// Marks `jti` as revoked. Idempotent; an empty identifier is ignored.
    async fn revoke(&self, jti: &str, expires_at: usize);
    async fn is_revoked(&self, jti: &str) -> bool;
    /// Drops entries whose token expired before `now` (unix seconds). Returns how many were dropped.
    async fn purge_expired(&self, now: usize) -> usize;
}

/// Process-local registry. Entries are lost on restart and are not shared between
/// instances, so this only suits a single-instance deployment.
#[derive(Default)]
pub struct InMemoryRevocationRegistry {
    revoked: RwLock<HashMap<String, usize>>, // jti -> token exp
}

impl InMemoryRevocationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.revoked.read().await.len()
    }
}

#[async_trait]
impl RevocationRegistry for InMemoryRevocationRegistry {
    #[instrument(skip(self))]
    async fn revoke(&self, jti: &str, expires_at: usize) {
        if jti.is_empty() {
            debug!("Ignoring revocation of empty token identifier");
            return;
        }
        let mut revoked = self.revoked.write().await;
        let entry = revoked.entry(jti.to_string()).or_insert(expires_at);
        *entry = (*entry).max(expires_at);
        debug!(jti = %jti, revoked_count = revoked.len(), "Token identifier revoked");
    }

    async fn is_revoked(&self, jti: &str) -> bool {
        if jti.is_empty() {
            return false;
        }
        self.revoked.read().await.contains_key(jti)
    }

    #[instrument(skip(self))]
    async fn purge_expired(&self, now: usize) -> usize {
        let mut revoked = self.revoked.write().await;
        let before = revoked.len();
        revoked.retain(|_, exp| *exp >= now);
        let removed = before - revoked.len();
        debug!(removed = removed, remaining = revoked.len(), "Purged expired revocations");
        removed
    }
}

/// How often the background purge runs
pub const PURGE_INTERVAL: Duration = Duration::from_secs(10 * 60);

/// Periodically drops revocations for tokens that have expired on their own
pub async fn start_purge_task(
    registry: Arc<dyn RevocationRegistry + Send + Sync>,
    every: Duration,
) {
    info!(
        purge_interval_secs = every.as_secs(),
        "Starting revocation purge background task"
    );

    let mut ticker = interval(every);
    loop {
        ticker.tick().await;
        let now = chrono::Utc::now().timestamp() as usize;
        let removed = registry.purge_expired(now).await;
        if removed > 0 {
            info!(removed = removed, "Revocation purge completed");
        }
    }
}
