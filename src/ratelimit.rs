use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::warn;

use crate::shared::AppError;

/// Requests a single client may make per window
pub const RATE_LIMIT_MAX_REQUESTS: usize = 300;

pub const RATE_LIMIT_WINDOW: Duration = Duration::from_secs(15 * 60);

/// How often idle client entries are swept from the map
const SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

struct Windows {
    requests: HashMap<String, Vec<Instant>>,
    last_sweep: Instant,
}

/// Per-client sliding window limiter
pub struct SlidingWindowRateLimiter {
    limit: usize,
    window: Duration,
    windows: Mutex<Windows>,
}

impl SlidingWindowRateLimiter {
    pub fn new(limit: usize, window: Duration) -> Self {
        Self {
            limit,
            window,
            windows: Mutex::new(Windows {
                requests: HashMap::new(),
                last_sweep: Instant::now(),
            }),
        }
    }

    /// Records a request for `key` and reports whether it fits in the window.
    /// A limit of zero disables limiting.
    pub async fn allow(&self, key: &str) -> bool {
        if self.limit == 0 {
            return true;
        }

        let now = Instant::now();
        let window = self.window;
        let mut windows = self.windows.lock().await;

        if now.duration_since(windows.last_sweep) >= SWEEP_INTERVAL {
            windows.requests.retain(|_, stamps| {
                stamps.retain(|t| now.duration_since(*t) < window);
                !stamps.is_empty()
            });
            windows.last_sweep = now;
        }

        let stamps = windows.requests.entry(key.to_string()).or_default();
        stamps.retain(|t| now.duration_since(*t) < window);

        if stamps.len() >= self.limit {
            return false;
        }
        stamps.push(now);
        true
    }

    pub async fn tracked_clients(&self) -> usize {
        self.windows.lock().await.requests.len()
    }
}

impl Default for SlidingWindowRateLimiter {
    fn default() -> Self {
        Self::new(RATE_LIMIT_MAX_REQUESTS, RATE_LIMIT_WINDOW)
    }
}

/// Client identity: first proxy-forwarded address, then the peer address
pub fn client_key(req: &Request) -> String {
    for header in ["x-forwarded-for", "x-real-ip"] {
        if let Some(value) = req.headers().get(header).and_then(|v| v.to_str().ok()) {
            let first = value.split(',').next().unwrap_or_default().trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }

    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

pub async fn rate_limit(
    State(limiter): State<Arc<SlidingWindowRateLimiter>>,
    req: Request,
    next: Next,
) -> Response {
    let key = client_key(&req);
    if !limiter.allow(&key).await {
        warn!(client = %key, "Rate limit exceeded");
        return AppError::RateLimited.into_response();
    }
    next.run(req).await
}
