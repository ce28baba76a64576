// Library crate for the news desk API
// This file exposes the public API for integration tests

pub mod app;
pub mod article;
pub mod config;
pub mod database;
pub mod news;
pub mod ratelimit;
pub mod session;
pub mod shared;
pub mod user;

// Re-export commonly used types for easier access in tests
pub use app::router;
pub use config::AppConfig;
pub use session::{InMemoryRevocationRegistry, RevocationRegistry, SessionClaims, SessionService, TokenConfig};
pub use shared::{AppError, AppState};
