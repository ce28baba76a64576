pub use cache::{CachedNewsClient, NEWS_CACHE_TTL};
pub use client::{NewsApiClient, NewsClient};
pub use handlers::search_news;

pub mod cache;
pub mod client;
mod handlers;
pub mod types;
