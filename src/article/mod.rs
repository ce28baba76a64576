pub use handlers::{create_article, delete_article, get_article, list_articles};

mod handlers;
pub mod models;
pub mod repository;
pub mod service;
pub mod types;
