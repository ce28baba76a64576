use std::{env, fmt::Display, str::FromStr};

use tracing::{info, warn};

/// Signing key used when `JWT_SECRET` is not set. Only suitable for local development.
pub const DEV_JWT_SECRET: &str = "dev_secret";

pub const DEFAULT_BCRYPT_COST: u32 = 10;

pub const DEFAULT_NEWSAPI_BASE_URL: &str = "https://newsapi.org/v2/everything";

/// Process configuration, read once at startup
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    pub bcrypt_cost: u32,
    pub newsapi_key: Option<String>,
    pub newsapi_base_url: String,
    pub seed_default_user: bool,
    pub production: bool,
}

impl AppConfig {
    /// Loads configuration from the environment, after merging an optional `.env` file
    pub fn from_env() -> Self {
        if dotenvy::dotenv().is_ok() {
            info!("Loaded environment from .env");
        }

        let jwt_secret = var("JWT_SECRET").unwrap_or_else(|| {
            warn!("JWT_SECRET not set, falling back to insecure development key");
            DEV_JWT_SECRET.to_string()
        });

        Self {
            port: try_load("PORT", 3000),
            database_url: var("DATABASE_URL")
                .unwrap_or_else(|| "sqlite://data.sqlite".to_string()),
            jwt_secret,
            bcrypt_cost: try_load("BCRYPT_COST", DEFAULT_BCRYPT_COST),
            newsapi_key: var("NEWSAPI_KEY"),
            newsapi_base_url: var("NEWSAPI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_NEWSAPI_BASE_URL.to_string()),
            seed_default_user: var("SEED_DEFAULT_USER").as_deref() == Some("true"),
            production: var("APP_ENV").as_deref() == Some("production"),
        }
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn try_load<T>(key: &str, default: T) -> T
where
    T: FromStr + Display,
    T::Err: Display,
{
    match var(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|e| {
            warn!("Invalid {key} value {raw:?}: {e}, using default: {default}");
            default
        }),
        None => {
            info!("{key} not set, using default: {default}");
            default
        }
    }
}
