use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tracing::{info, instrument};

use crate::shared::AppError;
use crate::user::password::hash_password;
use crate::user::{NewUser, UserRepository};

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        email TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        name TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS articles (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        title TEXT NOT NULL,
        url TEXT NOT NULL,
        source TEXT,
        url_to_image TEXT,
        description TEXT,
        published_at TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_articles_user_created ON articles (user_id, created_at)",
];

/// Opens a SQLite pool, creating the database file if needed.
/// `sqlite::memory:` with `max_connections = 1` gives a private database for tests.
#[instrument]
pub async fn connect(database_url: &str, max_connections: u32) -> Result<SqlitePool, AppError> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .min_connections(1)
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    info!(database_url = %database_url, "Connected to database");
    Ok(pool)
}

/// Creates the users and articles tables if they do not exist
#[instrument(skip(pool))]
pub async fn ensure_schema(pool: &SqlitePool) -> Result<(), AppError> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    info!("Database schema ready");
    Ok(())
}

pub const DEFAULT_USER_EMAIL: &str = "admin@example.com";
pub const DEFAULT_USER_PASSWORD: &str = "admin123";
pub const DEFAULT_USER_NAME: &str = "Admin";

/// Creates the default admin account unless it already exists
#[instrument(skip(users))]
pub async fn seed_default_user(
    users: &(dyn UserRepository + Send + Sync),
    bcrypt_cost: u32,
) -> Result<bool, AppError> {
    if users.find_by_email(DEFAULT_USER_EMAIL).await?.is_some() {
        info!("Default user already present");
        return Ok(false);
    }

    users
        .create(NewUser {
            email: DEFAULT_USER_EMAIL.to_string(),
            password_hash: hash_password(DEFAULT_USER_PASSWORD, bcrypt_cost).await?,
            name: DEFAULT_USER_NAME.to_string(),
        })
        .await?;

    info!(email = DEFAULT_USER_EMAIL, "Seeded default user");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::SqliteUserRepository;

    #[tokio::test]
    async fn test_ensure_schema_is_repeatable() {
        let pool = connect("sqlite::memory:", 1).await.unwrap();
        ensure_schema(&pool).await.unwrap();
        ensure_schema(&pool).await.unwrap();

        let tables: Vec<(String,)> =
            sqlx::query_as("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
                .fetch_all(&pool)
                .await
                .unwrap();
        let names: Vec<_> = tables.into_iter().map(|(n,)| n).collect();
        assert!(names.contains(&"users".to_string()));
        assert!(names.contains(&"articles".to_string()));
    }

    #[tokio::test]
    async fn test_seed_default_user_once() {
        let pool = connect("sqlite::memory:", 1).await.unwrap();
        ensure_schema(&pool).await.unwrap();
        let users = SqliteUserRepository::new(pool);

        assert!(seed_default_user(&users, 4).await.unwrap());
        assert!(!seed_default_user(&users, 4).await.unwrap());
        assert!(users.find_by_email(DEFAULT_USER_EMAIL).await.unwrap().is_some());
    }
}
