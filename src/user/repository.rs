use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};

use super::models::{NewUser, UserModel};
use crate::shared::AppError;

/// Credential store operations
#[async_trait]
pub trait UserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserModel>, AppError>;
    /// Fails with `Conflict` if the email is taken
    async fn create(&self, user: NewUser) -> Result<UserModel, AppError>;
}

/// In-memory implementation of UserRepository for development and testing
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<String, UserModel>>, // email -> user
    next_id: RwLock<i64>,
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            next_id: RwLock::new(1),
        }
    }

    pub async fn user_count(&self) -> usize {
        self.users.read().await.len()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> Result<Option<UserModel>, AppError> {
        let user = self.users.read().await.get(email).cloned();
        debug!(found = user.is_some(), "Looked up user in memory");
        Ok(user)
    }

    #[instrument(skip(self, user), fields(email = %user.email))]
    async fn create(&self, user: NewUser) -> Result<UserModel, AppError> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.email) {
            warn!("User already exists in memory");
            return Err(AppError::Conflict("user already exists".to_string()));
        }

        let mut next_id = self.next_id.write().await;
        let model = UserModel {
            id: *next_id,
            email: user.email,
            password_hash: user.password_hash,
            name: user.name,
            created_at: Utc::now(),
        };
        *next_id += 1;
        users.insert(model.email.clone(), model.clone());

        debug!(user_id = model.id, "User created in memory");
        Ok(model)
    }
}

/// SQLite implementation of the credential store
pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> Result<Option<UserModel>, AppError> {
        let user = sqlx::query_as::<_, UserModel>(
            "SELECT id, email, password_hash, name, created_at FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to fetch user from database");
            AppError::DatabaseError(e.to_string())
        })?;

        debug!(found = user.is_some(), "Looked up user in database");
        Ok(user)
    }

    #[instrument(skip(self, user), fields(email = %user.email))]
    async fn create(&self, user: NewUser) -> Result<UserModel, AppError> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO users (email, password_hash, name, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.name)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if e
                .as_database_error()
                .map(|db| db.is_unique_violation())
                .unwrap_or(false)
            {
                warn!("User already exists in database");
                return AppError::Conflict("user already exists".to_string());
            }
            warn!(error = %e, "Failed to create user in database");
            AppError::DatabaseError(e.to_string())
        })?;

        let model = UserModel {
            id: result.last_insert_rowid(),
            email: user.email,
            password_hash: user.password_hash,
            name: user.name,
            created_at: now,
        };
        debug!(user_id = model.id, "User created in database");
        Ok(model)
    }
}
