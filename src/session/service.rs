use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{info, instrument, warn};

use super::{
    revocation::RevocationRegistry,
    token::TokenConfig,
    types::{
        normalize_email, LoginRequest, LoginResponse, RegisterOutcome, RegisterRequest,
        SessionClaims, UserSummary,
    },
};
use crate::shared::{is_email, AppError, Validator};
use crate::user::{
    password::{hash_password, verify_password},
    NewUser, UserRepository,
};

/// Login, logout, registration and per-request token checks
pub struct SessionService {
    users: Arc<dyn UserRepository + Send + Sync>,
    revocations: Arc<dyn RevocationRegistry + Send + Sync>,
    token_config: TokenConfig,
    bcrypt_cost: u32,
    // compared against on unknown emails so both login failures cost one bcrypt check
    dummy_hash: OnceCell<String>,
}

impl SessionService {
    pub fn new(
        users: Arc<dyn UserRepository + Send + Sync>,
        revocations: Arc<dyn RevocationRegistry + Send + Sync>,
        token_config: TokenConfig,
        bcrypt_cost: u32,
    ) -> Self {
        Self {
            users,
            revocations,
            token_config,
            bcrypt_cost,
            dummy_hash: OnceCell::new(),
        }
    }

    pub fn token_config(&self) -> &TokenConfig {
        &self.token_config
    }

    /// Verifies credentials and issues a session token.
    /// Unknown email and wrong password produce the same error.
    #[instrument(skip(self, request))]
    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, AppError> {
        let email = request.validate()?;

        let Some(user) = self.users.find_by_email(&email).await? else {
            let dummy = self
                .dummy_hash
                .get_or_try_init(|| hash_password("no-such-user", self.bcrypt_cost))
                .await?;
            verify_password(&request.password, dummy).await?;
            warn!(email = %email, "Login failed: user not found");
            return Err(AppError::InvalidLogin);
        };

        if !verify_password(&request.password, &user.password_hash).await? {
            warn!(email = %email, user_id = user.id, "Login failed: wrong password");
            return Err(AppError::InvalidLogin);
        }

        let summary = UserSummary::from(&user);
        let token = self.token_config.create_token(&summary)?;

        info!(user_id = user.id, "Login succeeded");
        Ok(LoginResponse {
            token,
            user: summary,
        })
    }

    /// Revokes the presented token. The token must still verify; expired tokens are
    /// already unusable and cannot be revoked explicitly.
    #[instrument(skip(self, token))]
    pub async fn logout(&self, token: Option<&str>) -> Result<(), AppError> {
        let token = token.ok_or_else(|| {
            warn!("Logout without bearer token");
            AppError::InvalidToken("missing token".to_string())
        })?;

        let claims = self.token_config.validate_token(token).map_err(|_| {
            warn!("Logout with unverifiable token");
            AppError::InvalidToken("invalid token".to_string())
        })?;

        self.revocations.revoke(&claims.jti, claims.exp).await;

        info!(user_id = claims.sub, jti = %claims.jti, "Session token revoked");
        Ok(())
    }

    /// Admits a token only if it verifies and has not been revoked
    #[instrument(skip(self, token))]
    pub async fn authenticate(&self, token: &str) -> Result<SessionClaims, AppError> {
        let claims = self.token_config.validate_token(token)?;

        if self.revocations.is_revoked(&claims.jti).await {
            warn!(user_id = claims.sub, jti = %claims.jti, "Rejected revoked token");
            return Err(AppError::InvalidCredential);
        }

        Ok(claims)
    }

    /// Creates an account unless the email is already registered
    #[instrument(skip(self, request))]
    pub async fn register(&self, request: &RegisterRequest) -> Result<RegisterOutcome, AppError> {
        let email = request.email.as_deref().map(normalize_email).unwrap_or_default();
        let password = request.password.as_deref().unwrap_or_default();
        let name = request.name.as_deref().map(str::trim).unwrap_or_default();

        let mut validator = Validator::new();
        validator.check(is_email(&email), "email", "invalid email");
        validator.check(
            password.chars().count() >= 6,
            "password",
            "password must be at least 6 characters",
        );
        validator.check(!name.is_empty(), "name", "name is required");
        validator.finish()?;

        if self.users.find_by_email(&email).await?.is_some() {
            info!(email = %email, "Registration skipped, user already exists");
            return Ok(RegisterOutcome::AlreadyExists);
        }

        let created = self
            .users
            .create(NewUser {
                email,
                password_hash: hash_password(password, self.bcrypt_cost).await?,
                name: name.to_string(),
            })
            .await;

        match created {
            Ok(user) => {
                info!(user_id = user.id, "User registered");
                Ok(RegisterOutcome::Created(UserSummary::from(&user)))
            }
            Err(AppError::Conflict(_)) => Ok(RegisterOutcome::AlreadyExists),
            Err(e) => Err(e),
        }
    }
}
