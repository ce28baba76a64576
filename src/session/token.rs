use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use tracing::{debug, instrument};
use uuid::Uuid;

use super::types::{SessionClaims, UserSummary};
use crate::shared::AppError;

/// Fixed lifetime of a session token
pub const TOKEN_TTL_HOURS: i64 = 2;

/// Configuration for JWT token operations
#[derive(Clone)]
pub struct TokenConfig {
    secret: String,
    pub ttl: Duration,
}

impl TokenConfig {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ttl: Duration::hours(TOKEN_TTL_HOURS),
        }
    }

    /// Mints a signed token for a verified user with a fresh random identifier
    #[instrument(skip(self, user), fields(user_id = user.id))]
    pub fn create_token(&self, user: &UserSummary) -> Result<String, AppError> {
        let now = Utc::now();
        let exp = (now + self.ttl).timestamp() as usize;

        let claims = SessionClaims {
            sub: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp() as usize,
            exp,
        };

        debug!(jti = %claims.jti, exp_timestamp = exp, "Creating JWT token with expiration");

        self.encode_claims(&claims)
    }

    /// Signs an arbitrary claims set with this config's key
    pub fn encode_claims(&self, claims: &SessionClaims) -> Result<String, AppError> {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(self.secret.as_ref()),
        )
        .map_err(|e| {
            debug!(error = %e, "Failed to encode JWT token");
            AppError::JwtError(e.to_string())
        })
    }

    /// Verifies signature and expiry, and decodes the claims.
    /// Any failure, including a claims schema mismatch, is an `InvalidCredential`.
    #[instrument(skip(self, token))]
    pub fn validate_token(&self, token: &str) -> Result<SessionClaims, AppError> {
        let mut validation = Validation::default();
        validation.leeway = 0;

        decode::<SessionClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_ref()),
            &validation,
        )
        .map(|data| {
            debug!(
                user_id = data.claims.sub,
                jti = %data.claims.jti,
                exp = data.claims.exp,
                "JWT token decoded successfully"
            );
            data.claims
        })
        .map_err(|e| {
            debug!(error = %e, "Failed to decode JWT token");
            AppError::InvalidCredential
        })
    }
}
