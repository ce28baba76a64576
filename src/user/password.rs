use tracing::warn;

use crate::shared::AppError;

/// Hashes a password with a fresh salt. Runs on the blocking pool since bcrypt is
/// deliberately slow.
pub async fn hash_password(password: &str, cost: u32) -> Result<String, AppError> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| {
            warn!(error = %e, "Password hashing task failed");
            AppError::Internal
        })?
        .map_err(|e| {
            warn!(error = %e, "Password hashing failed");
            AppError::Internal
        })
}

/// Compares a password against a stored bcrypt hash.
/// A malformed stored hash counts as a mismatch.
pub async fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    let password = password.to_string();
    let password_hash = password_hash.to_string();
    let verified = tokio::task::spawn_blocking(move || bcrypt::verify(password, &password_hash))
        .await
        .map_err(|e| {
            warn!(error = %e, "Password verification task failed");
            AppError::Internal
        })?;

    Ok(verified.unwrap_or_else(|e| {
        warn!(error = %e, "Stored password hash could not be parsed");
        false
    }))
}
