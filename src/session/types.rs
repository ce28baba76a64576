use serde::{Deserialize, Serialize};

use crate::shared::{is_email, AppError, Validator};
use crate::user::models::UserModel;

/// JWT claims carried by every session token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionClaims {
    pub sub: i64, // User id
    pub email: String,
    pub name: String,
    pub jti: String, // Unique token identifier, the unit of revocation
    pub iat: usize,
    pub exp: usize,
}

/// Public view of a user, returned from login and registration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserSummary {
    pub id: i64,
    pub email: String,
    pub name: String,
}

impl From<&UserModel> for UserSummary {
    fn from(user: &UserModel) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl LoginRequest {
    /// Validates the form and returns the normalised email
    pub fn validate(&self) -> Result<String, AppError> {
        let email = normalize_email(&self.email);
        let mut validator = Validator::new();
        validator.check(is_email(&email), "email", "invalid email");
        validator.check(
            self.password.chars().count() >= 6,
            "password",
            "password must be at least 6 characters",
        );
        validator.finish()?;
        Ok(email)
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserSummary,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

/// Outcome of a registration attempt
#[derive(Debug, PartialEq)]
pub enum RegisterOutcome {
    Created(UserSummary),
    AlreadyExists,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_claims_serialization() {
        let claims = SessionClaims {
            sub: 7,
            email: "a@x.com".to_string(),
            name: "A".to_string(),
            jti: "test-jti".to_string(),
            exp: 1234567890,
            iat: 1234567800,
        };

        let json = serde_json::to_string(&claims).unwrap();
        assert!(json.contains("test-jti"));
        assert!(json.contains("a@x.com"));

        let deserialized: SessionClaims = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, claims);
    }

    #[test]
    fn test_claims_missing_jti_is_rejected() {
        let json = r#"{"sub":1,"email":"a@x.com","name":"A","iat":1,"exp":2}"#;
        assert!(serde_json::from_str::<SessionClaims>(json).is_err());
    }

    #[test]
    fn test_login_request_normalizes_email() {
        let request = LoginRequest {
            email: "  A@X.com ".to_string(),
            password: "secret1".to_string(),
        };
        assert_eq!(request.validate().unwrap(), "a@x.com");
    }

    #[test]
    fn test_login_request_validation_errors() {
        let request = LoginRequest {
            email: "nope".to_string(),
            password: "short".to_string(),
        };
        match request.validate() {
            Err(AppError::Validation(errors)) => {
                let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
                assert_eq!(fields, vec!["email", "password"]);
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }
}
