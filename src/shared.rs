use axum::{
    extract::{rejection::JsonRejection, FromRequest},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::error;

use crate::article::repository::ArticleRepository;
use crate::news::client::NewsClient;
use crate::ratelimit::SlidingWindowRateLimiter;
use crate::session::service::SessionService;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub session_service: Arc<SessionService>,
    pub article_repository: Arc<dyn ArticleRepository + Send + Sync>,
    pub news_client: Arc<dyn NewsClient + Send + Sync>,
    pub rate_limiter: Arc<SlidingWindowRateLimiter>,
}

impl AppState {
    pub fn new(
        session_service: Arc<SessionService>,
        article_repository: Arc<dyn ArticleRepository + Send + Sync>,
        news_client: Arc<dyn NewsClient + Send + Sync>,
    ) -> Self {
        Self {
            session_service,
            article_repository,
            news_client,
            rate_limiter: Arc::new(SlidingWindowRateLimiter::default()),
        }
    }

    pub fn with_rate_limiter(mut self, limiter: Arc<SlidingWindowRateLimiter>) -> Self {
        self.rate_limiter = limiter;
        self
    }
}

/// A single rejected input field, reported back in `{"errors": [...]}`
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Missing credential")]
    MissingCredential,

    #[error("Invalid credential")]
    InvalidCredential,

    #[error("Invalid login credentials")]
    InvalidLogin,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Validation failed: {0:?}")]
    Validation(Vec<FieldError>),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Too many requests")]
    RateLimited,

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JWT error: {0}")]
    JwtError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal server error")]
    Internal,
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::DatabaseError(e.to_string())
    }
}

/// Malformed or mistyped bodies are reported as a validation failure on `body`
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        let message = match rejection {
            JsonRejection::MissingJsonContentType(_) => {
                "expected a JSON body with content-type application/json".to_string()
            }
            other => other.body_text(),
        };
        AppError::Validation(vec![FieldError::new("body", message)])
    }
}

/// `Json` extractor whose rejections go through `AppError`
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Validation(errors) => {
                return (StatusCode::BAD_REQUEST, Json(json!({ "errors": errors })))
                    .into_response();
            }
            AppError::MissingCredential => (StatusCode::UNAUTHORIZED, "unauthorized".to_string()),
            AppError::InvalidCredential => (StatusCode::UNAUTHORIZED, "invalid token".to_string()),
            AppError::InvalidLogin => (
                StatusCode::UNAUTHORIZED,
                "invalid credentials".to_string(),
            ),
            AppError::InvalidToken(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "too many requests".to_string(),
            ),
            AppError::Upstream(msg) => (StatusCode::BAD_GATEWAY, msg),
            AppError::Config(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::JwtError(msg) | AppError::DatabaseError(msg) => {
                error!(detail = %msg, "Request failed with internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": error_message
        }));

        (status, body).into_response()
    }
}

/// Collects field errors and turns them into `AppError::Validation` if any were recorded
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(&mut self, ok: bool, field: &str, message: &str) {
        if !ok {
            self.errors.push(FieldError::new(field, message));
        }
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    pub fn finish(self) -> Result<(), AppError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self.errors))
        }
    }
}

/// Loose syntactic email check: one `@`, non-empty local part, dotted domain
pub fn is_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !value.chars().any(char::is_whitespace)
        && domain.contains('.')
        && domain.split('.').all(|label| !label.is_empty())
}

/// Absolute http(s) URL with a host
pub fn is_http_url(value: &str) -> bool {
    url::Url::parse(value)
        .map(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some())
        .unwrap_or(false)
}

/// Parses an optional integer query parameter, recording an error when it is
/// malformed or outside `[min, max]`
pub fn parse_ranged(
    validator: &mut Validator,
    field: &str,
    raw: Option<&str>,
    default: i64,
    min: i64,
    max: i64,
) -> i64 {
    let Some(raw) = raw else {
        return default;
    };
    match raw.trim().parse::<i64>() {
        Ok(value) if (min..=max).contains(&value) => value,
        _ => {
            validator.push(field, format!("must be an integer between {min} and {max}"));
            default
        }
    }
}
