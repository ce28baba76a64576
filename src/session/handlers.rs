use axum::{extract::State, http::HeaderMap, http::StatusCode, Json};
use serde_json::{json, Value};
use tracing::{info, instrument};

use super::{
    middleware::bearer_token,
    types::{LoginRequest, LoginResponse, RegisterOutcome, RegisterRequest},
};
use crate::shared::{AppError, AppJson, AppState};

/// POST /api/auth/login
/// Returns a session token and the public user record
#[instrument(name = "login", skip(state, request))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(request): AppJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let response = state.session_service.login(&request).await?;
    Ok(Json(response))
}

/// POST /api/auth/logout
/// Revokes the bearer token's identifier
#[instrument(name = "logout", skip(state, headers))]
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    state
        .session_service
        .logout(bearer_token(&headers))
        .await?;
    Ok(Json(json!({ "ok": true })))
}

/// POST /api/auth/register
/// 201 with the new user, or 200 if the email is already registered
#[instrument(name = "register", skip(state, request))]
pub async fn register(
    State(state): State<AppState>,
    AppJson(request): AppJson<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    match state.session_service.register(&request).await? {
        RegisterOutcome::Created(user) => {
            info!(user_id = user.id, "Registration handler created user");
            Ok((StatusCode::CREATED, Json(json!(user))))
        }
        RegisterOutcome::AlreadyExists => Ok((
            StatusCode::OK,
            Json(json!({ "message": "user already exists" })),
        )),
    }
}
