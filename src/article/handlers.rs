use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::instrument;

use super::{
    models::ArticleModel,
    service::ArticleService,
    types::{parse_article_id, ArticlePage, CreateArticleRequest, ListArticlesQuery},
};
use crate::session::SessionClaims;
use crate::shared::{AppError, AppJson, AppState};

/// GET /api/articles?page&pageSize
#[instrument(name = "list_articles", skip(state, claims), fields(user_id = claims.sub))]
pub async fn list_articles(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Query(query): Query<ListArticlesQuery>,
) -> Result<Json<ArticlePage>, AppError> {
    let service = ArticleService::new(Arc::clone(&state.article_repository));
    Ok(Json(service.list(claims.sub, &query).await?))
}

/// POST /api/articles
#[instrument(name = "create_article", skip(state, claims, request), fields(user_id = claims.sub))]
pub async fn create_article(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    AppJson(request): AppJson<CreateArticleRequest>,
) -> Result<(StatusCode, Json<ArticleModel>), AppError> {
    let service = ArticleService::new(Arc::clone(&state.article_repository));
    let created = service.save(claims.sub, request).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/articles/:id
#[instrument(name = "get_article", skip(state, claims), fields(user_id = claims.sub))]
pub async fn get_article(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Path(id): Path<String>,
) -> Result<Json<ArticleModel>, AppError> {
    let id = parse_article_id(&id)?;
    let service = ArticleService::new(Arc::clone(&state.article_repository));
    Ok(Json(service.get(claims.sub, id).await?))
}

/// DELETE /api/articles/:id
#[instrument(name = "delete_article", skip(state, claims), fields(user_id = claims.sub))]
pub async fn delete_article(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AppError> {
    let id = parse_article_id(&id)?;
    let service = ArticleService::new(Arc::clone(&state.article_repository));
    service.remove(claims.sub, id).await?;
    Ok(Json(json!({ "ok": true })))
}
