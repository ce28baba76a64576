use axum::{
    extract::{Query, State},
    Extension, Json,
};
use tracing::{info, instrument};

use super::types::{NewsQueryParams, NewsResponse};
use crate::session::SessionClaims;
use crate::shared::{AppError, AppState};

/// GET /api/news?q&language&from&sortBy&page&pageSize
/// Validates the search and relays the upstream result
#[instrument(name = "search_news", skip(state, claims, params), fields(user_id = claims.sub))]
pub async fn search_news(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Query(params): Query<NewsQueryParams>,
) -> Result<Json<NewsResponse>, AppError> {
    let search = params.validate()?;
    info!(q = %search.q, page = search.page, "Forwarding news search");

    let response = state.news_client.search(&search).await?;
    Ok(Json(response))
}
