use axum::{extract::{Query, State}, Json};
use serde::Deserialize;
use service::hashtags::HashtagStat;
use service::pagination::MAX_LIMIT;
use service::posts::SearchResults;

use crate::errors::JsonApiError;
use crate::state::ServerState;

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct SearchQuery {
    /// Free text, or `#tag` prefix
    #[serde(default)]
    pub q: String,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct PopularQuery {
    pub limit: Option<usize>,
}

#[utoipa::path(
    get, path = "/api/search", tag = "search",
    params(SearchQuery),
    responses((status = 200, description = "Matching posts and users"))
)]
pub async fn search(State(state): State<ServerState>, Query(q): Query<SearchQuery>) -> Result<Json<SearchResults>, JsonApiError> {
    let limit = q.limit.unwrap_or(20).clamp(1, MAX_LIMIT);
    Ok(Json(state.posts.search(&q.q, limit).await?))
}

#[utoipa::path(
    get, path = "/api/hashtags/popular", tag = "search",
    params(PopularQuery),
    responses((status = 200, description = "Trending hashtags"))
)]
pub async fn popular_hashtags(State(state): State<ServerState>, Query(q): Query<PopularQuery>) -> Result<Json<Vec<HashtagStat>>, JsonApiError> {
    let limit = q.limit.unwrap_or(state.settings.popular_hashtags_limit).clamp(1, MAX_LIMIT);
    Ok(Json(state.posts.popular_hashtags(limit).await?))
}
