use axum::{extract::{Path, State}, Json};
use models::{Reaction, ReactionType};
use serde::{Deserialize, Serialize};
use service::reactions::ToggleOutcome;
use service::storage::ReactionSummary;

use crate::errors::JsonApiError;
use crate::extract::ApiJson;
use crate::state::{CurrentUser, ServerState};

#[derive(Debug, Deserialize)]
pub struct ToggleInput {
    #[serde(rename = "type")]
    pub kind: ReactionType,
}

#[derive(Debug, Serialize)]
pub struct MyReaction {
    pub reaction: Option<Reaction>,
}

#[utoipa::path(
    post, path = "/api/posts/{id}/reactions", tag = "reactions",
    params(("id" = String, Path, description = "Post id")),
    request_body = crate::openapi::ToggleReactionDoc,
    responses((status = 200, description = "Added, changed or removed"), (status = 404, description = "Post Not Found"))
)]
pub async fn toggle(
    State(state): State<ServerState>,
    CurrentUser(user_id): CurrentUser,
    Path(post_id): Path<String>,
    ApiJson(input): ApiJson<ToggleInput>,
) -> Result<Json<ToggleOutcome>, JsonApiError> {
    Ok(Json(state.reactions.toggle(&post_id, &user_id, input.kind).await?))
}

#[utoipa::path(
    get, path = "/api/posts/{id}/reactions", tag = "reactions",
    params(("id" = String, Path, description = "Post id")),
    responses((status = 200, description = "Counts per reaction type"), (status = 404, description = "Post Not Found"))
)]
pub async fn summary(State(state): State<ServerState>, Path(post_id): Path<String>) -> Result<Json<ReactionSummary>, JsonApiError> {
    Ok(Json(state.reactions.summary(&post_id).await?))
}

#[utoipa::path(
    get, path = "/api/posts/{id}/reactions/me", tag = "reactions",
    params(("id" = String, Path, description = "Post id")),
    responses((status = 200, description = "The caller's reaction, if any"), (status = 404, description = "Post Not Found"))
)]
pub async fn mine(State(state): State<ServerState>, CurrentUser(user_id): CurrentUser, Path(post_id): Path<String>) -> Result<Json<MyReaction>, JsonApiError> {
    let reaction = state.reactions.mine(&post_id, &user_id).await?;
    Ok(Json(MyReaction { reaction }))
}
