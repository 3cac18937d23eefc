use axum::{extract::{Path, State}, Json};
use models::comment::NewComment;
use models::Comment;

use crate::errors::JsonApiError;
use crate::extract::ApiJson;
use crate::state::{CurrentUser, ServerState};

#[utoipa::path(
    get, path = "/api/posts/{id}/comments", tag = "comments",
    params(("id" = String, Path, description = "Post id")),
    responses((status = 200, description = "Comments, oldest first"), (status = 404, description = "Post Not Found"))
)]
pub async fn list(State(state): State<ServerState>, Path(post_id): Path<String>) -> Result<Json<Vec<Comment>>, JsonApiError> {
    Ok(Json(state.comments.list(&post_id).await?))
}

#[utoipa::path(
    post, path = "/api/posts/{id}/comments", tag = "comments",
    params(("id" = String, Path, description = "Post id")),
    request_body = crate::openapi::NewCommentDoc,
    responses((status = 200, description = "Created"), (status = 400, description = "Validation Error"), (status = 404, description = "Post Not Found"))
)]
pub async fn create(
    State(state): State<ServerState>,
    CurrentUser(user_id): CurrentUser,
    Path(post_id): Path<String>,
    ApiJson(input): ApiJson<NewComment>,
) -> Result<Json<Comment>, JsonApiError> {
    Ok(Json(state.comments.create(&user_id, &post_id, input).await?))
}

#[utoipa::path(
    delete, path = "/api/comments/{id}", tag = "comments",
    params(("id" = String, Path, description = "Comment id")),
    responses((status = 200, description = "Deleted"), (status = 403, description = "Not allowed"), (status = 404, description = "Not Found"))
)]
pub async fn delete(State(state): State<ServerState>, CurrentUser(user_id): CurrentUser, Path(id): Path<String>) -> Result<Json<Comment>, JsonApiError> {
    Ok(Json(state.comments.delete(&user_id, &id).await?))
}
