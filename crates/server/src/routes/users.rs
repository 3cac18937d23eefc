use axum::{extract::{Path, State}, Json};
use models::user::NewUser;
use models::User;

use crate::errors::JsonApiError;
use crate::extract::ApiJson;
use crate::state::{CurrentUser, ServerState};

#[utoipa::path(get, path = "/api/users", tag = "users", responses((status = 200, description = "All users, oldest first")))]
pub async fn list(State(state): State<ServerState>) -> Result<Json<Vec<User>>, JsonApiError> {
    Ok(Json(state.users.list().await?))
}

#[utoipa::path(
    post, path = "/api/users", tag = "users",
    request_body = crate::openapi::NewUserDoc,
    responses((status = 200, description = "Created"), (status = 400, description = "Validation Error"))
)]
pub async fn create(State(state): State<ServerState>, ApiJson(input): ApiJson<NewUser>) -> Result<Json<User>, JsonApiError> {
    Ok(Json(state.users.create(input).await?))
}

#[utoipa::path(
    get, path = "/api/users/{id}", tag = "users",
    params(("id" = String, Path, description = "User id")),
    responses((status = 200, description = "Found"), (status = 404, description = "Not Found"))
)]
pub async fn get(State(state): State<ServerState>, Path(id): Path<String>) -> Result<Json<User>, JsonApiError> {
    Ok(Json(state.users.get(&id).await?))
}

#[utoipa::path(get, path = "/api/users/me", tag = "users", responses((status = 200, description = "Acting user"), (status = 404, description = "Unknown user id")))]
pub async fn me(State(state): State<ServerState>, CurrentUser(user_id): CurrentUser) -> Result<Json<User>, JsonApiError> {
    Ok(Json(state.users.get(&user_id).await?))
}
