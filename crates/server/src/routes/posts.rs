use std::str::FromStr;

use axum::{extract::{Path, Query, State}, Json};
use models::post::{NewPost, PostUpdate};
use models::Post;
use serde::Deserialize;
use service::errors::ServiceError;
use service::pagination::{Page, PageRequest};
use service::storage::{DeletedPost, GetPostsOptions};
use tracing::info;

use crate::errors::JsonApiError;
use crate::extract::ApiJson;
use crate::state::{CurrentUser, ServerState};

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    /// createdAt | updatedAt | reactions | comments
    pub sort: Option<String>,
    /// asc | desc
    pub order: Option<String>,
    pub hashtag: Option<String>,
    pub author: Option<String>,
    pub mood: Option<String>,
    pub q: Option<String>,
}

pub(crate) fn parse_opt<T>(raw: Option<&str>) -> Result<Option<T>, ServiceError>
where
    T: FromStr,
    T::Err: Into<ServiceError>,
{
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => s.parse::<T>().map(Some).map_err(Into::into),
        None => Ok(None),
    }
}

impl ListQuery {
    fn into_options(self) -> Result<GetPostsOptions, ServiceError> {
        Ok(GetPostsOptions {
            page: PageRequest::new(self.limit, self.offset),
            sort_by: parse_opt(self.sort.as_deref())?.unwrap_or_default(),
            order: parse_opt(self.order.as_deref())?.unwrap_or_default(),
            mood: parse_opt(self.mood.as_deref())?,
            author_id: self.author.filter(|a| !a.trim().is_empty()),
            hashtag: self.hashtag.filter(|h| !h.trim().is_empty()),
            search: self.q,
        })
    }
}

#[utoipa::path(
    get, path = "/api/posts", tag = "posts",
    params(ListQuery),
    responses((status = 200, description = "Page of posts"), (status = 400, description = "Bad query"))
)]
pub async fn list(State(state): State<ServerState>, Query(q): Query<ListQuery>) -> Result<Json<Page<Post>>, JsonApiError> {
    let opts = q.into_options()?;
    let page = state.posts.list(&opts).await?;
    info!(count = page.items.len(), total = page.total, "list posts");
    Ok(Json(page))
}

#[utoipa::path(
    post, path = "/api/posts", tag = "posts",
    request_body = crate::openapi::NewPostDoc,
    responses((status = 200, description = "Created"), (status = 400, description = "Validation Error"), (status = 404, description = "Unknown author"))
)]
pub async fn create(State(state): State<ServerState>, CurrentUser(user_id): CurrentUser, ApiJson(input): ApiJson<NewPost>) -> Result<Json<Post>, JsonApiError> {
    Ok(Json(state.posts.create(&user_id, input).await?))
}

#[utoipa::path(
    get, path = "/api/posts/{id}", tag = "posts",
    params(("id" = String, Path, description = "Post id")),
    responses((status = 200, description = "Found"), (status = 404, description = "Not Found"))
)]
pub async fn get(State(state): State<ServerState>, Path(id): Path<String>) -> Result<Json<Post>, JsonApiError> {
    Ok(Json(state.posts.get(&id).await?))
}

#[utoipa::path(
    put, path = "/api/posts/{id}", tag = "posts",
    params(("id" = String, Path, description = "Post id")),
    request_body = crate::openapi::PostUpdateDoc,
    responses((status = 200, description = "Updated"), (status = 403, description = "Not the author"), (status = 404, description = "Not Found"))
)]
pub async fn update(
    State(state): State<ServerState>,
    CurrentUser(user_id): CurrentUser,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<PostUpdate>,
) -> Result<Json<Post>, JsonApiError> {
    Ok(Json(state.posts.update(&user_id, &id, input).await?))
}

#[utoipa::path(
    delete, path = "/api/posts/{id}", tag = "posts",
    params(("id" = String, Path, description = "Post id")),
    responses((status = 200, description = "Deleted with comments and reactions"), (status = 403, description = "Not the author"), (status = 404, description = "Not Found"))
)]
pub async fn delete(State(state): State<ServerState>, CurrentUser(user_id): CurrentUser, Path(id): Path<String>) -> Result<Json<DeletedPost>, JsonApiError> {
    Ok(Json(state.posts.delete(&user_id, &id).await?))
}
