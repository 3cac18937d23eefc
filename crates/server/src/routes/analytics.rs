use axum::{extract::State, Json};
use common::types::SuccessResponse;
use service::analytics::AnalyticsEvent;

use crate::errors::JsonApiError;
use crate::extract::ApiJson;
use crate::state::{CurrentUser, ServerState};

#[utoipa::path(
    post, path = "/api/analytics", tag = "analytics",
    request_body = crate::openapi::AnalyticsEventDoc,
    responses((status = 200, description = "Accepted"), (status = 400, description = "Validation Error"))
)]
pub async fn track(State(state): State<ServerState>, CurrentUser(user_id): CurrentUser, ApiJson(event): ApiJson<AnalyticsEvent>) -> Result<Json<SuccessResponse>, JsonApiError> {
    state.analytics.track(&user_id, event).await?;
    Ok(Json(SuccessResponse::ok()))
}
