use axum::{extract::State, Json};
use common::types::SuccessResponse;
use models::Metadata;
use service::storage::BackupInfo;
use tracing::info;

use crate::errors::JsonApiError;
use crate::state::ServerState;

#[utoipa::path(get, path = "/api/stats", tag = "admin", responses((status = 200, description = "Document metadata")))]
pub async fn stats(State(state): State<ServerState>) -> Result<Json<Metadata>, JsonApiError> {
    Ok(Json(state.store.stats().await?))
}

#[utoipa::path(post, path = "/admin/backup", tag = "admin", responses((status = 200, description = "Backup written"), (status = 500, description = "Data file unreadable or backup not writable")))]
pub async fn backup(State(state): State<ServerState>) -> Result<Json<BackupInfo>, JsonApiError> {
    let info = state.store.backup().await?;
    info!(bytes = info.bytes, path = %info.path, "admin backup");
    Ok(Json(info))
}

#[utoipa::path(post, path = "/admin/restore", tag = "admin", responses((status = 200, description = "Restored"), (status = 404, description = "No backup")))]
pub async fn restore(State(state): State<ServerState>) -> Result<Json<Metadata>, JsonApiError> {
    Ok(Json(state.store.restore_from_backup().await?))
}

#[utoipa::path(post, path = "/admin/cache/clear", tag = "admin", responses((status = 200, description = "Cache dropped")))]
pub async fn clear_cache(State(state): State<ServerState>) -> Json<SuccessResponse> {
    state.store.clear_cache().await;
    Json(SuccessResponse::ok())
}
