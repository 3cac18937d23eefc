use axum::{
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;

use common::types::Health;

use crate::openapi::ApiDoc;
use crate::state::ServerState;

pub mod admin;
pub mod analytics;
pub mod comments;
pub mod posts;
pub mod reactions;
pub mod search;
pub mod users;

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn metrics() -> impl IntoResponse {
    common::metrics::encode_metrics()
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the full application router: public API, storage maintenance and
/// observability endpoints.
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    let public = Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/api-docs/openapi.json", get(openapi_json));

    let api = Router::new()
        .route("/api/posts", get(posts::list).post(posts::create))
        .route("/api/posts/:id", get(posts::get).put(posts::update).delete(posts::delete))
        .route("/api/posts/:id/comments", get(comments::list).post(comments::create))
        .route("/api/comments/:id", delete(comments::delete))
        .route("/api/posts/:id/reactions", get(reactions::summary).post(reactions::toggle))
        .route("/api/posts/:id/reactions/me", get(reactions::mine))
        .route("/api/search", get(search::search))
        .route("/api/hashtags/popular", get(search::popular_hashtags))
        .route("/api/users", get(users::list).post(users::create))
        .route("/api/users/me", get(users::me))
        .route("/api/users/:id", get(users::get))
        .route("/api/stats", get(admin::stats))
        .route("/api/analytics", post(analytics::track));

    let admin_routes = Router::new()
        .route("/admin/backup", post(admin::backup))
        .route("/admin/restore", post(admin::restore))
        .route("/admin/cache/clear", post(admin::clear_cache));

    public
        .merge(api)
        .merge(admin_routes)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
