//! OpenAPI description served at `/api-docs/openapi.json`.
//!
//! Entities live in `models`, which stays free of HTTP concerns, so the
//! request bodies are mirrored here as schema-only structs.

use serde::Serialize;
use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct NewPostDoc {
    pub content: String,
    /// happy | sad | excited | thoughtful | grateful | calm | angry | inspired
    pub mood: Option<String>,
}

#[derive(ToSchema)]
pub struct PostUpdateDoc {
    pub content: Option<String>,
    pub mood: Option<String>,
}

#[derive(ToSchema)]
pub struct NewCommentDoc { pub content: String }

#[derive(Serialize, ToSchema)]
pub struct ToggleReactionDoc {
    /// like | love | laugh | wow | sad | angry
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(ToSchema)]
pub struct NewUserDoc {
    pub id: Option<String>,
    pub name: String,
    pub email: String,
    pub bio: Option<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsEventDoc {
    pub name: String,
    #[schema(value_type = Object)]
    pub data: serde_json::Value,
    /// Epoch milliseconds; defaults to receive time
    pub timestamp: Option<i64>,
    pub session_id: Option<String>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::posts::list,
        crate::routes::posts::create,
        crate::routes::posts::get,
        crate::routes::posts::update,
        crate::routes::posts::delete,
        crate::routes::comments::list,
        crate::routes::comments::create,
        crate::routes::comments::delete,
        crate::routes::reactions::toggle,
        crate::routes::reactions::summary,
        crate::routes::reactions::mine,
        crate::routes::search::search,
        crate::routes::search::popular_hashtags,
        crate::routes::users::list,
        crate::routes::users::create,
        crate::routes::users::get,
        crate::routes::users::me,
        crate::routes::analytics::track,
        crate::routes::admin::stats,
        crate::routes::admin::backup,
        crate::routes::admin::restore,
        crate::routes::admin::clear_cache,
    ),
    components(
        schemas(
            HealthResponse,
            NewPostDoc,
            PostUpdateDoc,
            NewCommentDoc,
            ToggleReactionDoc,
            NewUserDoc,
            AnalyticsEventDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "posts"),
        (name = "comments"),
        (name = "reactions"),
        (name = "search"),
        (name = "users"),
        (name = "analytics"),
        (name = "admin")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in ["/api/posts", "/api/posts/{id}", "/api/posts/{id}/comments", "/api/search", "/admin/backup"] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
