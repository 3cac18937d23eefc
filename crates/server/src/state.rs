use std::sync::Arc;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use configs::AppSettings;
use service::analytics::AnalyticsService;
use service::comments::CommentService;
use service::posts::PostService;
use service::reactions::ReactionService;
use service::storage::DocumentStore;
use service::users::UserService;

pub const USER_HEADER: &str = "x-user-id";

#[derive(Clone)]
pub struct ServerState {
    pub store: Arc<DocumentStore>,
    pub posts: PostService,
    pub comments: CommentService,
    pub reactions: ReactionService,
    pub users: UserService,
    pub analytics: AnalyticsService,
    pub settings: AppSettings,
}

impl ServerState {
    pub fn new(store: Arc<DocumentStore>, settings: AppSettings, analytics: AnalyticsService) -> Self {
        Self {
            posts: PostService::new(store.clone()),
            comments: CommentService::new(store.clone()),
            reactions: ReactionService::new(store.clone()),
            users: UserService::new(store.clone(), settings.mock_user_id.clone()),
            analytics,
            settings,
            store,
        }
    }
}

/// Id of the acting user, taken from `X-User-Id` or the configured mock user.
#[derive(Clone, Debug)]
pub struct CurrentUser(pub String);

#[async_trait]
impl FromRequestParts<ServerState> for CurrentUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &ServerState) -> Result<Self, Self::Rejection> {
        let header = parts.headers.get(USER_HEADER).and_then(|v| v.to_str().ok());
        Ok(CurrentUser(state.users.resolve_id(header)))
    }
}
