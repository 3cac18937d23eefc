use std::sync::Arc;

use models::{Reaction, ReactionType};
use tracing::{debug, instrument};

use crate::errors::ServiceError;
use crate::storage::{DocumentStore, ReactionSummary};

pub use crate::storage::{ToggleAction, ToggleOutcome};

#[derive(Clone)]
pub struct ReactionService {
    store: Arc<DocumentStore>,
}

impl ReactionService {
    pub fn new(store: Arc<DocumentStore>) -> Self { Self { store } }

    /// Reacting twice with the same type takes the reaction back; a different
    /// type replaces it. The decision and the write happen under one lock.
    #[instrument(skip(self), fields(user_id = %user_id, post_id = %post_id))]
    pub async fn toggle(&self, post_id: &str, user_id: &str, kind: ReactionType) -> Result<ToggleOutcome, ServiceError> {
        let outcome = self
            .store
            .toggle_reaction(post_id, user_id, kind)
            .await?
            .ok_or_else(|| ServiceError::not_found("post"))?;
        debug!(action = ?outcome.action, reaction_count = outcome.reaction_count, "reaction_toggled");
        Ok(outcome)
    }

    pub async fn mine(&self, post_id: &str, user_id: &str) -> Result<Option<Reaction>, ServiceError> {
        if self.store.get_post(post_id).await?.is_none() {
            return Err(ServiceError::not_found("post"));
        }
        self.store.get_user_reaction(post_id, user_id).await
    }

    pub async fn summary(&self, post_id: &str) -> Result<ReactionSummary, ServiceError> {
        self.store.get_post_reactions(post_id).await?.ok_or_else(|| ServiceError::not_found("post"))
    }
}
