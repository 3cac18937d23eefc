use std::collections::BTreeMap;

use chrono::Utc;
use common::metrics;
use models::reaction::reaction_key;
use models::{Reaction, ReactionType};
use serde::Serialize;

use super::DocumentStore;
use crate::errors::ServiceError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleAction {
    Added,
    Changed,
    Removed,
}

/// Result of [`DocumentStore::toggle_reaction`].
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleOutcome {
    pub action: ToggleAction,
    pub reaction: Option<Reaction>,
    pub reaction_count: u64,
}

/// Per-type reaction tally for one post.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ReactionSummary {
    pub total: u64,
    pub counts: BTreeMap<String, u64>,
}

impl DocumentStore {
    /// Set the user's reaction on a post, replacing any previous type.
    /// `Ok(None)` when the post does not exist.
    pub async fn set_reaction(&self, post_id: &str, user_id: &str, kind: ReactionType) -> Result<Option<Reaction>, ServiceError> {
        let reaction = self
            .try_mutate("set_reaction", |doc| {
                if !doc.users.contains_key(user_id) {
                    return Err(ServiceError::not_found("user"));
                }
                let Some(post) = doc.posts.get_mut(post_id) else {
                    return Ok(None);
                };
                let key = reaction_key(post_id, user_id);
                if let Some(existing) = doc.reactions.get(&key) {
                    if existing.kind == kind {
                        return Ok(Some(existing.clone()));
                    }
                } else {
                    post.reaction_count += 1;
                }
                let reaction = Reaction { post_id: post_id.to_string(), user_id: user_id.to_string(), kind, created_at: Utc::now() };
                doc.reactions.insert(key, reaction.clone());
                Ok(Some(reaction))
            })
            .await?;
        if reaction.is_some() {
            metrics::record_mutation("reaction", "set");
        }
        Ok(reaction)
    }

    /// Add, change or take back the user's reaction in a single write.
    /// The same type again removes it. `Ok(None)` when the post does not exist.
    pub async fn toggle_reaction(&self, post_id: &str, user_id: &str, kind: ReactionType) -> Result<Option<ToggleOutcome>, ServiceError> {
        let outcome = self
            .try_mutate("toggle_reaction", |doc| {
                if !doc.users.contains_key(user_id) {
                    return Err(ServiceError::not_found("user"));
                }
                let Some(post) = doc.posts.get_mut(post_id) else {
                    return Ok(None);
                };
                let key = reaction_key(post_id, user_id);
                let previous = doc.reactions.remove(&key);
                let (action, reaction) = match previous {
                    Some(existing) if existing.kind == kind => {
                        post.reaction_count = post.reaction_count.saturating_sub(1);
                        (ToggleAction::Removed, None)
                    }
                    previous => {
                        let action = if previous.is_some() {
                            ToggleAction::Changed
                        } else {
                            post.reaction_count += 1;
                            ToggleAction::Added
                        };
                        let reaction = Reaction { post_id: post_id.to_string(), user_id: user_id.to_string(), kind, created_at: Utc::now() };
                        doc.reactions.insert(key, reaction.clone());
                        (action, Some(reaction))
                    }
                };
                Ok(Some(ToggleOutcome { action, reaction, reaction_count: post.reaction_count }))
            })
            .await?;
        if let Some(out) = &outcome {
            let label = match out.action {
                ToggleAction::Removed => "remove",
                _ => "set",
            };
            metrics::record_mutation("reaction", label);
        }
        Ok(outcome)
    }

    /// Remove the user's reaction; `Ok(None)` when there was none.
    pub async fn remove_reaction(&self, post_id: &str, user_id: &str) -> Result<Option<Reaction>, ServiceError> {
        let removed = self
            .try_mutate("remove_reaction", |doc| {
                let Some(reaction) = doc.reactions.remove(&reaction_key(post_id, user_id)) else {
                    return Ok(None);
                };
                if let Some(post) = doc.posts.get_mut(post_id) {
                    post.reaction_count = post.reaction_count.saturating_sub(1);
                }
                Ok(Some(reaction))
            })
            .await?;
        if removed.is_some() {
            metrics::record_mutation("reaction", "remove");
        }
        Ok(removed)
    }

    pub async fn get_user_reaction(&self, post_id: &str, user_id: &str) -> Result<Option<Reaction>, ServiceError> {
        let key = reaction_key(post_id, user_id);
        self.read(|doc| doc.reactions.get(&key).cloned()).await
    }

    /// `None` when the post does not exist.
    pub async fn get_post_reactions(&self, post_id: &str) -> Result<Option<ReactionSummary>, ServiceError> {
        self.read(|doc| {
            doc.posts.get(post_id)?;
            let mut summary = ReactionSummary::default();
            for r in doc.reactions.values().filter(|r| r.post_id == post_id) {
                summary.total += 1;
                *summary.counts.entry(r.kind.as_str().to_string()).or_default() += 1;
            }
            Some(summary)
        })
        .await
    }
}
