//! The single JSON document holding every entity.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Comment, Post, Reaction, User};

/// Schema version written by this build. Documents without a `version`
/// field are treated as version 1.
pub const CURRENT_VERSION: u32 = 2;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub total_users: u64,
    pub total_posts: u64,
    pub total_comments: u64,
    pub total_reactions: u64,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataDocument {
    pub version: u32,
    pub metadata: Metadata,
    #[serde(default)]
    pub users: BTreeMap<String, User>,
    #[serde(default)]
    pub posts: BTreeMap<String, Post>,
    #[serde(default)]
    pub comments: BTreeMap<String, Comment>,
    /// Keyed by `"{postId}:{userId}"`.
    #[serde(default)]
    pub reactions: BTreeMap<String, Reaction>,
}

impl DataDocument {
    pub fn empty(now: DateTime<Utc>) -> Self {
        Self {
            version: CURRENT_VERSION,
            metadata: Metadata {
                total_users: 0,
                total_posts: 0,
                total_comments: 0,
                total_reactions: 0,
                created_at: now,
                last_updated: now,
            },
            users: BTreeMap::new(),
            posts: BTreeMap::new(),
            comments: BTreeMap::new(),
            reactions: BTreeMap::new(),
        }
    }

    /// Reset every post's `commentCount`/`reactionCount` from the child records.
    pub fn recompute_counts(&mut self) {
        let mut comments: HashMap<&str, u64> = HashMap::new();
        for c in self.comments.values() {
            *comments.entry(c.post_id.as_str()).or_default() += 1;
        }
        let mut reactions: HashMap<&str, u64> = HashMap::new();
        for r in self.reactions.values() {
            *reactions.entry(r.post_id.as_str()).or_default() += 1;
        }
        for post in self.posts.values_mut() {
            post.comment_count = comments.get(post.id.as_str()).copied().unwrap_or(0);
            post.reaction_count = reactions.get(post.id.as_str()).copied().unwrap_or(0);
        }
    }

    /// Sync aggregate totals with the collections and stamp `lastUpdated`.
    pub fn refresh_metadata(&mut self, now: DateTime<Utc>) {
        self.metadata.total_users = self.users.len() as u64;
        self.metadata.total_posts = self.posts.len() as u64;
        self.metadata.total_comments = self.comments.len() as u64;
        self.metadata.total_reactions = self.reactions.len() as u64;
        self.metadata.last_updated = now;
    }

    /// Drop comments and reactions whose post no longer exists.
    /// Returns how many records were removed.
    pub fn prune_orphans(&mut self) -> usize {
        let before = self.comments.len() + self.reactions.len();
        let posts = &self.posts;
        self.comments.retain(|_, c| posts.contains_key(&c.post_id));
        self.reactions.retain(|_, r| posts.contains_key(&r.post_id));
        before - (self.comments.len() + self.reactions.len())
    }

    /// Describe the first broken count/metadata invariant, if any.
    pub fn consistency_error(&self) -> Option<String> {
        for post in self.posts.values() {
            let comments = self.comments.values().filter(|c| c.post_id == post.id).count() as u64;
            if comments != post.comment_count {
                return Some(format!("post {} commentCount {} != {}", post.id, post.comment_count, comments));
            }
            let reactions = self.reactions.values().filter(|r| r.post_id == post.id).count() as u64;
            if reactions != post.reaction_count {
                return Some(format!("post {} reactionCount {} != {}", post.id, post.reaction_count, reactions));
            }
        }
        let m = &self.metadata;
        if m.total_users != self.users.len() as u64
            || m.total_posts != self.posts.len() as u64
            || m.total_comments != self.comments.len() as u64
            || m.total_reactions != self.reactions.len() as u64
        {
            return Some("metadata totals out of sync".into());
        }
        None
    }
}
