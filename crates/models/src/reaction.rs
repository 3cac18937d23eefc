use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionType {
    Like,
    Love,
    Laugh,
    Wow,
    Sad,
    Angry,
}

impl ReactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReactionType::Like => "like",
            ReactionType::Love => "love",
            ReactionType::Laugh => "laugh",
            ReactionType::Wow => "wow",
            ReactionType::Sad => "sad",
            ReactionType::Angry => "angry",
        }
    }
}

impl FromStr for ReactionType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "like" => Ok(ReactionType::Like),
            "love" => Ok(ReactionType::Love),
            "laugh" => Ok(ReactionType::Laugh),
            "wow" => Ok(ReactionType::Wow),
            "sad" => Ok(ReactionType::Sad),
            "angry" => Ok(ReactionType::Angry),
            other => Err(ModelError::Validation(format!("unknown reaction type: {other}"))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reaction {
    pub post_id: String,
    pub user_id: String,
    #[serde(rename = "type")]
    pub kind: ReactionType,
    pub created_at: DateTime<Utc>,
}

impl Reaction {
    pub fn key(&self) -> String {
        reaction_key(&self.post_id, &self.user_id)
    }
}

/// Document key for the single reaction a user may hold on a post.
pub fn reaction_key(post_id: &str, user_id: &str) -> String {
    format!("{post_id}:{user_id}")
}
