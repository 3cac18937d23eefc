use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

pub const MAX_POST_LENGTH: usize = 500;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Happy,
    Sad,
    Excited,
    Thoughtful,
    Grateful,
    Calm,
    Angry,
    Inspired,
}

impl Mood {
    pub const ALL: [Mood; 8] = [
        Mood::Happy,
        Mood::Sad,
        Mood::Excited,
        Mood::Thoughtful,
        Mood::Grateful,
        Mood::Calm,
        Mood::Angry,
        Mood::Inspired,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Happy => "happy",
            Mood::Sad => "sad",
            Mood::Excited => "excited",
            Mood::Thoughtful => "thoughtful",
            Mood::Grateful => "grateful",
            Mood::Calm => "calm",
            Mood::Angry => "angry",
            Mood::Inspired => "inspired",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mood {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Mood::ALL
            .into_iter()
            .find(|m| m.as_str() == lower)
            .ok_or_else(|| ModelError::Validation(format!("unknown mood: {s}")))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub content: String,
    pub author_id: String,
    pub author_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<Mood>,
    #[serde(default)]
    pub hashtags: Vec<String>,
    #[serde(default)]
    pub reaction_count: u64,
    #[serde(default)]
    pub comment_count: u64,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    pub content: String,
    #[serde(default)]
    pub mood: Option<Mood>,
}

/// Partial update; `None` fields are left untouched.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostUpdate {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub mood: Option<Mood>,
}

impl PostUpdate {
    pub fn is_empty(&self) -> bool {
        self.content.is_none() && self.mood.is_none()
    }
}

/// Trimmed content must be non-empty and at most [`MAX_POST_LENGTH`] characters.
pub fn validate_post_content(content: &str) -> Result<(), ModelError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(ModelError::Validation("post content is required".into()));
    }
    if trimmed.chars().count() > MAX_POST_LENGTH {
        return Err(ModelError::Validation(format!("post content exceeds {MAX_POST_LENGTH} characters")));
    }
    Ok(())
}
