use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

pub const MAX_COMMENT_LENGTH: usize = 300;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub content: String,
    pub post_id: String,
    pub author_id: String,
    pub author_name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewComment {
    pub content: String,
}

pub fn validate_comment_content(content: &str) -> Result<(), ModelError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(ModelError::Validation("comment content is required".into()));
    }
    if trimmed.chars().count() > MAX_COMMENT_LENGTH {
        return Err(ModelError::Validation(format!("comment exceeds {MAX_COMMENT_LENGTH} characters")));
    }
    Ok(())
}
