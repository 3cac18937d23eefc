use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("storage write failed: {0}")]
    StorageWriteFailed(String),
    #[error("data file is corrupted: {0}")]
    Corrupted(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("model error: {0}")]
    Model(#[from] models::errors::ModelError),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} not found", entity)) }

    pub fn forbidden(action: &str) -> Self { Self::Forbidden(format!("only the author can {}", action)) }

    /// Stable classification string surfaced to API clients.
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::Validation(_) | ServiceError::Model(_) => "BAD_REQUEST",
            ServiceError::NotFound(_) => "NOT_FOUND",
            ServiceError::Forbidden(_) => "FORBIDDEN",
            ServiceError::StorageWriteFailed(_) => "STORAGE_WRITE_FAILED",
            ServiceError::Corrupted(_) | ServiceError::Storage(_) => "INTERNAL_SERVER_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::errors::ModelError;

    #[test]
    fn codes_preserve_classification() {
        assert_eq!(ServiceError::not_found("post").code(), "NOT_FOUND");
        assert_eq!(ServiceError::forbidden("delete this post").code(), "FORBIDDEN");
        assert_eq!(ServiceError::StorageWriteFailed("ro".into()).code(), "STORAGE_WRITE_FAILED");
        assert_eq!(ServiceError::from(ModelError::Validation("x".into())).code(), "BAD_REQUEST");
        assert_eq!(ServiceError::Corrupted("x".into()).code(), "INTERNAL_SERVER_ERROR");
    }

    #[test]
    fn messages_are_readable() {
        assert_eq!(ServiceError::not_found("comment").to_string(), "not found: comment not found");
        assert_eq!(ServiceError::forbidden("edit this post").to_string(), "forbidden: only the author can edit this post");
    }
}
