//! Service layer for Bailanysta.
//! - `storage`: the file-backed JSON document and its entity helpers.
//! - `posts`, `comments`, `reactions`, `users`: business rules (authorship, toggles).
//! - `hashtags`, `search`, `pagination`: pure helpers over loaded entities.
//! - `analytics`: client event intake.

pub mod errors;
pub mod runtime;
#[cfg(test)]
pub mod test_support;
pub mod storage;
pub mod pagination;
pub mod hashtags;
pub mod search;
pub mod posts;
pub mod comments;
pub mod reactions;
pub mod users;
pub mod analytics;

pub use errors::ServiceError;
