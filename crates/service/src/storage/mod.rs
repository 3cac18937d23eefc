//! File-backed persistence for the Bailanysta data document.
//!
//! One JSON file holds every user, post, comment and reaction. The
//! [`DocumentStore`] caches it in memory, rewrites it whole on every change,
//! upgrades legacy layouts on load, and keeps an on-demand backup beside it.
//! Entity helpers (`create_post`, `delete_comment`, ...) are unchecked CRUD;
//! authorship rules live in the services.

pub mod document_store;
pub mod migration;
pub mod persist;
pub mod posts;
pub mod users;
pub mod comments;
pub mod reactions;

pub use document_store::{BackupInfo, DocumentStore};
pub use posts::{DeletedPost, GetPostsOptions, PostSort, SortOrder};
pub use reactions::{ReactionSummary, ToggleAction, ToggleOutcome};
