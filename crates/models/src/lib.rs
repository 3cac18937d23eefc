//! Entities persisted in the Bailanysta data document.
//!
//! Everything here is plain data plus validation; persistence and business
//! rules live in the `service` crate.

pub mod errors;
pub mod user;
pub mod post;
pub mod comment;
pub mod reaction;
pub mod document;

pub use comment::Comment;
pub use document::{DataDocument, Metadata, CURRENT_VERSION};
pub use post::{Mood, Post};
pub use reaction::{Reaction, ReactionType};
pub use user::User;

/// Fresh entity id.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
