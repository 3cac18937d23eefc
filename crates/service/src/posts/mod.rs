//! Posts: authorship-checked CRUD, feeds, search and trending hashtags.

pub mod service;

pub use service::{PostService, SearchResults};
