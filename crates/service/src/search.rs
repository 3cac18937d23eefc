//! Linear search filters over in-memory posts and users.

use models::{Post, User};

use crate::hashtags::normalize_tag;

/// Does `post` match `query`?
///
/// A query starting with `#` matches posts carrying a hashtag with that prefix;
/// anything else is a case-insensitive substring match on content or author name.
pub fn post_matches(post: &Post, query: &str) -> bool {
    let query = query.trim();
    if query.is_empty() {
        return false;
    }
    if query.starts_with('#') {
        let prefix = normalize_tag(query);
        return !prefix.is_empty() && post.hashtags.iter().any(|t| t.starts_with(&prefix));
    }
    let needle = query.to_lowercase();
    post.content.to_lowercase().contains(&needle) || post.author_name.to_lowercase().contains(&needle)
}

/// Case-insensitive prefix match on any word of the name, or substring match on email.
pub fn user_matches(user: &User, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return false;
    }
    let name = user.name.to_lowercase();
    name.starts_with(&needle)
        || name.split_whitespace().any(|word| word.starts_with(&needle))
        || user.email.to_lowercase().contains(&needle)
}

/// Matching posts, newest first.
pub fn search_posts<'a, I>(posts: I, query: &str) -> Vec<Post>
where
    I: IntoIterator<Item = &'a Post>,
{
    let mut found: Vec<Post> = posts.into_iter().filter(|p| post_matches(p, query)).cloned().collect();
    found.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
    found
}

/// Matching users, ordered by name.
pub fn search_users<'a, I>(users: I, query: &str) -> Vec<User>
where
    I: IntoIterator<Item = &'a User>,
{
    let mut found: Vec<User> = users.into_iter().filter(|u| user_matches(u, query)).cloned().collect();
    found.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()).then_with(|| a.id.cmp(&b.id)));
    found
}
