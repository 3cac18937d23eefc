use std::cmp::Ordering;
use std::str::FromStr;

use chrono::Utc;
use common::metrics;
use models::post::{validate_post_content, NewPost, PostUpdate};
use models::{Mood, Post};
use serde::{Deserialize, Serialize};

use super::DocumentStore;
use crate::errors::ServiceError;
use crate::hashtags::{extract_hashtags, normalize_tag};
use crate::pagination::{Page, PageRequest};
use crate::search::post_matches;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PostSort {
    #[default]
    CreatedAt,
    UpdatedAt,
    Reactions,
    Comments,
}

impl FromStr for PostSort {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "createdAt" | "created_at" | "newest" => Ok(PostSort::CreatedAt),
            "updatedAt" | "updated_at" => Ok(PostSort::UpdatedAt),
            "reactions" | "reactionCount" | "popular" => Ok(PostSort::Reactions),
            "comments" | "commentCount" => Ok(PostSort::Comments),
            other => Err(ServiceError::Validation(format!("unknown sort field: {other}"))),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl FromStr for SortOrder {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(ServiceError::Validation(format!("unknown sort order: {other}"))),
        }
    }
}

/// Filters, ordering and window for [`DocumentStore::get_posts`].
#[derive(Clone, Debug, Default)]
pub struct GetPostsOptions {
    pub page: PageRequest,
    pub sort_by: PostSort,
    pub order: SortOrder,
    pub author_id: Option<String>,
    /// With or without the leading `#`; exact tag match.
    pub hashtag: Option<String>,
    pub mood: Option<Mood>,
    pub search: Option<String>,
}

/// What a cascading post delete removed.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedPost {
    pub post: Post,
    pub comments_removed: usize,
    pub reactions_removed: usize,
}

/// Apply `opts` filters and ordering to `posts`. Pagination is left to the caller.
pub fn filter_and_sort<'a, I>(posts: I, opts: &GetPostsOptions) -> Vec<Post>
where
    I: IntoIterator<Item = &'a Post>,
{
    let hashtag = opts.hashtag.as_deref().map(normalize_tag).filter(|t| !t.is_empty());
    let search = opts.search.as_deref().map(str::trim).filter(|q| !q.is_empty());

    let mut out: Vec<Post> = posts
        .into_iter()
        .filter(|p| opts.author_id.as_deref().map_or(true, |a| p.author_id == a))
        .filter(|p| hashtag.as_deref().map_or(true, |t| p.hashtags.iter().any(|h| h == t)))
        .filter(|p| opts.mood.map_or(true, |m| p.mood == Some(m)))
        .filter(|p| search.map_or(true, |q| post_matches(p, q)))
        .cloned()
        .collect();

    out.sort_by(|a, b| {
        let primary = match opts.sort_by {
            PostSort::CreatedAt => a.created_at.cmp(&b.created_at),
            PostSort::UpdatedAt => a.updated_at.cmp(&b.updated_at),
            PostSort::Reactions => a.reaction_count.cmp(&b.reaction_count),
            PostSort::Comments => a.comment_count.cmp(&b.comment_count),
        };
        let primary = match opts.order {
            SortOrder::Asc => primary,
            SortOrder::Desc => primary.reverse(),
        };
        // newest first among equals, then id for a total order
        primary
            .then_with(|| b.created_at.cmp(&a.created_at))
            .then_with(|| a.id.cmp(&b.id))
    });
    out
}

impl DocumentStore {
    /// Create a post for an existing user. Hashtags are derived from the content.
    pub async fn create_post(&self, author_id: &str, input: NewPost) -> Result<Post, ServiceError> {
        validate_post_content(&input.content)?;
        let content = input.content.trim().to_string();
        let post = self
            .mutate("create_post", |doc| {
                let author = doc.users.get(author_id).ok_or_else(|| ServiceError::not_found("user"))?;
                let now = Utc::now();
                let post = Post {
                    id: models::new_id(),
                    hashtags: extract_hashtags(&content),
                    content,
                    author_id: author.id.clone(),
                    author_name: author.name.clone(),
                    created_at: now,
                    updated_at: now,
                    mood: input.mood,
                    reaction_count: 0,
                    comment_count: 0,
                };
                doc.posts.insert(post.id.clone(), post.clone());
                Ok(post)
            })
            .await?;
        metrics::record_mutation("post", "create");
        Ok(post)
    }

    pub async fn get_post(&self, id: &str) -> Result<Option<Post>, ServiceError> {
        self.read(|doc| doc.posts.get(id).cloned()).await
    }

    /// Apply a partial update; content changes recompute hashtags.
    /// `Ok(None)` when the post does not exist.
    pub async fn update_post(&self, id: &str, update: PostUpdate) -> Result<Option<Post>, ServiceError> {
        if let Some(content) = &update.content {
            validate_post_content(content)?;
        }
        let updated = self
            .try_mutate("update_post", |doc| {
                let Some(post) = doc.posts.get_mut(id) else {
                    return Ok(None);
                };
                if let Some(content) = update.content {
                    post.content = content.trim().to_string();
                    post.hashtags = extract_hashtags(&post.content);
                }
                if let Some(mood) = update.mood {
                    post.mood = Some(mood);
                }
                post.updated_at = Utc::now();
                Ok(Some(post.clone()))
            })
            .await?;
        if updated.is_some() {
            metrics::record_mutation("post", "update");
        }
        Ok(updated)
    }

    /// Remove a post together with its comments and reactions.
    pub async fn delete_post(&self, id: &str) -> Result<Option<DeletedPost>, ServiceError> {
        let deleted = self
            .try_mutate("delete_post", |doc| {
                let Some(post) = doc.posts.remove(id) else {
                    return Ok(None);
                };
                let comments_before = doc.comments.len();
                doc.comments.retain(|_, c| c.post_id != post.id);
                let reactions_before = doc.reactions.len();
                doc.reactions.retain(|_, r| r.post_id != post.id);
                Ok(Some(DeletedPost {
                    comments_removed: comments_before - doc.comments.len(),
                    reactions_removed: reactions_before - doc.reactions.len(),
                    post,
                }))
            })
            .await?;
        if deleted.is_some() {
            metrics::record_mutation("post", "delete");
        }
        Ok(deleted)
    }

    pub async fn get_posts(&self, opts: &GetPostsOptions) -> Result<Page<Post>, ServiceError> {
        let sorted = self.read(|doc| filter_and_sort(doc.posts.values(), opts)).await?;
        Ok(opts.page.apply(sorted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{cleanup, seed_user, temp_store};
    use chrono::Duration;
    use models::comment::NewComment;
    use models::ReactionType;

    fn post(id: &str, author: &str, age_min: i64, reactions: u64, tags: &[&str]) -> Post {
        let at = Utc::now() - Duration::minutes(age_min);
        Post {
            id: id.into(),
            content: id.into(),
            author_id: author.into(),
            author_name: author.into(),
            created_at: at,
            updated_at: at,
            mood: None,
            hashtags: tags.iter().map(|t| t.to_string()).collect(),
            reaction_count: reactions,
            comment_count: 0,
        }
    }

    #[test]
    fn sort_parsing() {
        assert_eq!("popular".parse::<PostSort>().unwrap(), PostSort::Reactions);
        assert_eq!("ASC".parse::<SortOrder>().unwrap(), SortOrder::Asc);
        assert!("random".parse::<PostSort>().is_err());
    }

    #[test]
    fn filters_and_orders() {
        let posts = vec![
            post("a", "u1", 30, 5, &["rust"]),
            post("b", "u2", 20, 9, &["rust", "go"]),
            post("c", "u1", 10, 1, &[]),
        ];
        let newest: Vec<_> = filter_and_sort(&posts, &GetPostsOptions::default()).into_iter().map(|p| p.id).collect();
        assert_eq!(newest, vec!["c", "b", "a"]);

        let opts = GetPostsOptions { hashtag: Some("#Rust".into()), sort_by: PostSort::Reactions, ..Default::default() };
        let by_reactions: Vec<_> = filter_and_sort(&posts, &opts).into_iter().map(|p| p.id).collect();
        assert_eq!(by_reactions, vec!["b", "a"]);

        let opts = GetPostsOptions { author_id: Some("u1".into()), order: SortOrder::Asc, ..Default::default() };
        let oldest: Vec<_> = filter_and_sort(&posts, &opts).into_iter().map(|p| p.id).collect();
        assert_eq!(oldest, vec!["a", "c"]);
    }

    #[tokio::test]
    async fn create_derives_hashtags_and_author() -> Result<(), anyhow::Error> {
        let store = temp_store();
        let user = seed_user(&store, "Madina").await?;
        let post = store
            .create_post(&user.id, NewPost { content: "  Sunny day #Weather #weather  ".into(), mood: Some(Mood::Happy) })
            .await?;
        assert_eq!(post.content, "Sunny day #Weather #weather");
        assert_eq!(post.hashtags, vec!["weather"]);
        assert_eq!(post.author_name, "Madina");
        assert_eq!(store.stats().await?.total_posts, 1);

        let missing = store.create_post("ghost", NewPost { content: "hi".into(), mood: None }).await;
        assert!(matches!(missing, Err(ServiceError::NotFound(_))));
        let empty = store.create_post(&user.id, NewPost { content: "   ".into(), mood: None }).await;
        assert!(matches!(empty, Err(ServiceError::Model(_))));
        cleanup(&store).await;
        Ok(())
    }

    #[tokio::test]
    async fn update_recomputes_hashtags() -> Result<(), anyhow::Error> {
        let store = temp_store();
        let user = seed_user(&store, "Madina").await?;
        let post = store.create_post(&user.id, NewPost { content: "#one".into(), mood: None }).await?;
        let updated = store
            .update_post(&post.id, PostUpdate { content: Some("now #two and #three".into()), mood: None })
            .await?
            .expect("exists");
        assert_eq!(updated.hashtags, vec!["two", "three"]);
        assert!(updated.updated_at >= post.updated_at);
        assert!(store.update_post("missing", PostUpdate::default()).await?.is_none());
        cleanup(&store).await;
        Ok(())
    }

    #[tokio::test]
    async fn delete_cascades_to_comments_and_reactions() -> Result<(), anyhow::Error> {
        let store = temp_store();
        let author = seed_user(&store, "Madina").await?;
        let reader = seed_user(&store, "Erlan").await?;
        let doomed = store.create_post(&author.id, NewPost { content: "bye".into(), mood: None }).await?;
        let kept = store.create_post(&author.id, NewPost { content: "stay".into(), mood: None }).await?;
        store.create_comment(&doomed.id, &reader.id, NewComment { content: "x".into() }).await?;
        store.create_comment(&kept.id, &reader.id, NewComment { content: "y".into() }).await?;
        store.set_reaction(&doomed.id, &reader.id, ReactionType::Like).await?;
        store.set_reaction(&doomed.id, &author.id, ReactionType::Love).await?;

        let deleted = store.delete_post(&doomed.id).await?.expect("deleted");
        assert_eq!(deleted.comments_removed, 1);
        assert_eq!(deleted.reactions_removed, 2);

        let doc = store.snapshot().await?;
        assert!(doc.comments.values().all(|c| c.post_id != doomed.id));
        assert!(doc.reactions.values().all(|r| r.post_id != doomed.id));
        assert_eq!(doc.metadata.total_comments, 1);
        assert_eq!(doc.consistency_error(), None);
        assert!(store.delete_post(&doomed.id).await?.is_none());
        cleanup(&store).await;
        Ok(())
    }

    #[tokio::test]
    async fn get_posts_paginates() -> Result<(), anyhow::Error> {
        let store = temp_store();
        let user = seed_user(&store, "Madina").await?;
        for i in 0..5 {
            store.create_post(&user.id, NewPost { content: format!("post {i}"), mood: None }).await?;
        }
        let opts = GetPostsOptions { page: PageRequest::new(Some(2), Some(0)), ..Default::default() };
        let page = store.get_posts(&opts).await?;
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total, 5);
        assert!(page.has_more);
        cleanup(&store).await;
        Ok(())
    }
}
