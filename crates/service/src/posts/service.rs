use std::sync::Arc;

use chrono::Utc;
use models::post::{NewPost, PostUpdate};
use models::Post;
use serde::Serialize;
use tracing::{info, instrument};

use crate::errors::ServiceError;
use crate::hashtags::{popular_hashtags, HashtagStat};
use crate::pagination::Page;
use crate::search::{search_posts, search_users};
use crate::storage::{DeletedPost, DocumentStore, GetPostsOptions};

#[derive(Clone, Debug, Serialize)]
pub struct SearchResults {
    pub posts: Vec<Post>,
    pub users: Vec<models::User>,
}

/// Post business rules on top of [`DocumentStore`]: only the author may
/// change or remove a post.
#[derive(Clone)]
pub struct PostService {
    store: Arc<DocumentStore>,
}

impl PostService {
    pub fn new(store: Arc<DocumentStore>) -> Self { Self { store } }

    /// Publish a post as `actor_id`.
    ///
    /// # Examples
    /// ```
    /// use service::{posts::PostService, storage::DocumentStore};
    /// use models::{post::NewPost, user::NewUser};
    /// let dir = std::env::temp_dir().join(format!("doc_{}", uuid::Uuid::new_v4()));
    /// let store = DocumentStore::new(dir.join("db.json"), dir.join("db.json.backup"), false);
    /// let user = tokio_test::block_on(store.create_user(NewUser { id: None, name: "Ali".into(), email: "ali@kz".into(), bio: None })).unwrap();
    /// let svc = PostService::new(store);
    /// let post = tokio_test::block_on(svc.create(&user.id, NewPost { content: "Hi #bailanysta".into(), mood: None })).unwrap();
    /// assert_eq!(post.hashtags, vec!["bailanysta"]);
    /// ```
    #[instrument(skip(self, input), fields(user_id = %actor_id))]
    pub async fn create(&self, actor_id: &str, input: NewPost) -> Result<Post, ServiceError> {
        let post = self.store.create_post(actor_id, input).await?;
        info!(post_id = %post.id, hashtags = post.hashtags.len(), "post_created");
        Ok(post)
    }

    pub async fn get(&self, id: &str) -> Result<Post, ServiceError> {
        self.store.get_post(id).await?.ok_or_else(|| ServiceError::not_found("post"))
    }

    pub async fn list(&self, opts: &GetPostsOptions) -> Result<Page<Post>, ServiceError> {
        self.store.get_posts(opts).await
    }

    #[instrument(skip(self, update), fields(user_id = %actor_id, post_id = %id))]
    pub async fn update(&self, actor_id: &str, id: &str, update: PostUpdate) -> Result<Post, ServiceError> {
        if update.is_empty() {
            return Err(ServiceError::Validation("nothing to update".into()));
        }
        self.authorize(actor_id, id, "edit this post").await?;
        let post = self
            .store
            .update_post(id, update)
            .await?
            .ok_or_else(|| ServiceError::not_found("post"))?;
        info!("post_updated");
        Ok(post)
    }

    /// Delete a post and everything hanging off it.
    #[instrument(skip(self), fields(user_id = %actor_id, post_id = %id))]
    pub async fn delete(&self, actor_id: &str, id: &str) -> Result<DeletedPost, ServiceError> {
        self.authorize(actor_id, id, "delete this post").await?;
        let deleted = self
            .store
            .delete_post(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("post"))?;
        info!(comments = deleted.comments_removed, reactions = deleted.reactions_removed, "post_deleted");
        Ok(deleted)
    }

    /// Trending tags over every post, newest weighted highest.
    pub async fn popular_hashtags(&self, limit: usize) -> Result<Vec<HashtagStat>, ServiceError> {
        let now = Utc::now();
        self.store.read(|doc| popular_hashtags(doc.posts.values(), now, limit)).await
    }

    /// Search posts and users; each list is capped at `limit`.
    pub async fn search(&self, query: &str, limit: usize) -> Result<SearchResults, ServiceError> {
        if query.trim().is_empty() {
            return Ok(SearchResults { posts: vec![], users: vec![] });
        }
        self.store
            .read(|doc| {
                let mut posts = search_posts(doc.posts.values(), query);
                posts.truncate(limit);
                let mut users = search_users(doc.users.values(), query);
                users.truncate(limit);
                SearchResults { posts, users }
            })
            .await
    }

    async fn authorize(&self, actor_id: &str, post_id: &str, action: &str) -> Result<Post, ServiceError> {
        let post = self.get(post_id).await?;
        if post.author_id != actor_id {
            return Err(ServiceError::forbidden(action));
        }
        Ok(post)
    }
}
