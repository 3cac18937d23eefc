use std::sync::Arc;

use models::comment::NewComment;
use models::Comment;
use tracing::{info, instrument};

use crate::errors::ServiceError;
use crate::storage::DocumentStore;

/// Comment rules: anyone may comment on an existing post; the comment's
/// author or the post's author may remove it.
#[derive(Clone)]
pub struct CommentService {
    store: Arc<DocumentStore>,
}

impl CommentService {
    pub fn new(store: Arc<DocumentStore>) -> Self { Self { store } }

    #[instrument(skip(self, input), fields(user_id = %actor_id, post_id = %post_id))]
    pub async fn create(&self, actor_id: &str, post_id: &str, input: NewComment) -> Result<Comment, ServiceError> {
        let comment = self.store.create_comment(post_id, actor_id, input).await?;
        info!(comment_id = %comment.id, "comment_created");
        Ok(comment)
    }

    pub async fn list(&self, post_id: &str) -> Result<Vec<Comment>, ServiceError> {
        self.store.get_comments(post_id).await?.ok_or_else(|| ServiceError::not_found("post"))
    }

    #[instrument(skip(self), fields(user_id = %actor_id, comment_id = %id))]
    pub async fn delete(&self, actor_id: &str, id: &str) -> Result<Comment, ServiceError> {
        let comment = self.store.get_comment(id).await?.ok_or_else(|| ServiceError::not_found("comment"))?;
        if comment.author_id != actor_id {
            let post_author = self.store.get_post(&comment.post_id).await?.map(|p| p.author_id);
            if post_author.as_deref() != Some(actor_id) {
                return Err(ServiceError::forbidden("delete this comment"));
            }
        }
        let removed = self
            .store
            .delete_comment(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("comment"))?;
        info!("comment_deleted");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{cleanup, seed_user, temp_store};
    use models::post::NewPost;

    #[tokio::test]
    async fn comment_author_and_post_author_may_delete() -> Result<(), anyhow::Error> {
        let store = temp_store();
        let owner = seed_user(&store, "Owner").await?;
        let guest = seed_user(&store, "Guest").await?;
        let stranger = seed_user(&store, "Stranger").await?;
        let post = store.create_post(&owner.id, NewPost { content: "talk".into(), mood: None }).await?;
        let svc = CommentService::new(store.clone());

        let first = svc.create(&guest.id, &post.id, NewComment { content: "one".into() }).await?;
        let second = svc.create(&guest.id, &post.id, NewComment { content: "two".into() }).await?;
        assert_eq!(store.get_post(&post.id).await?.map(|p| p.comment_count), Some(2));

        let err = svc.delete(&stranger.id, &first.id).await.unwrap_err();
        assert_eq!(err.code(), "FORBIDDEN");
        svc.delete(&guest.id, &first.id).await?;
        svc.delete(&owner.id, &second.id).await?;
        assert!(svc.list(&post.id).await?.is_empty());
        assert_eq!(store.get_post(&post.id).await?.map(|p| p.comment_count), Some(0));
        cleanup(&store).await;
        Ok(())
    }

    #[tokio::test]
    async fn missing_targets_are_not_found() -> Result<(), anyhow::Error> {
        let store = temp_store();
        let user = seed_user(&store, "U").await?;
        let svc = CommentService::new(store.clone());
        assert_eq!(svc.list("ghost").await.unwrap_err().code(), "NOT_FOUND");
        assert_eq!(svc.delete(&user.id, "ghost").await.unwrap_err().code(), "NOT_FOUND");
        let err = svc.create(&user.id, "ghost", NewComment { content: "hi".into() }).await.unwrap_err();
        assert_eq!(err.code(), "NOT_FOUND");
        let err = svc.create(&user.id, "ghost", NewComment { content: "   ".into() }).await.unwrap_err();
        assert_eq!(err.code(), "BAD_REQUEST");
        cleanup(&store).await;
        Ok(())
    }
}
