use chrono::Utc;
use common::metrics;
use models::comment::{validate_comment_content, NewComment};
use models::Comment;

use super::DocumentStore;
use crate::errors::ServiceError;

impl DocumentStore {
    /// Add a comment and bump the post's `commentCount`.
    pub async fn create_comment(&self, post_id: &str, author_id: &str, input: NewComment) -> Result<Comment, ServiceError> {
        validate_comment_content(&input.content)?;
        let comment = self
            .mutate("create_comment", |doc| {
                let author = doc.users.get(author_id).ok_or_else(|| ServiceError::not_found("user"))?;
                let comment = Comment {
                    id: models::new_id(),
                    content: input.content.trim().to_string(),
                    post_id: post_id.to_string(),
                    author_id: author.id.clone(),
                    author_name: author.name.clone(),
                    created_at: Utc::now(),
                };
                let post = doc.posts.get_mut(post_id).ok_or_else(|| ServiceError::not_found("post"))?;
                post.comment_count += 1;
                doc.comments.insert(comment.id.clone(), comment.clone());
                Ok(comment)
            })
            .await?;
        metrics::record_mutation("comment", "create");
        Ok(comment)
    }

    pub async fn get_comment(&self, id: &str) -> Result<Option<Comment>, ServiceError> {
        self.read(|doc| doc.comments.get(id).cloned()).await
    }

    /// Comments on a post, oldest first; `None` when the post does not exist.
    pub async fn get_comments(&self, post_id: &str) -> Result<Option<Vec<Comment>>, ServiceError> {
        self.read(|doc| {
            doc.posts.get(post_id)?;
            let mut comments: Vec<Comment> = doc.comments.values().filter(|c| c.post_id == post_id).cloned().collect();
            comments.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
            Some(comments)
        })
        .await
    }

    /// Remove a comment and decrement its post's `commentCount`.
    pub async fn delete_comment(&self, id: &str) -> Result<Option<Comment>, ServiceError> {
        let removed = self
            .try_mutate("delete_comment", |doc| {
                let Some(comment) = doc.comments.remove(id) else {
                    return Ok(None);
                };
                if let Some(post) = doc.posts.get_mut(&comment.post_id) {
                    post.comment_count = post.comment_count.saturating_sub(1);
                }
                Ok(Some(comment))
            })
            .await?;
        if removed.is_some() {
            metrics::record_mutation("comment", "delete");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{cleanup, seed_user, temp_store};
    use models::post::NewPost;

    #[tokio::test]
    async fn comment_counts_follow_create_and_delete() -> Result<(), anyhow::Error> {
        let store = temp_store();
        let user = seed_user(&store, "Nurlan").await?;
        let post = store.create_post(&user.id, NewPost { content: "p".into(), mood: None }).await?;

        let c1 = store.create_comment(&post.id, &user.id, NewComment { content: " first ".into() }).await?;
        store.create_comment(&post.id, &user.id, NewComment { content: "second".into() }).await?;
        assert_eq!(c1.content, "first");
        assert_eq!(store.get_post(&post.id).await?.map(|p| p.comment_count), Some(2));

        let listed = store.get_comments(&post.id).await?.expect("post exists");
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, c1.id);

        assert!(store.delete_comment(&c1.id).await?.is_some());
        assert!(store.delete_comment(&c1.id).await?.is_none());
        assert_eq!(store.get_post(&post.id).await?.map(|p| p.comment_count), Some(1));
        assert_eq!(store.snapshot().await?.consistency_error(), None);
        cleanup(&store).await;
        Ok(())
    }

    #[tokio::test]
    async fn comment_on_missing_post_is_not_found() -> Result<(), anyhow::Error> {
        let store = temp_store();
        let user = seed_user(&store, "Nurlan").await?;
        let res = store.create_comment("nope", &user.id, NewComment { content: "x".into() }).await;
        assert!(matches!(res, Err(ServiceError::NotFound(_))));
        assert!(store.get_comments("nope").await?.is_none());
        assert_eq!(store.stats().await?.total_comments, 0);
        cleanup(&store).await;
        Ok(())
    }
}
