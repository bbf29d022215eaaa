use futures_util::TryStreamExt;
use log::{error, info};
use mongodb::{
    Client, Collection,
    bson::{Document, doc, oid::ObjectId},
};

use crate::comment::model::{Comment, CommentResponse};
use crate::database::DATABASE_NAME;
use crate::post::post_model::{Post, PostResponse};
use crate::user::model::UserSnapshot;
use crate::utils::error::CustomError;

/// Durable storage for the post aggregate: the post documents themselves,
/// their like sets, and the comments that reference them.
pub struct PostService {
    posts: Collection<Post>,
    comments: Collection<Comment>,
}

fn like_update(user_id: &str) -> Document {
    doc! { "$addToSet": { "likes": user_id } }
}

fn unlike_update(user_id: &str) -> Document {
    doc! { "$pull": { "likes": user_id } }
}

fn newest_first() -> Document {
    doc! { "createdAt": -1 }
}

impl PostService {
    pub fn new(client: &Client) -> Self {
        let database = client.database(DATABASE_NAME);
        PostService {
            posts: database.collection::<Post>("posts"),
            comments: database.collection::<Comment>("comments"),
        }
    }

    fn parse_post_id(id: &str) -> Result<ObjectId, CustomError> {
        ObjectId::parse_str(id)
            .map_err(|_| CustomError::ValidationError("Invalid post ID".to_string()))
    }

    async fn require_post(&self, object_id: &ObjectId) -> Result<Post, CustomError> {
        self.posts
            .find_one(doc! { "_id": object_id })
            .await
            .map_err(|e| {
                error!("Failed to fetch post {object_id}: {e}");
                CustomError::StorageError("Failed to fetch post".to_string())
            })?
            .ok_or_else(|| CustomError::NotFoundError("Post not found".to_string()))
    }

    pub async fn create_post(
        &self,
        user: UserSnapshot,
        text: &str,
        image_url: Option<String>,
    ) -> Result<Post, CustomError> {
        if text.trim().is_empty() {
            return Err(CustomError::ValidationError(
                "Post text cannot be empty".to_string(),
            ));
        }
        user.validate()?;

        let post = Post::new(user, text.to_string(), image_url);
        self.posts.insert_one(&post).await.map_err(|e| {
            error!("Failed to insert post: {e}");
            CustomError::StorageError("Failed to create post".to_string())
        })?;

        Ok(post)
    }

    /// Add `user_id` to the post's like set. `$addToSet` keeps this
    /// idempotent: liking twice leaves the set unchanged, and concurrent
    /// likes cannot produce duplicates.
    pub async fn like_post(&self, post_id: &str, user_id: &str) -> Result<(), CustomError> {
        let object_id = Self::parse_post_id(post_id)?;

        let result = self
            .posts
            .update_one(doc! { "_id": object_id }, like_update(user_id))
            .await
            .map_err(|e| {
                error!("Failed to like post {post_id}: {e}");
                CustomError::StorageError("Failed to like post".to_string())
            })?;

        if result.matched_count == 0 {
            return Err(CustomError::NotFoundError("Post not found".to_string()));
        }
        Ok(())
    }

    /// Remove `user_id` from the like set; a no-op when it was not present.
    pub async fn unlike_post(&self, post_id: &str, user_id: &str) -> Result<(), CustomError> {
        let object_id = Self::parse_post_id(post_id)?;

        let result = self
            .posts
            .update_one(doc! { "_id": object_id }, unlike_update(user_id))
            .await
            .map_err(|e| {
                error!("Failed to unlike post {post_id}: {e}");
                CustomError::StorageError("Failed to unlike post".to_string())
            })?;

        if result.matched_count == 0 {
            return Err(CustomError::NotFoundError("Post not found".to_string()));
        }
        Ok(())
    }

    /// Append a comment to a post. The comment carries the post id as a
    /// back-reference, so the association is written in one insert and there
    /// is no second update that could be lost halfway.
    pub async fn comment_on_post(
        &self,
        post_id: &str,
        user: UserSnapshot,
        text: &str,
    ) -> Result<Comment, CustomError> {
        if text.trim().is_empty() {
            return Err(CustomError::ValidationError(
                "Comment text cannot be empty".to_string(),
            ));
        }
        user.validate()?;

        let object_id = Self::parse_post_id(post_id)?;
        self.require_post(&object_id).await?;

        let comment = Comment::new(object_id, user, text.to_string());
        self.comments.insert_one(&comment).await.map_err(|e| {
            error!("Failed to insert comment on post {post_id}: {e}");
            CustomError::StorageError("Failed to add comment".to_string())
        })?;

        Ok(comment)
    }

    /// All comments for a post, newest first.
    pub async fn get_comments(&self, post_id: &str) -> Result<Vec<CommentResponse>, CustomError> {
        let object_id = Self::parse_post_id(post_id)?;
        self.require_post(&object_id).await?;
        self.comments_for(&object_id).await
    }

    async fn comments_for(&self, post_id: &ObjectId) -> Result<Vec<CommentResponse>, CustomError> {
        let cursor = self
            .comments
            .find(doc! { "postId": post_id })
            .sort(newest_first())
            .await
            .map_err(|e| {
                error!("Failed to fetch comments for post {post_id}: {e}");
                CustomError::StorageError("Failed to fetch comments".to_string())
            })?;

        let comments: Vec<Comment> = cursor.try_collect().await.map_err(|e| {
            error!("Failed to collect comments for post {post_id}: {e}");
            CustomError::StorageError("Failed to fetch comments".to_string())
        })?;

        Ok(comments.into_iter().map(CommentResponse::from).collect())
    }

    /// Delete a post and cascade to its comments. The two deletes are not
    /// one transaction; a crash in between leaves orphaned comments, which
    /// the back-reference makes straightforward to sweep.
    pub async fn remove_post(&self, post_id: &str) -> Result<(), CustomError> {
        let object_id = Self::parse_post_id(post_id)?;

        let result = self
            .posts
            .delete_one(doc! { "_id": object_id })
            .await
            .map_err(|e| {
                error!("Failed to delete post {post_id}: {e}");
                CustomError::StorageError("Failed to delete post".to_string())
            })?;

        if result.deleted_count == 0 {
            return Err(CustomError::NotFoundError("Post not found".to_string()));
        }

        let removed = self
            .comments
            .delete_many(doc! { "postId": object_id })
            .await
            .map_err(|e| {
                error!("Failed to delete comments of post {post_id}: {e}");
                CustomError::StorageError("Failed to delete post comments".to_string())
            })?;

        info!(
            "Removed post {post_id} and {} of its comments",
            removed.deleted_count
        );
        Ok(())
    }

    /// Every post, newest first, with comments resolved newest first.
    pub async fn get_all_posts(&self) -> Result<Vec<PostResponse>, CustomError> {
        let cursor = self
            .posts
            .find(doc! {})
            .sort(newest_first())
            .await
            .map_err(|e| {
                error!("Failed to fetch posts: {e}");
                CustomError::StorageError("Failed to fetch posts".to_string())
            })?;

        let posts: Vec<Post> = cursor.try_collect().await.map_err(|e| {
            error!("Failed to collect posts: {e}");
            CustomError::StorageError("Failed to fetch posts".to_string())
        })?;

        let mut responses = Vec::with_capacity(posts.len());
        for post in posts {
            let comments = self.comments_for(&post.id).await?;
            responses.push(PostResponse::from_post(post, comments));
        }
        Ok(responses)
    }
}
