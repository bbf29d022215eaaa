use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::user::model::UserSnapshot;

/// A single comment document.
///
/// Comments carry a `postId` back-reference to the post they belong to, so
/// creating one is a single insert and a post's comment list is rebuilt by
/// query instead of by maintaining a reference array on the post document.
/// Comments are immutable once written.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub post_id: ObjectId,
    pub user: UserSnapshot,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(post_id: ObjectId, user: UserSnapshot, text: String) -> Self {
        let now = Utc::now();
        Comment {
            id: Some(ObjectId::new()),
            post_id,
            user,
            text,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Comment as returned to callers: identifiers are plain hex strings.
#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: String,
    pub post_id: String,
    pub user: UserSnapshot,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Comment> for CommentResponse {
    fn from(comment: Comment) -> Self {
        CommentResponse {
            id: comment.id.map(|id| id.to_hex()).unwrap_or_default(),
            post_id: comment.post_id.to_hex(),
            user: comment.user,
            text: comment.text,
            created_at: comment.created_at,
            updated_at: comment.updated_at,
        }
    }
}

#[derive(Deserialize)]
pub struct CreateCommentRequest {
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> UserSnapshot {
        UserSnapshot {
            user_id: "u1".to_string(),
            user_image: "img".to_string(),
            first_name: "A".to_string(),
            last_name: Some("B".to_string()),
        }
    }

    #[test]
    fn new_comment_has_matching_timestamps() {
        let comment = Comment::new(ObjectId::new(), user(), "nice post".to_string());
        assert_eq!(comment.created_at, comment.updated_at);
        assert!(comment.id.is_some());
    }

    #[test]
    fn response_exposes_ids_as_hex_strings() {
        let post_id = ObjectId::new();
        let comment = Comment::new(post_id, user(), "nice post".to_string());
        let comment_id = comment.id.unwrap();

        let response = CommentResponse::from(comment);
        assert_eq!(response.id, comment_id.to_hex());
        assert_eq!(response.post_id, post_id.to_hex());
        assert_eq!(response.text, "nice post");
    }

    #[test]
    fn response_serializes_camel_case() {
        let comment = Comment::new(ObjectId::new(), user(), "hey".to_string());
        let value = serde_json::to_value(CommentResponse::from(comment)).unwrap();
        assert!(value.get("postId").is_some());
        assert!(value.get("createdAt").is_some());
        assert!(value.get("post_id").is_none());
    }
}
