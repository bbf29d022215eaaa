use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::comment::model::CommentResponse;
use crate::user::model::UserSnapshot;

/// A post document. `likes` holds user ids with set semantics: membership
/// only, enforced with `$addToSet` at the store so concurrent likes stay
/// duplicate-free. Comments live in their own collection and point back at
/// the post, so there is no reference array here.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub user: UserSnapshot,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default)]
    pub likes: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    pub fn new(user: UserSnapshot, text: String, image_url: Option<String>) -> Self {
        let now = Utc::now();
        Post {
            id: ObjectId::new(),
            user,
            text,
            image_url,
            likes: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Post as returned to callers, with its comments resolved (newest first)
/// and the identifier as a plain hex string.
#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: String,
    pub user: UserSnapshot,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub likes: Vec<String>,
    pub comments: Vec<CommentResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PostResponse {
    pub fn from_post(post: Post, comments: Vec<CommentResponse>) -> Self {
        PostResponse {
            id: post.id.to_hex(),
            user: post.user,
            text: post.text,
            image_url: post.image_url,
            likes: post.likes,
            comments,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}
