//! Request/response types for comment and reply endpoints.

use crate::api::{
    handlers::users::types::PublicUserResponse,
    models::{Comment, ReplyEntry, User},
};
use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct CommentRequest {
    pub description: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ReplyRequest {
    pub description: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ReplyResponse {
    pub id: String,
    pub user: Option<PublicUserResponse>,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ReplyResponse {
    pub(super) fn new(reply: &ReplyEntry, user: Option<PublicUserResponse>) -> Self {
        Self {
            id: reply.id.to_hex(),
            user,
            description: reply.description.clone(),
            created_at: reply.created_at.to_chrono(),
            updated_at: reply.updated_at.to_chrono(),
        }
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct CommentResponse {
    pub id: String,
    pub user: Option<PublicUserResponse>,
    pub description: String,
    pub replies: Vec<ReplyResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CommentResponse {
    /// Build the response, resolving comment and reply authors from the
    /// batch-loaded user map.
    pub(super) fn with_authors(comment: &Comment, authors: &HashMap<ObjectId, User>) -> Self {
        Self {
            id: comment.id.to_hex(),
            user: authors.get(&comment.user_id).map(PublicUserResponse::from),
            description: comment.description.clone(),
            replies: comment
                .replies
                .iter()
                .map(|reply| {
                    ReplyResponse::new(
                        reply,
                        authors.get(&reply.user_id).map(PublicUserResponse::from),
                    )
                })
                .collect(),
            created_at: comment.created_at.to_chrono(),
            updated_at: comment.updated_at.to_chrono(),
        }
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct CommentListResponse {
    pub count: u64,
    pub results: Vec<CommentResponse>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_authors_resolves_comment_and_reply_users() {
        let author = User::new("alice".to_string(), "Alice".to_string(), None);
        let replier = User::new("bob".to_string(), "Bob".to_string(), None);

        let mut comment = Comment::new(author.id, ObjectId::new(), "hello".to_string());
        comment.replies.push(ReplyEntry::new(replier.id, "hi".to_string()));

        let authors: HashMap<ObjectId, User> = [(author.id, author), (replier.id, replier)]
            .into_iter()
            .collect();

        let response = CommentResponse::with_authors(&comment, &authors);
        assert_eq!(response.user.as_ref().map(|u| u.username.as_str()), Some("alice"));
        assert_eq!(response.replies.len(), 1);
        assert_eq!(
            response.replies[0].user.as_ref().map(|u| u.username.as_str()),
            Some("bob")
        );
    }

    #[test]
    fn unknown_authors_stay_empty() {
        let comment = Comment::new(ObjectId::new(), ObjectId::new(), "orphan".to_string());
        let response = CommentResponse::with_authors(&comment, &HashMap::new());
        assert!(response.user.is_none());
    }
}
