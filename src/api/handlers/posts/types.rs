//! Request/response types for post and topic endpoints.

use crate::api::{
    handlers::users::types::PublicUserResponse,
    models::{Post, Topic},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct TopicRequest {
    pub name: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct TopicResponse {
    pub id: String,
    pub name: String,
    pub slug: String,
}

impl From<&Topic> for TopicResponse {
    fn from(topic: &Topic) -> Self {
        Self {
            id: topic.id.to_hex(),
            name: topic.name.clone(),
            slug: topic.slug.clone(),
        }
    }
}

/// Filter for the topic listing, on top of pagination.
#[derive(Debug, Deserialize, IntoParams, Default)]
#[into_params(parameter_in = Query)]
pub struct TopicFilter {
    /// Case-insensitive name search.
    pub q: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct TopicListResponse {
    pub count: u64,
    pub results: Vec<TopicResponse>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct PostCreateRequest {
    pub title: String,
    #[serde(default)]
    pub short_description: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub publish_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub publish_now: bool,
    #[serde(default)]
    pub topics: Vec<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Default)]
pub struct PostUpdateRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub short_description: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub publish_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub publish_now: bool,
    #[serde(default)]
    pub topics: Option<Vec<String>>,
}

/// Filters for the public post listing, on top of pagination.
#[derive(Debug, Deserialize, IntoParams, Default)]
#[into_params(parameter_in = Query)]
pub struct PostFilter {
    /// Case-insensitive title search.
    pub q: Option<String>,
    /// Restrict to one author (hex user id).
    pub author_id: Option<String>,
    /// Comma-separated topic ids.
    pub topics: Option<String>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct PostListItem {
    pub id: String,
    pub author: Option<PublicUserResponse>,
    pub title: String,
    pub slug: String,
    pub short_description: Option<String>,
    pub cover_image: Option<String>,
    pub publish_at: Option<DateTime<Utc>>,
    pub total_comments: i64,
    pub total_reactions: i64,
}

impl PostListItem {
    pub(super) fn new(post: &Post, author: Option<PublicUserResponse>) -> Self {
        Self {
            id: post.id.to_hex(),
            author,
            title: post.title.clone(),
            slug: post.slug.clone(),
            short_description: post.short_description.clone(),
            cover_image: post.cover_image.clone(),
            publish_at: post.publish_at.map(mongodb::bson::DateTime::to_chrono),
            total_comments: post.total_comments,
            total_reactions: post.total_reactions,
        }
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct PostListResponse {
    pub count: u64,
    pub results: Vec<PostListItem>,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct PostDetailsResponse {
    pub id: String,
    pub author: Option<PublicUserResponse>,
    pub title: String,
    pub slug: String,
    pub short_description: Option<String>,
    pub description: Option<String>,
    pub cover_image: Option<String>,
    pub publish_at: Option<DateTime<Utc>>,
    pub total_comments: i64,
    pub total_reactions: i64,
    pub topics: Vec<TopicResponse>,
}

impl PostDetailsResponse {
    pub(super) fn new(
        post: &Post,
        author: Option<PublicUserResponse>,
        topics: Vec<TopicResponse>,
    ) -> Self {
        Self {
            id: post.id.to_hex(),
            author,
            title: post.title.clone(),
            slug: post.slug.clone(),
            short_description: post.short_description.clone(),
            description: post.description.clone(),
            cover_image: post.cover_image.clone(),
            publish_at: post.publish_at.map(mongodb::bson::DateTime::to_chrono),
            total_comments: post.total_comments,
            total_reactions: post.total_reactions,
            topics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_defaults() {
        let request: PostCreateRequest =
            serde_json::from_str(r#"{"title": "Hello"}"#).expect("deserialize");
        assert_eq!(request.title, "Hello");
        assert!(!request.publish_now);
        assert!(request.publish_at.is_none());
        assert!(request.topics.is_empty());
    }

    #[test]
    fn update_request_distinguishes_absent_topics_from_empty() {
        let request: PostUpdateRequest = serde_json::from_str("{}").expect("deserialize");
        assert!(request.topics.is_none());

        let request: PostUpdateRequest =
            serde_json::from_str(r#"{"topics": []}"#).expect("deserialize");
        assert_eq!(request.topics.as_deref(), Some(&[][..]));
    }

    #[test]
    fn publish_at_parses_rfc3339() {
        let request: PostCreateRequest =
            serde_json::from_str(r#"{"title": "t", "publish_at": "2030-01-02T03:04:05Z"}"#)
                .expect("deserialize");
        let publish_at = request.publish_at.expect("publish_at");
        assert_eq!(publish_at.timestamp(), 1_893_553_445);
    }
}
