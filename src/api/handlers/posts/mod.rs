//! Post endpoints: creation, listing, details, update, and delete.
//!
//! Visibility and ownership decisions are delegated to
//! [`crate::api::policy`]; a missing post is always a 404 while an existing
//! but hidden post is a 403, and the two are never conflated.

pub mod slug;
pub mod storage;
pub mod topics;
pub mod types;

use crate::api::{
    auth::{optional_user, require_user, AuthConfig},
    error::{ApiError, ErrorBody},
    handlers::{parse_object_id, users, MessageResponse, Pagination},
    models::{Post, Topic, User},
    policy,
};
use axum::{
    extract::{Extension, Path, Query},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use mongodb::{
    bson::{doc, oid::ObjectId, DateTime, Document},
    Database,
};
use std::sync::Arc;
use self::storage::PostInsertOutcome;
use self::types::{
    PostCreateRequest, PostDetailsResponse, PostFilter, PostListItem, PostListResponse,
    PostUpdateRequest, TopicResponse,
};
use crate::api::handlers::users::types::PublicUserResponse;
use tracing::instrument;

const TITLE_MAX_LEN: usize = 255;
const SLUG_MAX_LEN: usize = 160;
const SHORT_DESCRIPTION_LEN: usize = 200;

fn post_not_found() -> ApiError {
    ApiError::not_found("Object not found.")
}

fn future_date_required() -> ApiError {
    ApiError::validation("Please choose future date.", Some("publish_at"))
}

fn title_error() -> ApiError {
    ApiError::validation("Title error", Some("title"))
}

/// Fallback short description: a prefix of the long description.
fn derive_short_description(description: &str) -> String {
    description.chars().take(SHORT_DESCRIPTION_LEN).collect()
}

async fn resolve_topics(
    db: &Database,
    names: &[String],
    user: &User,
) -> Result<Vec<Topic>, ApiError> {
    let mut resolved = Vec::with_capacity(names.len());
    for name in names {
        if let Some(topic) = storage::get_or_create_topic(db, name, user.id).await? {
            resolved.push(topic);
        }
    }
    Ok(resolved)
}

#[utoipa::path(
    post,
    path = "/api/v1/posts",
    request_body = PostCreateRequest,
    responses(
        (status = 201, description = "Post created", body = PostDetailsResponse),
        (status = 400, description = "Invalid title or publish date", body = ErrorBody),
        (status = 401, description = "Not authenticated", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "posts"
)]
#[instrument(skip_all)]
pub async fn create_post(
    headers: HeaderMap,
    db: Extension<Database>,
    config: Extension<Arc<AuthConfig>>,
    Json(payload): Json<PostCreateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = require_user(&headers, &db, &config).await?;

    let title = payload.title.trim().to_string();
    if title.is_empty() || title.len() > TITLE_MAX_LEN {
        return Err(ApiError::validation(
            "Title must be between 1 and 255 characters.",
            Some("title"),
        ));
    }

    let mut publish_at = payload.publish_at.map(DateTime::from_chrono);
    if payload.publish_now {
        publish_at = Some(DateTime::now());
    } else if let Some(at) = publish_at {
        if at < DateTime::now() {
            return Err(future_date_required());
        }
    }

    let short_description = payload
        .short_description
        .clone()
        .filter(|text| !text.is_empty())
        .or_else(|| payload.description.as_deref().map(derive_short_description));

    let topics = resolve_topics(&db, &payload.topics, &user).await?;

    let Some(slug_base) = slug::normalize_slug(&title, 1, SLUG_MAX_LEN) else {
        return Err(title_error());
    };

    let now = DateTime::now();
    let post = Post {
        id: ObjectId::new(),
        author_id: user.id,
        title,
        // Replaced with the first free candidate during insert.
        slug: String::new(),
        short_description,
        description: payload.description,
        cover_image: payload.cover_image,
        publish_at,
        total_comments: 0,
        total_reactions: 0,
        topic_ids: topics.iter().map(|topic| topic.id).collect(),
        created_at: now,
        updated_at: now,
    };

    match storage::insert_post(&db, post, &slug_base).await? {
        PostInsertOutcome::Created(post) => {
            let response = PostDetailsResponse::new(
                &post,
                Some(PublicUserResponse::from(&user)),
                topics.iter().map(TopicResponse::from).collect(),
            );
            Ok((StatusCode::CREATED, Json(response)))
        }
        PostInsertOutcome::SlugExhausted => Err(title_error()),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/posts",
    params(Pagination, PostFilter),
    responses(
        (status = 200, description = "Paginated published posts", body = PostListResponse),
    ),
    tag = "posts"
)]
pub async fn list_posts(
    headers: HeaderMap,
    db: Extension<Database>,
    config: Extension<Arc<AuthConfig>>,
    Query(pagination): Query<Pagination>,
    Query(filter): Query<PostFilter>,
) -> Result<Json<PostListResponse>, ApiError> {
    // Listings only ever contain published posts, but a presented token
    // still has to be valid.
    let _ = optional_user(&headers, &db, &config).await?;

    let offset = pagination.offset()?;
    let mut query: Document = storage::published_filter(DateTime::now());

    if let Some(author_id) = filter.author_id.as_deref() {
        query.insert("author_id", parse_object_id(author_id, "author_id")?);
    }
    if let Some(topics) = filter.topics.as_deref() {
        let topic_ids = topics
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(|id| parse_object_id(id, "topics"))
            .collect::<Result<Vec<_>, _>>()?;
        if !topic_ids.is_empty() {
            query.insert("topic_ids", doc! { "$in": topic_ids });
        }
    }
    if let Some(q) = filter.q.as_deref() {
        query.insert(
            "title",
            doc! { "$regex": regex::escape(q), "$options": "i" },
        );
    }

    let (count, posts) = storage::list_posts(&db, query, offset, pagination.limit).await?;

    let author_ids: Vec<ObjectId> = posts.iter().map(|post| post.author_id).collect();
    let authors = users::storage::find_users_by_ids(&db, &author_ids).await?;

    let results = posts
        .iter()
        .map(|post| {
            PostListItem::new(
                post,
                authors.get(&post.author_id).map(PublicUserResponse::from),
            )
        })
        .collect();

    Ok(Json(PostListResponse { count, results }))
}

#[utoipa::path(
    get,
    path = "/api/v1/posts/{post}",
    params(("post" = String, Path, description = "Post slug")),
    responses(
        (status = 200, description = "Post details", body = PostDetailsResponse),
        (status = 403, description = "Post is not visible to the caller", body = ErrorBody),
        (status = 404, description = "No such post", body = ErrorBody),
    ),
    tag = "posts"
)]
pub async fn get_post(
    headers: HeaderMap,
    db: Extension<Database>,
    config: Extension<Arc<AuthConfig>>,
    Path(slug): Path<String>,
) -> Result<Json<PostDetailsResponse>, ApiError> {
    let actor = optional_user(&headers, &db, &config).await?;

    let post = storage::find_post_by_slug(&db, &slug)
        .await?
        .ok_or_else(post_not_found)?;

    if !policy::can_view_post(&post, actor.as_ref(), DateTime::now()) {
        return Err(ApiError::permission(
            "You don't have permission to get this object.",
        ));
    }

    let authors = users::storage::find_users_by_ids(&db, &[post.author_id]).await?;
    let topics = storage::find_topics_by_ids(&db, &post.topic_ids).await?;

    Ok(Json(PostDetailsResponse::new(
        &post,
        authors.get(&post.author_id).map(PublicUserResponse::from),
        topics.iter().map(TopicResponse::from).collect(),
    )))
}

#[utoipa::path(
    patch,
    path = "/api/v1/posts/{post}",
    params(("post" = String, Path, description = "Post slug")),
    request_body = PostUpdateRequest,
    responses(
        (status = 200, description = "Post updated", body = MessageResponse),
        (status = 403, description = "Not the author", body = ErrorBody),
        (status = 404, description = "No such post", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "posts"
)]
#[instrument(skip_all, fields(slug = %slug))]
pub async fn update_post(
    headers: HeaderMap,
    db: Extension<Database>,
    config: Extension<Arc<AuthConfig>>,
    Path(slug): Path<String>,
    Json(payload): Json<PostUpdateRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let user = require_user(&headers, &db, &config).await?;

    let post = storage::find_post_by_slug(&db, &slug)
        .await?
        .ok_or_else(post_not_found)?;

    if !policy::can_modify_post(&post, &user) {
        return Err(ApiError::permission(
            "You don't have access to update this post.",
        ));
    }

    let mut publish_at = payload.publish_at.map(DateTime::from_chrono);
    if payload.publish_now {
        publish_at = Some(DateTime::now());
    } else if let Some(at) = publish_at {
        // Moving the publish time only accepts future dates.
        if post.publish_at != Some(at) && at < DateTime::now() {
            return Err(future_date_required());
        }
    }

    let mut set = doc! { "updated_at": DateTime::now() };

    if let Some(title) = payload.title.as_deref() {
        let title = title.trim();
        if title.is_empty() || title.len() > TITLE_MAX_LEN {
            return Err(ApiError::validation(
                "Title must be between 1 and 255 characters.",
                Some("title"),
            ));
        }
        set.insert("title", title);
    }
    if let Some(short_description) = payload
        .short_description
        .clone()
        .filter(|text| !text.is_empty())
        .or_else(|| payload.description.as_deref().map(derive_short_description))
    {
        set.insert("short_description", short_description);
    }
    if let Some(description) = payload.description.as_deref() {
        set.insert("description", description);
    }
    if let Some(cover_image) = payload.cover_image.as_deref() {
        set.insert("cover_image", cover_image);
    }
    if let Some(at) = publish_at {
        set.insert("publish_at", at);
    }
    if let Some(names) = payload.topics.as_deref() {
        let topics = resolve_topics(&db, names, &user).await?;
        let topic_ids: Vec<ObjectId> = topics.iter().map(|topic| topic.id).collect();
        set.insert("topic_ids", topic_ids);
    }

    storage::update_post(&db, post.id, set).await?;

    Ok(Json(MessageResponse::new("Post Updated")))
}

#[utoipa::path(
    delete,
    path = "/api/v1/posts/{post}",
    params(("post" = String, Path, description = "Post slug")),
    responses(
        (status = 200, description = "Post and its comments/reactions deleted", body = MessageResponse),
        (status = 403, description = "Not the author", body = ErrorBody),
        (status = 404, description = "No such post", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "posts"
)]
#[instrument(skip_all, fields(slug = %slug))]
pub async fn delete_post(
    headers: HeaderMap,
    db: Extension<Database>,
    config: Extension<Arc<AuthConfig>>,
    Path(slug): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let user = require_user(&headers, &db, &config).await?;

    let post = storage::find_post_by_slug(&db, &slug)
        .await?
        .ok_or_else(post_not_found)?;

    if !policy::can_modify_post(&post, &user) {
        return Err(ApiError::permission(
            "You don't have access to delete this post.",
        ));
    }

    storage::delete_post_cascade(&db, post.id).await?;

    Ok(Json(MessageResponse::new("Deleted")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_description_is_a_prefix() {
        let description = "a".repeat(500);
        let short = derive_short_description(&description);
        assert_eq!(short.len(), SHORT_DESCRIPTION_LEN);

        assert_eq!(derive_short_description("tiny"), "tiny");
    }

    #[test]
    fn short_description_respects_char_boundaries() {
        let description = "é".repeat(300);
        let short = derive_short_description(&description);
        assert_eq!(short.chars().count(), SHORT_DESCRIPTION_LEN);
    }
}
