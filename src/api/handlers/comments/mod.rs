//! Comment and reply endpoints.
//!
//! Replies are embedded in their comment document; the reply cap is enforced
//! inside the conditional update, not by a read-then-write check.

pub mod storage;
pub mod types;

use self::types::{
    CommentListResponse, CommentRequest, CommentResponse, ReplyRequest, ReplyResponse,
};
use crate::api::{
    auth::{optional_user, require_user, AuthConfig},
    error::{ApiError, ErrorBody},
    handlers::{
        parse_object_id, posts, users, MessageResponse, Pagination,
    },
    models::{Comment, ReplyEntry, User},
    policy::{self, PolicyLimits},
};
use axum::{
    extract::{Extension, Path, Query},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use crate::api::handlers::users::types::PublicUserResponse;
use mongodb::{bson::oid::ObjectId, Database};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::instrument;

fn object_not_found() -> ApiError {
    ApiError::not_found("Object not found.")
}

async fn require_post(db: &Database, post_id: ObjectId) -> Result<(), ApiError> {
    posts::storage::find_post_by_id(db, post_id)
        .await?
        .map(|_| ())
        .ok_or_else(object_not_found)
}

async fn require_comment(
    db: &Database,
    comment_id: ObjectId,
    post_id: ObjectId,
) -> Result<Comment, ApiError> {
    storage::find_comment(db, comment_id, post_id)
        .await?
        .ok_or_else(object_not_found)
}

fn single_author_map(user: &User) -> HashMap<ObjectId, User> {
    HashMap::from([(user.id, user.clone())])
}

#[utoipa::path(
    post,
    path = "/api/v1/posts/{post}/comments",
    params(("post" = String, Path, description = "Post id")),
    request_body = CommentRequest,
    responses(
        (status = 201, description = "Comment created", body = CommentResponse),
        (status = 401, description = "Not authenticated", body = ErrorBody),
        (status = 404, description = "No such post", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "comments"
)]
#[instrument(skip_all, fields(post_id = %post_id))]
pub async fn create_comment(
    headers: HeaderMap,
    db: Extension<Database>,
    config: Extension<Arc<AuthConfig>>,
    Path(post_id): Path<String>,
    Json(payload): Json<CommentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = require_user(&headers, &db, &config).await?;
    let post_id = parse_object_id(&post_id, "post_id")?;
    require_post(&db, post_id).await?;

    let comment = Comment::new(user.id, post_id, payload.description);
    storage::insert_comment(&db, &comment).await?;
    posts::storage::inc_total_comments(&db, post_id, 1).await?;

    let response = CommentResponse::with_authors(&comment, &single_author_map(&user));
    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    get,
    path = "/api/v1/posts/{post}/comments",
    params(("post" = String, Path, description = "Post id"), Pagination),
    responses(
        (status = 200, description = "Paginated comments with embedded replies", body = CommentListResponse),
    ),
    tag = "comments"
)]
pub async fn list_comments(
    headers: HeaderMap,
    db: Extension<Database>,
    config: Extension<Arc<AuthConfig>>,
    Path(post_id): Path<String>,
    Query(pagination): Query<Pagination>,
) -> Result<Json<CommentListResponse>, ApiError> {
    let _ = optional_user(&headers, &db, &config).await?;
    let post_id = parse_object_id(&post_id, "post_id")?;

    let offset = pagination.offset()?;
    let (count, comments) = storage::list_comments(&db, post_id, offset, pagination.limit).await?;

    // One batch lookup for every comment and reply author on the page.
    let mut author_ids: Vec<ObjectId> = Vec::new();
    for comment in &comments {
        author_ids.push(comment.user_id);
        author_ids.extend(comment.replies.iter().map(|reply| reply.user_id));
    }
    author_ids.sort_unstable();
    author_ids.dedup();

    let authors = users::storage::find_users_by_ids(&db, &author_ids).await?;

    let results = comments
        .iter()
        .map(|comment| CommentResponse::with_authors(comment, &authors))
        .collect();

    Ok(Json(CommentListResponse { count, results }))
}

#[utoipa::path(
    put,
    path = "/api/v1/posts/{post}/comments/{comment_id}",
    params(
        ("post" = String, Path, description = "Post id"),
        ("comment_id" = String, Path, description = "Comment id"),
    ),
    request_body = CommentRequest,
    responses(
        (status = 200, description = "Comment updated", body = CommentResponse),
        (status = 403, description = "Not the comment's author", body = ErrorBody),
        (status = 404, description = "No such comment", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "comments"
)]
#[instrument(skip_all, fields(post_id = %post_id, comment_id = %comment_id))]
pub async fn update_comment(
    headers: HeaderMap,
    db: Extension<Database>,
    config: Extension<Arc<AuthConfig>>,
    Path((post_id, comment_id)): Path<(String, String)>,
    Json(payload): Json<CommentRequest>,
) -> Result<Json<CommentResponse>, ApiError> {
    let user = require_user(&headers, &db, &config).await?;
    let post_id = parse_object_id(&post_id, "post_id")?;
    let comment_id = parse_object_id(&comment_id, "comment_id")?;

    let mut comment = require_comment(&db, comment_id, post_id).await?;
    if !policy::can_modify_comment(&comment, &user) {
        return Err(ApiError::permission(
            "You don't have access to update this comment.",
        ));
    }

    storage::set_description(&db, comment.id, &payload.description).await?;
    comment.description = payload.description;

    // Reply authors still resolve; only the comment author is guaranteed
    // to be the caller here.
    let mut author_ids: Vec<ObjectId> = comment.replies.iter().map(|reply| reply.user_id).collect();
    author_ids.push(user.id);
    author_ids.sort_unstable();
    author_ids.dedup();
    let authors = users::storage::find_users_by_ids(&db, &author_ids).await?;

    Ok(Json(CommentResponse::with_authors(&comment, &authors)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/posts/{post}/comments/{comment_id}",
    params(
        ("post" = String, Path, description = "Post id"),
        ("comment_id" = String, Path, description = "Comment id"),
    ),
    responses(
        (status = 200, description = "Comment deleted", body = MessageResponse),
        (status = 403, description = "Not the comment's author", body = ErrorBody),
        (status = 404, description = "No such comment", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "comments"
)]
#[instrument(skip_all, fields(post_id = %post_id, comment_id = %comment_id))]
pub async fn delete_comment(
    headers: HeaderMap,
    db: Extension<Database>,
    config: Extension<Arc<AuthConfig>>,
    Path((post_id, comment_id)): Path<(String, String)>,
) -> Result<Json<MessageResponse>, ApiError> {
    let user = require_user(&headers, &db, &config).await?;
    let post_id = parse_object_id(&post_id, "post_id")?;
    let comment_id = parse_object_id(&comment_id, "comment_id")?;

    let comment = require_comment(&db, comment_id, post_id).await?;
    if !policy::can_modify_comment(&comment, &user) {
        return Err(ApiError::permission(
            "You don't have access to delete this comment.",
        ));
    }

    storage::delete_comment(&db, comment.id).await?;
    posts::storage::inc_total_comments(&db, post_id, -1).await?;

    Ok(Json(MessageResponse::new("Deleted")))
}

#[utoipa::path(
    post,
    path = "/api/v1/posts/{post}/comments/{comment_id}/replies",
    params(
        ("post" = String, Path, description = "Post id"),
        ("comment_id" = String, Path, description = "Comment id"),
    ),
    request_body = ReplyRequest,
    responses(
        (status = 201, description = "Reply appended", body = ReplyResponse),
        (status = 400, description = "Reply cap reached", body = ErrorBody),
        (status = 404, description = "No such comment", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "comments"
)]
#[instrument(skip_all, fields(post_id = %post_id, comment_id = %comment_id))]
pub async fn create_reply(
    headers: HeaderMap,
    db: Extension<Database>,
    config: Extension<Arc<AuthConfig>>,
    limits: Extension<PolicyLimits>,
    Path((post_id, comment_id)): Path<(String, String)>,
    Json(payload): Json<ReplyRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = require_user(&headers, &db, &config).await?;
    let post_id = parse_object_id(&post_id, "post_id")?;
    let comment_id = parse_object_id(&comment_id, "comment_id")?;

    require_comment(&db, comment_id, post_id).await?;

    let reply = ReplyEntry::new(user.id, payload.description);
    let appended = storage::push_reply_below_cap(
        &db,
        comment_id,
        post_id,
        &reply,
        &limits.reply_guard_key(),
    )
    .await?;

    if !appended {
        return Err(ApiError::validation(
            "Comment has reached the reply limit.",
            Some("replies"),
        ));
    }

    let response = ReplyResponse::new(&reply, Some(PublicUserResponse::from(&user)));
    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    put,
    path = "/api/v1/posts/{post}/comments/{comment_id}/replies/{reply_id}",
    params(
        ("post" = String, Path, description = "Post id"),
        ("comment_id" = String, Path, description = "Comment id"),
        ("reply_id" = String, Path, description = "Reply id"),
    ),
    request_body = ReplyRequest,
    responses(
        (status = 200, description = "Reply updated", body = MessageResponse),
        (status = 403, description = "Not the reply's author", body = ErrorBody),
        (status = 404, description = "No such reply", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "comments"
)]
#[instrument(skip_all, fields(post_id = %post_id, comment_id = %comment_id, reply_id = %reply_id))]
pub async fn update_reply(
    headers: HeaderMap,
    db: Extension<Database>,
    config: Extension<Arc<AuthConfig>>,
    Path((post_id, comment_id, reply_id)): Path<(String, String, String)>,
    Json(payload): Json<ReplyRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let user = require_user(&headers, &db, &config).await?;
    let post_id = parse_object_id(&post_id, "post_id")?;
    let comment_id = parse_object_id(&comment_id, "comment_id")?;
    let reply_id = parse_object_id(&reply_id, "reply_id")?;

    let comment = require_comment(&db, comment_id, post_id).await?;
    if !comment.replies.iter().any(|reply| reply.id == reply_id) {
        return Err(object_not_found());
    }

    let updated = storage::update_owned_reply(
        &db,
        comment_id,
        post_id,
        reply_id,
        user.id,
        &payload.description,
    )
    .await?;

    if !updated {
        return Err(ApiError::permission(
            "You don't have permission to update this reply.",
        ));
    }

    Ok(Json(MessageResponse::new("Updated")))
}

#[utoipa::path(
    delete,
    path = "/api/v1/posts/{post}/comments/{comment_id}/replies/{reply_id}",
    params(
        ("post" = String, Path, description = "Post id"),
        ("comment_id" = String, Path, description = "Comment id"),
        ("reply_id" = String, Path, description = "Reply id"),
    ),
    responses(
        (status = 200, description = "Reply removed", body = MessageResponse),
        (status = 403, description = "Not the reply's author", body = ErrorBody),
        (status = 404, description = "No such reply", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "comments"
)]
#[instrument(skip_all, fields(post_id = %post_id, comment_id = %comment_id, reply_id = %reply_id))]
pub async fn delete_reply(
    headers: HeaderMap,
    db: Extension<Database>,
    config: Extension<Arc<AuthConfig>>,
    Path((post_id, comment_id, reply_id)): Path<(String, String, String)>,
) -> Result<Json<MessageResponse>, ApiError> {
    let user = require_user(&headers, &db, &config).await?;
    let post_id = parse_object_id(&post_id, "post_id")?;
    let comment_id = parse_object_id(&comment_id, "comment_id")?;
    let reply_id = parse_object_id(&reply_id, "reply_id")?;

    let comment = require_comment(&db, comment_id, post_id).await?;
    if !comment.replies.iter().any(|reply| reply.id == reply_id) {
        return Err(object_not_found());
    }

    let removed =
        storage::pull_owned_reply(&db, comment_id, post_id, reply_id, user.id).await?;

    if !removed {
        return Err(ApiError::permission(
            "You don't have permission to delete this reply.",
        ));
    }

    Ok(Json(MessageResponse::new("Deleted")))
}
