//! Reaction endpoints.
//!
//! A user reacts to a post at most once; the reacting-user set is capped and
//! the cap is enforced inside a single conditional upsert so two concurrent
//! requests can never push the set past the limit.

pub mod storage;

use self::storage::ReactionAddOutcome;
use crate::api::{
    auth::{require_user, AuthConfig},
    error::{ApiError, ErrorBody},
    handlers::{parse_object_id, posts, MessageResponse},
    policy::PolicyLimits,
};
use axum::{
    extract::{Extension, Path},
    http::HeaderMap,
    Json,
};
use mongodb::{bson::oid::ObjectId, Database};
use std::sync::Arc;
use tracing::instrument;

async fn require_post(db: &Database, post_id: ObjectId) -> Result<(), ApiError> {
    posts::storage::find_post_by_id(db, post_id)
        .await?
        .map(|_| ())
        .ok_or_else(|| ApiError::not_found("Object not found."))
}

#[utoipa::path(
    post,
    path = "/api/v1/posts/{post}/reactions",
    params(("post" = String, Path, description = "Post id")),
    responses(
        (status = 200, description = "Reaction added (or already present)", body = MessageResponse),
        (status = 400, description = "Reaction cap reached", body = ErrorBody),
        (status = 401, description = "Not authenticated", body = ErrorBody),
        (status = 404, description = "No such post", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "reactions"
)]
#[instrument(skip_all, fields(post_id = %post_id))]
pub async fn create_reaction(
    headers: HeaderMap,
    db: Extension<Database>,
    config: Extension<Arc<AuthConfig>>,
    limits: Extension<PolicyLimits>,
    Path(post_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let user = require_user(&headers, &db, &config).await?;
    let post_id = parse_object_id(&post_id, "post_id")?;
    require_post(&db, post_id).await?;

    let outcome =
        storage::add_reaction(&db, post_id, user.id, &limits.reaction_guard_key()).await?;

    match outcome {
        ReactionAddOutcome::Added => {
            posts::storage::inc_total_reactions(&db, post_id, 1).await?;
            Ok(Json(MessageResponse::new("Reaction Added")))
        }
        // Not an error: reacting twice is a no-op.
        ReactionAddOutcome::AlreadyReacted => {
            Ok(Json(MessageResponse::new("Already reacted")))
        }
        ReactionAddOutcome::CapReached => Err(ApiError::validation(
            "Post has reached the reaction limit.",
            Some("reactions"),
        )),
    }
}

#[utoipa::path(
    delete,
    path = "/api/v1/posts/{post}/reactions",
    params(("post" = String, Path, description = "Post id")),
    responses(
        (status = 200, description = "Reaction removed if present", body = MessageResponse),
        (status = 401, description = "Not authenticated", body = ErrorBody),
        (status = 404, description = "No such post", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "reactions"
)]
#[instrument(skip_all, fields(post_id = %post_id))]
pub async fn delete_reaction(
    headers: HeaderMap,
    db: Extension<Database>,
    config: Extension<Arc<AuthConfig>>,
    Path(post_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let user = require_user(&headers, &db, &config).await?;
    let post_id = parse_object_id(&post_id, "post_id")?;
    require_post(&db, post_id).await?;

    if storage::remove_reaction(&db, post_id, user.id).await? {
        posts::storage::inc_total_reactions(&db, post_id, -1).await?;
    }

    Ok(Json(MessageResponse::new("Reaction Deleted")))
}
