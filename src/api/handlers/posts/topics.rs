//! Topic endpoints: explicit creation and the public listing.
//!
//! Topics are also created implicitly when a post references them; both
//! paths share [`super::storage::get_or_create_topic`].

use super::{
    storage::{self, TOPIC_NAME_MAX_LEN},
    types::{TopicFilter, TopicListResponse, TopicRequest, TopicResponse},
};
use crate::api::{
    auth::{optional_user, require_user, AuthConfig},
    error::{ApiError, ErrorBody},
    handlers::Pagination,
};
use axum::{
    extract::{Extension, Query},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use mongodb::Database;
use std::sync::Arc;
use tracing::instrument;

#[utoipa::path(
    post,
    path = "/api/v1/topics",
    request_body = TopicRequest,
    responses(
        (status = 201, description = "Topic found or created", body = TopicResponse),
        (status = 400, description = "Invalid topic name", body = ErrorBody),
        (status = 401, description = "Not authenticated", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "topics"
)]
#[instrument(skip_all)]
pub async fn create_topic(
    headers: HeaderMap,
    db: Extension<Database>,
    config: Extension<Arc<AuthConfig>>,
    Json(payload): Json<TopicRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = require_user(&headers, &db, &config).await?;

    let name = payload.name.trim();
    if name.is_empty() || name.len() > TOPIC_NAME_MAX_LEN {
        return Err(ApiError::validation(
            "Topic name must be between 1 and 127 characters.",
            Some("name"),
        ));
    }

    let Some(topic) = storage::get_or_create_topic(&db, name, user.id).await? else {
        return Err(ApiError::validation("Invalid topic name.", Some("name")));
    };

    Ok((StatusCode::CREATED, Json(TopicResponse::from(&topic))))
}

#[utoipa::path(
    get,
    path = "/api/v1/topics",
    params(Pagination, TopicFilter),
    responses(
        (status = 200, description = "Paginated topics", body = TopicListResponse),
    ),
    tag = "topics"
)]
pub async fn list_topics(
    headers: HeaderMap,
    db: Extension<Database>,
    config: Extension<Arc<AuthConfig>>,
    Query(pagination): Query<Pagination>,
    Query(filter): Query<TopicFilter>,
) -> Result<Json<TopicListResponse>, ApiError> {
    // Anonymous access is fine, but a presented token still has to be valid.
    let _ = optional_user(&headers, &db, &config).await?;

    let offset = pagination.offset()?;
    let (count, topics) =
        storage::list_topics(&db, filter.q.as_deref(), offset, pagination.limit).await?;

    Ok(Json(TopicListResponse {
        count,
        results: topics.iter().map(TopicResponse::from).collect(),
    }))
}
