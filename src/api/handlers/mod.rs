//! API handlers and shared helpers.
//!
//! Handlers resolve the acting identity through the auth guard first, then
//! consult the ownership policy before mutating anything. Validation and
//! id-parsing helpers used by more than one handler family live here.

pub mod comments;
pub mod health;
pub mod posts;
pub mod reactions;
pub mod root;
pub mod users;

use crate::api::error::ApiError;
use mongodb::bson::oid::ObjectId;
use mongodb::error::{ErrorKind, WriteFailure};
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

pub const MAX_PAGE_LIMIT: i64 = 100;

/// Usernames are URL-safe handles.
pub fn valid_username(username: &str) -> bool {
    Regex::new(r"^[A-Za-z0-9_.-]{3,64}$").is_ok_and(|re| re.is_match(username))
}

/// Parse a path/query `ObjectId`, blaming the given field on failure.
pub(crate) fn parse_object_id(value: &str, field: &str) -> Result<ObjectId, ApiError> {
    ObjectId::parse_str(value)
        .map_err(|_| ApiError::validation("Invalid object id.", Some(field)))
}

/// Mongo duplicate-key errors signal unique-index conflicts (code 11000).
pub(crate) fn is_duplicate_key_error(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => write_error.code == 11000,
        ErrorKind::Command(command_error) => command_error.code == 11000,
        _ => false,
    }
}

/// `page`/`limit` pagination with the limit bounded to 1..=100.
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct Pagination {
    /// 1-based page number.
    #[serde(default = "default_page")]
    pub page: u64,
    /// Page size, between 1 and 100.
    #[serde(default = "default_limit")]
    pub limit: i64,
}

const fn default_page() -> u64 {
    1
}

const fn default_limit() -> i64 {
    20
}

impl Pagination {
    /// Number of documents to skip.
    ///
    /// # Errors
    ///
    /// Fails with a validation error when the limit is out of bounds.
    pub fn offset(&self) -> Result<u64, ApiError> {
        if !(1..=MAX_PAGE_LIMIT).contains(&self.limit) {
            return Err(ApiError::validation(
                "Pagination limit must be between 1 and 100.",
                Some("limit"),
            ));
        }
        let page = self.page.max(1);
        #[allow(clippy::cast_sign_loss)]
        Ok((page - 1) * self.limit as u64)
    }
}

/// Plain `{"message": …}` acknowledgement used by mutation endpoints.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_username_accepts_handles() {
        assert!(valid_username("alice"));
        assert!(valid_username("alice.bob-99_x"));
    }

    #[test]
    fn valid_username_rejects_bad_input() {
        assert!(!valid_username("ab"));
        assert!(!valid_username("has space"));
        assert!(!valid_username("sneaky/slash"));
        assert!(!valid_username(&"a".repeat(65)));
    }

    #[test]
    fn pagination_defaults() {
        let pagination: Pagination = serde_json::from_str("{}").expect("defaults");
        assert_eq!(pagination.page, 1);
        assert_eq!(pagination.limit, 20);
        assert_eq!(pagination.offset().expect("offset"), 0);
    }

    #[test]
    fn pagination_offset_math() {
        let pagination = Pagination { page: 3, limit: 20 };
        assert_eq!(pagination.offset().expect("offset"), 40);

        // Page 0 is treated as page 1
        let pagination = Pagination { page: 0, limit: 10 };
        assert_eq!(pagination.offset().expect("offset"), 0);
    }

    #[test]
    fn pagination_rejects_out_of_range_limits() {
        let pagination = Pagination { page: 1, limit: 0 };
        assert!(pagination.offset().is_err());

        let pagination = Pagination {
            page: 1,
            limit: 101,
        };
        assert!(pagination.offset().is_err());
    }

    #[test]
    fn parse_object_id_blames_the_field() {
        let err = parse_object_id("nope", "post_id").expect_err("invalid");
        assert_eq!(err.field.as_deref(), Some("post_id"));

        let id = ObjectId::new();
        assert_eq!(parse_object_id(&id.to_hex(), "post_id").expect("valid"), id);
    }
}
