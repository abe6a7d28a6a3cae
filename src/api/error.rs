//! Error taxonomy shared by every handler.
//!
//! Storage and auth code never speak HTTP; they produce an [`ApiError`] (or
//! an `anyhow::Error` that becomes one) and the response mapping lives here.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use utoipa::ToSchema;

/// Stable error codes exposed to API clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    AuthenticationError,
    PermissionError,
    ObjectNotFound,
    ValidationError,
    UsernameExists,
    InternalServerError,
}

impl ErrorCode {
    const fn status(self) -> StatusCode {
        match self {
            Self::AuthenticationError => StatusCode::UNAUTHORIZED,
            Self::PermissionError => StatusCode::FORBIDDEN,
            Self::ObjectNotFound => StatusCode::NOT_FOUND,
            Self::ValidationError => StatusCode::BAD_REQUEST,
            Self::UsernameExists => StatusCode::CONFLICT,
            Self::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Terminal request failure carrying the taxonomy code and a client-safe detail.
#[derive(Debug, Error)]
#[error("{detail}")]
pub struct ApiError {
    pub code: ErrorCode,
    pub detail: String,
    pub field: Option<String>,
}

/// Wire shape of an error response.
#[derive(Serialize, ToSchema)]
pub struct ErrorBody {
    pub code: ErrorCode,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ApiError {
    pub fn authentication(detail: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::AuthenticationError,
            detail: detail.into(),
            field: None,
        }
    }

    pub fn permission(detail: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::PermissionError,
            detail: detail.into(),
            field: None,
        }
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::ObjectNotFound,
            detail: detail.into(),
            field: None,
        }
    }

    pub fn validation(detail: impl Into<String>, field: Option<&str>) -> Self {
        Self {
            code: ErrorCode::ValidationError,
            detail: detail.into(),
            field: field.map(str::to_string),
        }
    }

    pub fn username_exists() -> Self {
        Self {
            code: ErrorCode::UsernameExists,
            detail: "Username already exists.".to_string(),
            field: Some("username".to_string()),
        }
    }

    /// Unexpected failure: the cause is logged, the client sees a generic message.
    pub fn internal() -> Self {
        Self {
            code: ErrorCode::InternalServerError,
            detail: "Internal server error. Try later.".to_string(),
            field: None,
        }
    }

    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.code.status()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        error!("Unhandled error: {err:#}");
        Self::internal()
    }
}

impl From<mongodb::error::Error> for ApiError {
    fn from(err: mongodb::error::Error) -> Self {
        error!("Database error: {err}");
        Self::internal()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            code: self.code,
            detail: self.detail,
            field: self.field,
        };
        (self.code.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_map_to_statuses() {
        assert_eq!(
            ErrorCode::AuthenticationError.status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ErrorCode::PermissionError.status(), StatusCode::FORBIDDEN);
        assert_eq!(ErrorCode::ObjectNotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::ValidationError.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::UsernameExists.status(), StatusCode::CONFLICT);
        assert_eq!(
            ErrorCode::InternalServerError.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn codes_serialize_screaming_snake() {
        let value = serde_json::to_value(ErrorCode::AuthenticationError).expect("serialize");
        assert_eq!(value, "AUTHENTICATION_ERROR");
        let value = serde_json::to_value(ErrorCode::ObjectNotFound).expect("serialize");
        assert_eq!(value, "OBJECT_NOT_FOUND");
    }

    #[test]
    fn validation_error_carries_field() {
        let err = ApiError::validation("Please choose future date.", Some("publish_at"));
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.field.as_deref(), Some("publish_at"));
    }

    #[test]
    fn internal_error_hides_cause() {
        let err = ApiError::from(anyhow::anyhow!("connection reset by peer"));
        assert_eq!(err.code, ErrorCode::InternalServerError);
        assert!(!err.detail.contains("connection"));
    }

    #[test]
    fn error_body_skips_missing_field() {
        let err = ApiError::authentication("Could not validate credentials");
        let body = ErrorBody {
            code: err.code,
            detail: err.detail,
            field: err.field,
        };
        let value = serde_json::to_value(&body).expect("serialize");
        assert_eq!(value["code"], "AUTHENTICATION_ERROR");
        assert!(value.get("field").is_none());
    }
}
