//! Request guards resolving a bearer token to an acting user.

use super::{
    state::AuthConfig,
    token::{self, TokenKind},
};
use crate::api::{error::ApiError, models::User};
use axum::http::{header::AUTHORIZATION, HeaderMap};
use mongodb::{
    bson::{doc, oid::ObjectId},
    Database,
};

fn credentials_error() -> ApiError {
    ApiError::authentication("Could not validate credentials")
}

/// Pull the token out of `Authorization: Bearer <token>`.
pub(crate) fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let trimmed = value.trim();
    let token = trimmed
        .strip_prefix("Bearer ")
        .or_else(|| trimmed.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Extract and decode the bearer token, requiring kind ACCESS.
///
/// The session epoch embedded in the returned claims is still unchecked;
/// [`require_user`] verifies it against the user document.
///
/// # Errors
///
/// Fails with an authentication error on a missing/malformed header, a
/// token that does not decode, or a refresh token where an access token is
/// required.
pub(crate) fn access_claims(
    headers: &HeaderMap,
    config: &AuthConfig,
) -> Result<token::TokenClaims, ApiError> {
    let token = extract_bearer_token(headers).ok_or_else(credentials_error)?;

    let claims = token::decode(config, &token)?;
    if claims.token_type != TokenKind::Access {
        return Err(credentials_error());
    }
    Ok(claims)
}

/// Resolve the request's bearer token to a user or fail with 401.
///
/// The token must decode, be of kind ACCESS, and resolve a user whose
/// current session epoch matches the one embedded in the token; the latter
/// covers both "user deleted" and "logged out everywhere".
///
/// # Errors
///
/// Fails with an authentication error when any of those conditions fail.
pub async fn require_user(
    headers: &HeaderMap,
    db: &Database,
    config: &AuthConfig,
) -> Result<User, ApiError> {
    let claims = access_claims(headers, config)?;

    let user_id = ObjectId::parse_str(&claims.id).map_err(|_| credentials_error())?;
    User::collection(db)
        .find_one(doc! { "_id": user_id, "random_str": &claims.random_str })
        .await?
        .ok_or_else(credentials_error)
}

/// Like [`require_user`], but a request without an `Authorization` header
/// proceeds with no identity. A header that is present but invalid still
/// fails; a bad token is never silently ignored.
///
/// # Errors
///
/// Fails with an authentication error when a presented token is invalid.
pub async fn optional_user(
    headers: &HeaderMap,
    db: &Database,
    config: &AuthConfig,
) -> Result<Option<User>, ApiError> {
    if headers.get(AUTHORIZATION).is_none() {
        return Ok(None);
    }

    require_user(headers, db, config).await.map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::error::ErrorCode;
    use axum::http::HeaderValue;
    use secrecy::SecretString;

    fn test_config() -> AuthConfig {
        AuthConfig::new(SecretString::from("test-secret".to_string()), "HS256").expect("config")
    }

    fn bearer_headers(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).expect("header"),
        );
        headers
    }

    #[test]
    fn access_claims_accepts_access_tokens_only() {
        let config = test_config();
        let user = User::new("alice".to_string(), "Alice".to_string(), None);

        let access = token::issue_access(&config, &user).expect("issue");
        let claims = access_claims(&bearer_headers(&access), &config).expect("claims");
        assert_eq!(claims.id, user.id.to_hex());
        assert_eq!(claims.random_str, user.random_str);

        // A refresh token is never a substitute for an access token.
        let refresh = token::issue_refresh(&config, &user).expect("issue");
        let err = access_claims(&bearer_headers(&refresh), &config).expect_err("kind mismatch");
        assert_eq!(err.code, ErrorCode::AuthenticationError);
    }

    #[test]
    fn access_claims_rejects_missing_and_garbage_headers() {
        let config = test_config();

        let err = access_claims(&HeaderMap::new(), &config).expect_err("missing");
        assert_eq!(err.code, ErrorCode::AuthenticationError);

        let err = access_claims(&bearer_headers("not-a-token"), &config).expect_err("garbage");
        assert_eq!(err.code, ErrorCode::AuthenticationError);
    }

    #[test]
    fn extracts_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(
            extract_bearer_token(&headers),
            Some("abc.def.ghi".to_string())
        );
    }

    #[test]
    fn accepts_lowercase_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("bearer token"));
        assert_eq!(extract_bearer_token(&headers), Some("token".to_string()));
    }

    #[test]
    fn rejects_missing_header() {
        let headers = HeaderMap::new();
        assert_eq!(extract_bearer_token(&headers), None);
    }

    #[test]
    fn rejects_wrong_scheme_or_empty_token() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(extract_bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(extract_bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("abc.def.ghi"));
        assert_eq!(extract_bearer_token(&headers), None);
    }
}
