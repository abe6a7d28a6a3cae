//! Signed access/refresh token lifecycle.
//!
//! Tokens are self-contained: subject id, session epoch, kind, issued-at and
//! expiry, signed with the configured secret. There is no revocation list;
//! rotating the user's session epoch is the only (coarse-grained)
//! invalidation mechanism, enforced wherever a token is resolved to a user.

use super::state::AuthConfig;
use crate::api::{error::ApiError, models::User};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use mongodb::{
    bson::{doc, oid::ObjectId},
    Database,
};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tracing::error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Claims carried by every token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject user id (hex `ObjectId`).
    pub id: String,
    /// Session epoch the token was issued under.
    pub random_str: String,
    pub token_type: TokenKind,
    pub iat: i64,
    pub exp: i64,
}

fn credentials_error() -> ApiError {
    ApiError::authentication("Could not validate credentials")
}

fn invalid_refresh_token() -> ApiError {
    ApiError::authentication("Invalid refresh token")
}

fn issue(config: &AuthConfig, user: &User, kind: TokenKind, ttl: Duration) -> Result<String, ApiError> {
    let now = Utc::now();
    let claims = TokenClaims {
        id: user.id.to_hex(),
        random_str: user.random_str.clone(),
        token_type: kind,
        iat: now.timestamp(),
        exp: (now + ttl).timestamp(),
    };

    jsonwebtoken::encode(
        &Header::new(config.algorithm()),
        &claims,
        &EncodingKey::from_secret(config.secret().expose_secret().as_bytes()),
    )
    .map_err(|err| {
        error!("Failed to sign token: {err}");
        ApiError::internal()
    })
}

/// Issue a short-lived access token bound to the user's current session epoch.
///
/// # Errors
///
/// Returns an internal error if signing fails.
pub fn issue_access(config: &AuthConfig, user: &User) -> Result<String, ApiError> {
    issue(
        config,
        user,
        TokenKind::Access,
        Duration::minutes(config.access_token_ttl_minutes()),
    )
}

/// Issue a long-lived refresh token bound to the user's current session epoch.
///
/// # Errors
///
/// Returns an internal error if signing fails.
pub fn issue_refresh(config: &AuthConfig, user: &User) -> Result<String, ApiError> {
    issue(
        config,
        user,
        TokenKind::Refresh,
        Duration::days(config.refresh_token_ttl_days()),
    )
}

/// Verify signature and expiry and return the claims.
///
/// The session epoch is deliberately NOT checked here; resolving it against
/// the user's current value is the caller's job.
///
/// # Errors
///
/// Fails with an authentication error on a bad signature, malformed payload,
/// or an expired token.
pub fn decode(config: &AuthConfig, token: &str) -> Result<TokenClaims, ApiError> {
    let mut validation = Validation::new(config.algorithm());
    validation.leeway = 0;

    jsonwebtoken::decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(config.secret().expose_secret().as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|_| credentials_error())
}

/// Decode a token and require it to be of kind REFRESH.
///
/// An access token presented here is rejected exactly like a malformed one.
///
/// # Errors
///
/// Fails with an authentication error on decode failure or kind mismatch.
pub fn refresh_claims(config: &AuthConfig, token: &str) -> Result<TokenClaims, ApiError> {
    let claims = decode(config, token).map_err(|_| invalid_refresh_token())?;
    if claims.token_type != TokenKind::Refresh {
        return Err(invalid_refresh_token());
    }
    Ok(claims)
}

/// Exchange a refresh token for a fresh access token.
///
/// The token must be of kind REFRESH and its embedded session epoch must
/// still match the subject user's current epoch; every failure mode is an
/// authentication error so callers cannot distinguish a revoked session
/// from a bad token.
///
/// # Errors
///
/// Fails with an authentication error on decode failure, kind mismatch, or
/// a subject whose id/epoch no longer resolves.
pub async fn access_token_from_refresh_token(
    db: &Database,
    config: &AuthConfig,
    refresh_token: &str,
) -> Result<String, ApiError> {
    let claims = refresh_claims(config, refresh_token)?;

    let user_id = ObjectId::parse_str(&claims.id).map_err(|_| invalid_refresh_token())?;
    let user = User::collection(db)
        .find_one(doc! { "_id": user_id, "random_str": &claims.random_str })
        .await?
        .ok_or_else(invalid_refresh_token)?;

    issue_access(config, &user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::error::ErrorCode;
    use secrecy::SecretString;

    fn test_config() -> AuthConfig {
        AuthConfig::new(SecretString::from("test-secret".to_string()), "HS256").expect("config")
    }

    fn test_user() -> User {
        User::new("alice".to_string(), "Alice".to_string(), None)
    }

    #[test]
    fn access_token_round_trips() {
        let config = test_config();
        let user = test_user();

        let token = issue_access(&config, &user).expect("issue");
        let claims = decode(&config, &token).expect("decode");

        assert_eq!(claims.token_type, TokenKind::Access);
        assert_eq!(claims.id, user.id.to_hex());
        assert_eq!(claims.random_str, user.random_str);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn refresh_token_round_trips() {
        let config = test_config();
        let user = test_user();

        let token = issue_refresh(&config, &user).expect("issue");
        let claims = decode(&config, &token).expect("decode");

        assert_eq!(claims.token_type, TokenKind::Refresh);
        // Refresh tokens outlive access tokens
        assert!(claims.exp - claims.iat > 60 * config.access_token_ttl_minutes());
    }

    #[test]
    fn expired_token_is_rejected() {
        let config = test_config().with_access_token_ttl_minutes(-5);
        let user = test_user();

        let token = issue_access(&config, &user).expect("issue");
        let err = decode(&config, &token).expect_err("expired");
        assert_eq!(err.code, ErrorCode::AuthenticationError);
    }

    #[test]
    fn tampered_secret_is_rejected() {
        let config = test_config();
        let other =
            AuthConfig::new(SecretString::from("other-secret".to_string()), "HS256").expect("config");
        let user = test_user();

        let token = issue_access(&config, &user).expect("issue");
        assert!(decode(&other, &token).is_err());
    }

    #[test]
    fn garbage_token_is_rejected() {
        let config = test_config();
        let err = decode(&config, "not-a-token").expect_err("malformed");
        assert_eq!(err.code, ErrorCode::AuthenticationError);
    }

    #[test]
    fn refresh_exchange_rejects_access_tokens() {
        let config = test_config();
        let user = test_user();

        let access = issue_access(&config, &user).expect("issue");
        let err = refresh_claims(&config, &access).expect_err("kind mismatch");
        assert_eq!(err.code, ErrorCode::AuthenticationError);

        let refresh = issue_refresh(&config, &user).expect("issue");
        let claims = refresh_claims(&config, &refresh).expect("refresh");
        assert_eq!(claims.token_type, TokenKind::Refresh);
    }

    #[test]
    fn rotated_epoch_no_longer_matches_old_claims() {
        let config = test_config();
        let mut user = test_user();

        let token = issue_refresh(&config, &user).expect("issue");
        let claims = refresh_claims(&config, &token).expect("refresh");
        assert_eq!(claims.random_str, user.random_str);

        // Logout-everywhere rotates the epoch; the id+epoch lookup that
        // resolves the subject stops matching from here on.
        user.random_str = User::new_random_str();
        assert_ne!(claims.random_str, user.random_str);
    }

    #[test]
    fn token_kinds_serialize_uppercase() {
        assert_eq!(
            serde_json::to_value(TokenKind::Access).expect("serialize"),
            "ACCESS"
        );
        assert_eq!(
            serde_json::to_value(TokenKind::Refresh).expect("serialize"),
            "REFRESH"
        );
    }
}
