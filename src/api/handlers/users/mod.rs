//! Account endpoints: registration, login, token refresh, session
//! invalidation, and profile management.

pub mod storage;
pub mod types;

use crate::api::{
    auth::{credentials, require_user, token, AuthConfig},
    error::{ApiError, ErrorBody},
    handlers::{valid_username, MessageResponse},
};
use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use self::storage::RegistrationOutcome;
use self::types::{
    AccessTokenResponse, ChangePasswordRequest, RegistrationRequest, TokenPairResponse,
    TokenRequest, UpdateAccessTokenRequest, UpdateUserRequest, UserResponse,
};
use mongodb::Database;
use std::sync::Arc;
use tracing::{debug, instrument};

fn invalid_credentials() -> ApiError {
    ApiError::authentication("Invalid credentials")
}

#[utoipa::path(
    post,
    path = "/api/v1/registration",
    request_body = RegistrationRequest,
    responses(
        (status = 201, description = "Registration successful", body = UserResponse),
        (status = 400, description = "Invalid username", body = ErrorBody),
        (status = 409, description = "Username already exists", body = ErrorBody),
    ),
    tag = "users"
)]
#[instrument(skip_all, fields(username = %payload.username))]
pub async fn register(
    db: Extension<Database>,
    Json(payload): Json<RegistrationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if !valid_username(&payload.username) {
        return Err(ApiError::validation(
            "Username must be 3-64 characters of letters, digits, '.', '_' or '-'.",
            Some("username"),
        ));
    }

    let password_hash = credentials::hash_password(payload.password).await?;

    match storage::insert_user(&db, &payload.username, &payload.full_name, password_hash).await? {
        RegistrationOutcome::Created(user) => {
            debug!("Registered user");
            Ok((StatusCode::CREATED, Json(UserResponse::from(user.as_ref()))))
        }
        RegistrationOutcome::UsernameTaken => Err(ApiError::username_exists()),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/token",
    request_body = TokenRequest,
    responses(
        (status = 200, description = "Access and refresh tokens issued", body = TokenPairResponse),
        (status = 401, description = "Invalid credentials", body = ErrorBody),
    ),
    tag = "users"
)]
#[instrument(skip_all)]
pub async fn login(
    db: Extension<Database>,
    config: Extension<Arc<AuthConfig>>,
    Json(payload): Json<TokenRequest>,
) -> Result<Json<TokenPairResponse>, ApiError> {
    // Unknown usernames and wrong passwords are indistinguishable on purpose.
    let Some(user) = storage::find_by_username(&db, &payload.username).await? else {
        return Err(invalid_credentials());
    };
    let Some(hash) = user.password.clone() else {
        return Err(invalid_credentials());
    };
    if !credentials::verify_password(payload.password, hash).await? {
        return Err(invalid_credentials());
    }

    let access_token = token::issue_access(&config, &user)?;
    let refresh_token = token::issue_refresh(&config, &user)?;

    storage::touch_last_login(&db, user.id).await?;

    Ok(Json(TokenPairResponse {
        access_token,
        refresh_token,
    }))
}

#[utoipa::path(
    post,
    path = "/api/v1/update-access-token",
    request_body = UpdateAccessTokenRequest,
    responses(
        (status = 200, description = "Fresh access token issued", body = AccessTokenResponse),
        (status = 401, description = "Invalid refresh token", body = ErrorBody),
    ),
    tag = "users"
)]
#[instrument(skip_all)]
pub async fn update_access_token(
    db: Extension<Database>,
    config: Extension<Arc<AuthConfig>>,
    Json(payload): Json<UpdateAccessTokenRequest>,
) -> Result<Json<AccessTokenResponse>, ApiError> {
    let access_token =
        token::access_token_from_refresh_token(&db, &config, &payload.refresh_token).await?;
    Ok(Json(AccessTokenResponse { access_token }))
}

#[utoipa::path(
    put,
    path = "/api/v1/logout-from-all-device",
    responses(
        (status = 200, description = "All sessions invalidated", body = MessageResponse),
        (status = 401, description = "Not authenticated", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "users"
)]
#[instrument(skip_all)]
pub async fn logout_from_all_devices(
    headers: HeaderMap,
    db: Extension<Database>,
    config: Extension<Arc<AuthConfig>>,
) -> Result<Json<MessageResponse>, ApiError> {
    let user = require_user(&headers, &db, &config).await?;

    storage::rotate_session_epoch(&db, user.id).await?;

    Ok(Json(MessageResponse::new("Logged out.")))
}

#[utoipa::path(
    get,
    path = "/api/v1/me",
    responses(
        (status = 200, description = "The caller's account", body = UserResponse),
        (status = 401, description = "Not authenticated", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "users"
)]
pub async fn me(
    headers: HeaderMap,
    db: Extension<Database>,
    config: Extension<Arc<AuthConfig>>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = require_user(&headers, &db, &config).await?;
    Ok(Json(UserResponse::from(&user)))
}

#[utoipa::path(
    patch,
    path = "/api/v1/update-user",
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Profile updated", body = UserResponse),
        (status = 401, description = "Not authenticated", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "users"
)]
#[instrument(skip_all)]
pub async fn update_user(
    headers: HeaderMap,
    db: Extension<Database>,
    config: Extension<Arc<AuthConfig>>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = require_user(&headers, &db, &config).await?;

    let updated = storage::update_profile(
        &db,
        user.id,
        payload.full_name.as_deref(),
        payload.image.as_deref(),
    )
    .await?
    .unwrap_or(user);

    Ok(Json(UserResponse::from(&updated)))
}

#[utoipa::path(
    post,
    path = "/api/v1/change-password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password updated, all sessions invalidated", body = MessageResponse),
        (status = 401, description = "Wrong current password", body = ErrorBody),
    ),
    security(("bearer" = [])),
    tag = "users"
)]
#[instrument(skip_all)]
pub async fn change_password(
    headers: HeaderMap,
    db: Extension<Database>,
    config: Extension<Arc<AuthConfig>>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let user = require_user(&headers, &db, &config).await?;

    let Some(hash) = user.password.clone() else {
        return Err(invalid_credentials());
    };
    if !credentials::verify_password(payload.current_password, hash).await? {
        return Err(invalid_credentials());
    }

    let password_hash = credentials::hash_password(payload.new_password).await?;
    // Changing the password also rotates the session epoch: every token
    // issued before the change stops validating.
    storage::set_password(&db, user.id, &password_hash).await?;

    Ok(Json(MessageResponse::new("Password updated.")))
}
