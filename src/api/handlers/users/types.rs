//! Request/response types for account endpoints.

use crate::api::models::User;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct RegistrationRequest {
    pub username: String,
    pub full_name: String,
    pub password: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct TokenRequest {
    pub username: String,
    pub password: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct TokenPairResponse {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct UpdateAccessTokenRequest {
    pub refresh_token: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct AccessTokenResponse {
    pub access_token: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Default)]
pub struct UpdateUserRequest {
    pub full_name: Option<String>,
    pub image: Option<String>,
}

/// The caller's own account view.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct UserResponse {
    pub username: String,
    pub full_name: String,
    pub image: Option<String>,
    pub is_active: bool,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            full_name: user.full_name.clone(),
            image: user.image.clone(),
            is_active: user.is_active,
        }
    }
}

/// Public author view embedded in posts, comments, and replies.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone)]
pub struct PublicUserResponse {
    pub username: String,
    pub full_name: String,
    pub image: Option<String>,
}

impl From<&User> for PublicUserResponse {
    fn from(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            full_name: user.full_name.clone(),
            image: user.image.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_response_mirrors_the_model() {
        let mut user = User::new("alice".to_string(), "Alice".to_string(), None);
        user.image = Some("/media/alice.png".to_string());

        let response = UserResponse::from(&user);
        assert_eq!(response.username, "alice");
        assert_eq!(response.full_name, "Alice");
        assert_eq!(response.image.as_deref(), Some("/media/alice.png"));
        assert!(response.is_active);
    }

    #[test]
    fn public_view_omits_account_state() {
        let user = User::new("bob".to_string(), "Bob".to_string(), Some("hash".into()));
        let value = serde_json::to_value(PublicUserResponse::from(&user)).expect("serialize");
        assert!(value.get("is_active").is_none());
        assert!(value.get("password").is_none());
    }

    #[test]
    fn update_request_fields_are_optional() {
        let request: UpdateUserRequest = serde_json::from_str("{}").expect("deserialize");
        assert!(request.full_name.is_none());
        assert!(request.image.is_none());
    }
}
