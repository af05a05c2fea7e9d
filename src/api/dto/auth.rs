//! Authentication-related Data Transfer Objects

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::api::dto::UserReadable;
use crate::services::Session;
use crate::utils::validate::CheckedInput;

/// Login request payload
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "This field may not be blank."))]
    #[schema(example = "admin")]
    pub username: String,
    #[validate(length(min = 1, message = "This field may not be blank."))]
    #[schema(example = "password123", format = "password")]
    pub password: String,
}

impl CheckedInput for LoginRequest {}

/// Refresh token request payload
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct RefreshTokenRequest {
    #[validate(length(min = 1, message = "Refresh token cannot be empty"))]
    #[schema(example = "eyJ0eXAiOiJKV1QiLCJhbGc...")]
    pub refresh_token: String,
}

impl CheckedInput for RefreshTokenRequest {}

/// Login and refresh response with user info and tokens
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    pub user: UserReadable,
    /// Access token (short-lived)
    #[schema(example = "eyJ0eXAiOiJKV1QiLCJhbGc...")]
    pub access_token: String,
    /// Refresh token (long-lived)
    #[schema(example = "eyJ0eXAiOiJKV1QiLCJhbGc...")]
    pub refresh_token: String,
}

impl From<Session> for TokenResponse {
    fn from(session: Session) -> Self {
        Self {
            user: UserReadable::from(&session.user),
            access_token: session.access_token,
            refresh_token: session.refresh_token,
        }
    }
}
