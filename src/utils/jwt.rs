//! HS256 access and refresh tokens.

use jiff::{SignedDuration, Timestamp};
use jsonwebtoken::errors::{Error as JwtError, ErrorKind};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::config::JwtConfig;
use crate::error::{AppError, AppResult};
use crate::models::User;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// Who the caller is and whether they may write.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Numeric user id
    pub sub: String,
    pub uuid: String,
    pub username: String,
    pub is_admin: bool,
    pub token_type: TokenType,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(user: &User, token_type: TokenType, expiration_hours: i64) -> Self {
        let iat = Timestamp::now().as_second();
        Self {
            sub: user.id.to_string(),
            uuid: user.uuid.clone(),
            username: user.username.clone(),
            is_admin: user.is_admin,
            token_type,
            iat,
            exp: iat + SignedDuration::from_hours(expiration_hours).as_secs(),
        }
    }

    pub fn user_id(&self) -> AppResult<i32> {
        self.sub.parse().map_err(|_| unauthorized("Invalid token subject"))
    }
}

fn unauthorized(message: impl Into<String>) -> AppError {
    AppError::Unauthorized {
        message: message.into(),
    }
}

fn decode_error(error: JwtError) -> AppError {
    match error.kind() {
        ErrorKind::ExpiredSignature => unauthorized("Token has expired"),
        ErrorKind::InvalidSignature => unauthorized("Invalid token signature"),
        ErrorKind::InvalidToken => unauthorized("Invalid token"),
        _ => unauthorized(format!("Token validation failed: {}", error)),
    }
}

pub fn generate_token(
    user: &User,
    token_type: TokenType,
    secret: &str,
    expiration_hours: i64,
) -> AppResult<String> {
    let claims = Claims::new(user, token_type, expiration_hours);
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal {
        source: anyhow::anyhow!("Failed to sign token: {}", e),
    })
}

/// Returns `(access_token, refresh_token)` with the configured lifetimes.
pub fn generate_token_pair(user: &User, jwt: &JwtConfig) -> AppResult<(String, String)> {
    Ok((
        generate_token(user, TokenType::Access, &jwt.secret, jwt.access_token_expiration)?,
        generate_token(user, TokenType::Refresh, &jwt.secret, jwt.refresh_token_expiration)?,
    ))
}

/// Verifies signature and expiry, then the token type when one is given.
pub fn validate_token(
    token: &str,
    secret: &str,
    expected_type: Option<TokenType>,
) -> AppResult<Claims> {
    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(decode_error)?
    .claims;

    match expected_type {
        Some(expected) if claims.token_type != expected => Err(unauthorized(format!(
            "Invalid token type: expected {:?}, got {:?}",
            expected, claims.token_type
        ))),
        _ => Ok(claims),
    }
}

pub fn validate_access_token(token: &str, secret: &str) -> AppResult<Claims> {
    validate_token(token, secret, Some(TokenType::Access))
}

pub fn validate_refresh_token(token: &str, secret: &str) -> AppResult<Claims> {
    validate_token(token, secret, Some(TokenType::Refresh))
}
