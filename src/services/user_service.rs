//! User service for business logic operations.
//!
//! Owns password hashing and identifier generation so repositories only
//! ever see finished records.

use std::sync::Arc;

use jiff::Timestamp;

use crate::config::JwtConfig;
use crate::error::{AppError, AppResult};
use crate::models::{NewUser, USER_ENTITY, User, UserChanges};
use crate::repositories::UserRepository;
use crate::utils::identifier::generate_uuid;
use crate::utils::jwt::{generate_token_pair, validate_access_token, validate_refresh_token};
use crate::utils::password::{hash_password, verify_password};

const ENTITY_NAME: &str = "user";

/// Account data as submitted, with the plaintext password.
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub is_admin: bool,
}

/// A successful login or refresh.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
}

/// User service for handling user-related business logic.
#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository>,
}

impl UserService {
    /// Creates a new UserService with the given repository.
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }

    /// Registers an account: hashes the password and assigns a uuid.
    ///
    /// # Errors
    /// `Duplicate` when the username is taken
    pub async fn create_user(&self, registration: Registration) -> AppResult<User> {
        let password = hash_password(&registration.password)?;

        let user = self
            .repo
            .create(NewUser {
                uuid: generate_uuid(USER_ENTITY),
                username: registration.username,
                first_name: registration.first_name,
                last_name: registration.last_name,
                email: registration.email,
                password,
                is_admin: registration.is_admin,
                is_active: true,
                date_joined: Timestamp::now(),
            })
            .await?;

        tracing::info!(uuid = %user.uuid, username = %user.username, "User created");
        Ok(user)
    }

    /// Gets a user by their numeric id.
    pub async fn get_user(&self, id: i32) -> AppResult<User> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound {
                entity: ENTITY_NAME.to_string(),
                field: "id".to_string(),
                value: id.to_string(),
            })
    }

    pub async fn get_by_uuid(&self, uuid: &str) -> AppResult<User> {
        self.repo
            .find_by_uuid(uuid)
            .await?
            .ok_or_else(|| AppError::not_found(ENTITY_NAME, uuid))
    }

    /// Lists users with pagination.
    ///
    /// # Returns
    /// A tuple of (users, total_count)
    pub async fn list_users_paginated(
        &self,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<User>, i64)> {
        self.repo.list_paginated(offset, limit).await
    }

    /// Applies profile changes. A full update simply sets every field.
    pub async fn update_user(&self, uuid: &str, changes: UserChanges) -> AppResult<User> {
        let mut user = self.get_by_uuid(uuid).await?;
        changes.apply_to(&mut user);

        let updated = self.repo.update(&user).await?;
        tracing::info!(uuid = %updated.uuid, "User updated");
        Ok(updated)
    }

    /// Physically removes a user. Experiences they own or stamped go with
    /// them through the foreign-key cascade.
    pub async fn delete_user(&self, uuid: &str) -> AppResult<()> {
        let user = self.get_by_uuid(uuid).await?;
        if self.repo.delete(user.id).await? == 0 {
            return Err(AppError::not_found(ENTITY_NAME, uuid));
        }

        tracing::info!(uuid = %uuid, "User deleted");
        Ok(())
    }

    /// Checks credentials and issues a token pair.
    ///
    /// Unknown usernames, wrong passwords and inactive accounts all yield
    /// the same `Unauthorized` error.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
        jwt: &JwtConfig,
    ) -> AppResult<Session> {
        let user = self.repo.find_by_username(username).await?;

        let user = match user {
            Some(user) if user.is_active && verify_password(password, &user.password)? => user,
            _ => {
                tracing::warn!(username = %username, "Login rejected");
                return Err(invalid_credentials());
            }
        };

        let session = issue(user, jwt)?;
        tracing::info!(uuid = %session.user.uuid, "User logged in");
        Ok(session)
    }

    /// Exchanges a refresh token for a new pair. The account must still
    /// exist and be active.
    pub async fn refresh(&self, refresh_token: &str, jwt: &JwtConfig) -> AppResult<Session> {
        let claims = validate_refresh_token(refresh_token, &jwt.secret)?;
        let user = self
            .repo
            .find_by_id(claims.user_id()?)
            .await?
            .filter(|user| user.is_active)
            .ok_or_else(|| AppError::Unauthorized {
                message: "User no longer exists or is inactive".to_string(),
            })?;

        issue(user, jwt)
    }

    /// Resolves an access token to the account it was issued for.
    ///
    /// The role comes from the stored record, so a deleted, deactivated or
    /// demoted account loses its rights before the token expires.
    pub async fn authorize(&self, access_token: &str, jwt: &JwtConfig) -> AppResult<User> {
        let claims = validate_access_token(access_token, &jwt.secret)?;
        self.repo
            .find_by_id(claims.user_id()?)
            .await?
            .filter(|user| user.is_active && user.uuid == claims.uuid)
            .ok_or_else(|| AppError::Unauthorized {
                message: "User no longer exists or is inactive".to_string(),
            })
    }

    /// Round-trips to the user store; used by the health endpoint.
    pub async fn ping(&self) -> AppResult<()> {
        self.repo.ping().await
    }
}

fn invalid_credentials() -> AppError {
    AppError::Unauthorized {
        message: "Invalid username or password".to_string(),
    }
}

fn issue(user: User, jwt: &JwtConfig) -> AppResult<Session> {
    let (access_token, refresh_token) = generate_token_pair(&user, jwt)?;

    Ok(Session {
        user,
        access_token,
        refresh_token,
    })
}
