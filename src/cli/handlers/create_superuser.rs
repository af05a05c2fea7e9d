//! Create-superuser command handler
//!
//! Bootstraps the first admin account. The input goes through the same
//! checks as `POST /api/v1/users`.

use crate::api::dto::UserCreate;
use crate::config::Settings;
use crate::db::establish_async_connection_pool;
use crate::error::{AppError, AppResult};
use crate::models::User;
use crate::repositories::Repositories;
use crate::services::UserService;
use crate::utils::validate::{WriteMode, check};

/// Account details from the command line.
#[derive(Debug, Clone, Default)]
pub struct SuperuserInput {
    pub username: String,
    pub email: Option<String>,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

pub struct CreateSuperuserHandler {
    users: UserService,
}

impl CreateSuperuserHandler {
    pub fn new(users: UserService) -> Self {
        Self { users }
    }

    /// Connects to the configured PostgreSQL database.
    pub async fn from_settings(settings: &Settings) -> AppResult<Self> {
        if settings.database.in_memory {
            return Err(AppError::Validation {
                field: "database.in_memory".to_string(),
                reason: "an in-memory account would not outlive this command".to_string(),
            });
        }

        let pool = establish_async_connection_pool(&settings.database).await?;
        let repos = Repositories::new(pool);
        Ok(Self::new(UserService::new(repos.users)))
    }

    /// # Errors
    /// - `ValidationErrors` for a blank password, bad e-mail or oversized name
    /// - `Duplicate` when the username is taken
    pub async fn execute(&self, input: SuperuserInput) -> AppResult<User> {
        let payload = UserCreate {
            username: Some(input.username),
            first_name: input.first_name,
            last_name: input.last_name,
            email: input.email,
            password: Some(input.password),
        };
        check(&payload, WriteMode::Full)?;

        let mut registration = payload.into_registration()?;
        registration.is_admin = true;

        let user = self.users.create_user(registration).await?;
        tracing::info!(uuid = %user.uuid, username = %user.username, "Superuser created");
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handler() -> CreateSuperuserHandler {
        CreateSuperuserHandler::new(UserService::new(Repositories::in_memory().users))
    }

    fn input(username: &str) -> SuperuserInput {
        SuperuserInput {
            username: username.to_string(),
            email: Some("admin@example.com".to_string()),
            password: "correct horse".to_string(),
            first_name: Some("Ada".to_string()),
            last_name: None,
        }
    }

    #[tokio::test]
    async fn test_creates_admin() {
        let user = handler().execute(input("admin")).await.unwrap();
        assert!(user.is_admin);
        assert!(user.is_active);
        assert!(user.uuid.starts_with("USER-PROFILE-"));
        assert_ne!(user.password, "correct horse");
    }

    #[tokio::test]
    async fn test_duplicate_username() {
        let handler = handler();
        handler.execute(input("admin")).await.unwrap();
        assert!(matches!(
            handler.execute(input("admin")).await,
            Err(AppError::Duplicate { .. })
        ));
    }

    #[tokio::test]
    async fn test_invalid_input_is_rejected() {
        let mut bad = input("admin");
        bad.email = Some("not-an-email".to_string());
        bad.password = String::new();

        match handler().execute(bad).await {
            Err(AppError::ValidationErrors { errors }) => {
                assert_eq!(errors.len(), 2, "{:?}", errors);
            }
            other => panic!("Expected ValidationErrors, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_in_memory_settings_are_rejected() {
        let mut settings = Settings::default();
        settings.database.in_memory = true;
        assert!(matches!(
            CreateSuperuserHandler::from_settings(&settings).await,
            Err(AppError::Validation { .. })
        ));
    }
}
