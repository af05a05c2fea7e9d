//! User-related DTOs for API requests and responses.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::error::{AppError, AppResult};
use crate::models::{User, UserChanges};
use crate::services::Registration;
use crate::utils::validate::{CheckedInput, field_error};

// ============================================================================
// Request DTOs
// ============================================================================

/// Writable shape for creating a user. The only shape that accepts a
/// password.
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct UserCreate {
    #[validate(length(
        min = 1,
        max = 150,
        message = "Ensure this field has between 1 and 150 characters."
    ))]
    #[schema(example = "jdoe", min_length = 1, max_length = 150)]
    pub username: Option<String>,
    #[validate(length(max = 150, message = "Ensure this field has no more than 150 characters."))]
    pub first_name: Option<String>,
    #[validate(length(max = 150, message = "Ensure this field has no more than 150 characters."))]
    pub last_name: Option<String>,
    #[validate(email(message = "Enter a valid email address."))]
    #[schema(format = "email")]
    pub email: Option<String>,
    #[validate(length(max = 128, message = "Ensure this field has no more than 128 characters."))]
    #[schema(format = "password", write_only, min_length = 1, max_length = 128)]
    pub password: Option<String>,
}

impl CheckedInput for UserCreate {
    fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.username.is_none() {
            missing.push("username");
        }
        if self.password.is_none() {
            missing.push("password");
        }
        missing
    }

    fn field_errors(&self) -> Vec<(&'static str, ValidationError)> {
        match &self.password {
            Some(password) if password.trim().is_empty() => {
                vec![("password", field_error("blank", "This field may not be blank."))]
            }
            _ => Vec::new(),
        }
    }
}

impl UserCreate {
    /// Converts a checked payload into a registration of a regular user.
    pub fn into_registration(self) -> AppResult<Registration> {
        let (Some(username), Some(password)) = (self.username, self.password) else {
            return Err(AppError::BadRequest {
                message: "username and password are required".to_string(),
            });
        };

        Ok(Registration {
            username,
            first_name: self.first_name.unwrap_or_default(),
            last_name: self.last_name.unwrap_or_default(),
            email: self.email.unwrap_or_default(),
            password,
            is_admin: false,
        })
    }
}

/// Writable shape for updating a user's profile.
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct UserUpdate {
    #[validate(length(
        min = 1,
        max = 150,
        message = "Ensure this field has between 1 and 150 characters."
    ))]
    pub username: Option<String>,
    #[validate(length(max = 150, message = "Ensure this field has no more than 150 characters."))]
    pub first_name: Option<String>,
    #[validate(length(max = 150, message = "Ensure this field has no more than 150 characters."))]
    pub last_name: Option<String>,
    #[validate(email(message = "Enter a valid email address."))]
    #[schema(format = "email")]
    pub email: Option<String>,
}

impl CheckedInput for UserUpdate {
    fn missing_fields(&self) -> Vec<&'static str> {
        if self.username.is_none() {
            vec!["username"]
        } else {
            Vec::new()
        }
    }
}

impl From<UserUpdate> for UserChanges {
    fn from(update: UserUpdate) -> Self {
        Self {
            username: update.username,
            first_name: update.first_name,
            last_name: update.last_name,
            email: update.email,
        }
    }
}

// ============================================================================
// Response DTOs
// ============================================================================

/// Readable shape of a user. Never carries the password or numeric id.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserReadable {
    #[schema(example = "USER-PROFILE-0f8fad5b-d9cb-469f-a165-70867728950e")]
    pub uuid: String,
    pub username: String,
    #[schema(example = "Jane Doe")]
    pub full_name: String,
    pub email: String,
    pub is_admin: bool,
    pub is_active: bool,
    #[schema(value_type = String, format = DateTime)]
    pub date_joined: Timestamp,
}

impl From<&User> for UserReadable {
    fn from(user: &User) -> Self {
        Self {
            uuid: user.uuid.clone(),
            username: user.username.clone(),
            full_name: user.full_name(),
            email: user.email.clone(),
            is_admin: user.is_admin,
            is_active: user.is_active,
            date_joined: user.date_joined,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::validate::{WriteMode, check};

    #[test]
    fn test_create_requires_username_and_password() {
        match check(&UserCreate::default(), WriteMode::Full) {
            Err(AppError::ValidationErrors { errors }) => assert_eq!(
                errors,
                vec![
                    "password: This field is required.".to_string(),
                    "username: This field is required.".to_string(),
                ]
            ),
            other => panic!("Expected ValidationErrors, got {:?}", other),
        }
    }

    #[test]
    fn test_create_rejects_bad_email() {
        let input = UserCreate {
            username: Some("jdoe".to_string()),
            password: Some("secret".to_string()),
            email: Some("not-an-email".to_string()),
            ..Default::default()
        };
        match check(&input, WriteMode::Full) {
            Err(AppError::ValidationErrors { errors }) => {
                assert_eq!(errors, vec!["email: Enter a valid email address.".to_string()]);
            }
            other => panic!("Expected ValidationErrors, got {:?}", other),
        }
    }

    #[test]
    fn test_password_blank_and_too_long_have_their_own_messages() {
        let with_password = |password: String| UserCreate {
            username: Some("jdoe".to_string()),
            password: Some(password),
            ..Default::default()
        };
        let failures = |input: &UserCreate| match check(input, WriteMode::Full) {
            Err(AppError::ValidationErrors { errors }) => errors,
            other => panic!("Expected ValidationErrors, got {:?}", other),
        };

        assert_eq!(
            failures(&with_password(String::new())),
            vec!["password: This field may not be blank.".to_string()]
        );
        assert_eq!(
            failures(&with_password("x".repeat(129))),
            vec!["password: Ensure this field has no more than 128 characters.".to_string()]
        );
        assert!(check(&with_password("x".repeat(128)), WriteMode::Full).is_ok());
    }

    #[test]
    fn test_into_registration_defaults_optional_fields() {
        let input = UserCreate {
            username: Some("jdoe".to_string()),
            password: Some("secret".to_string()),
            ..Default::default()
        };
        let registration = input.into_registration().unwrap();
        assert_eq!(registration.first_name, "");
        assert!(!registration.is_admin);
    }

    #[test]
    fn test_partial_update_needs_no_fields() {
        assert!(check(&UserUpdate::default(), WriteMode::Partial).is_ok());
        assert!(check(&UserUpdate::default(), WriteMode::Full).is_err());
    }

    #[test]
    fn test_readable_hides_password() {
        let user = User {
            id: 3,
            uuid: "USER-PROFILE-abc".to_string(),
            username: "jdoe".to_string(),
            first_name: "Jane".to_string(),
            last_name: String::new(),
            email: "jane@example.com".to_string(),
            password: "$argon2id$secret".to_string(),
            is_admin: false,
            is_active: true,
            date_joined: Timestamp::UNIX_EPOCH,
        };

        let json = serde_json::to_value(UserReadable::from(&user)).unwrap();
        assert_eq!(json["full_name"], "Jane");
        assert!(json.get("password").is_none());
        assert!(json.get("id").is_none());
        assert_eq!(json["date_joined"], "1970-01-01T00:00:00Z");
    }
}
