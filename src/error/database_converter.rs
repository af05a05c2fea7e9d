use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};

use crate::error::{AppError, ConstraintParser};

/// Maps constraint violations onto client-facing errors. Anything it cannot
/// attribute to a column stays an opaque `Database` error.
pub struct DatabaseErrorConverter;

impl DatabaseErrorConverter {
    pub fn convert_diesel_error(error: DieselError, operation: &str) -> AppError {
        match error {
            DieselError::DatabaseError(kind, info) => Self::constraint_error(kind, info.as_ref())
                .unwrap_or_else(|| AppError::Database {
                    operation: operation.to_string(),
                    source: anyhow::anyhow!("{:?}: {}", kind, info.message()),
                }),
            DieselError::NotFound => AppError::NotFound {
                entity: "record".to_string(),
                field: "id".to_string(),
                value: "unknown".to_string(),
            },
            other => AppError::Database {
                operation: operation.to_string(),
                source: other.into(),
            },
        }
    }

    fn constraint_error(
        kind: DatabaseErrorKind,
        info: &(dyn DatabaseErrorInformation + Send + Sync),
    ) -> Option<AppError> {
        let (message, constraint) = (info.message(), info.constraint_name());
        match kind {
            DatabaseErrorKind::UniqueViolation => {
                let (entity, field, value) =
                    ConstraintParser::parse_unique_violation(message, constraint)?;
                Some(AppError::Duplicate {
                    entity,
                    field,
                    value,
                })
            }
            DatabaseErrorKind::NotNullViolation => {
                let (entity, field) =
                    ConstraintParser::parse_not_null_violation(message, constraint)?;
                Some(AppError::Validation {
                    field,
                    reason: format!("Field is required for {}", entity),
                })
            }
            DatabaseErrorKind::ForeignKeyViolation => {
                let (entity, field, value) =
                    ConstraintParser::parse_foreign_key_violation(message, constraint)?;
                Some(AppError::Validation {
                    field,
                    reason: format!("{} references missing row '{}'", entity, value),
                })
            }
            DatabaseErrorKind::CheckViolation => {
                let (entity, constraint) =
                    ConstraintParser::parse_check_violation(message, constraint)?;
                Some(AppError::Validation {
                    field: constraint,
                    reason: format!("Check constraint failed for {}", entity),
                })
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockDatabaseErrorInfo {
        message: String,
        constraint_name: Option<String>,
    }

    impl DatabaseErrorInformation for MockDatabaseErrorInfo {
        fn message(&self) -> &str {
            &self.message
        }

        fn details(&self) -> Option<&str> {
            None
        }

        fn hint(&self) -> Option<&str> {
            None
        }

        fn table_name(&self) -> Option<&str> {
            None
        }

        fn column_name(&self) -> Option<&str> {
            None
        }

        fn constraint_name(&self) -> Option<&str> {
            self.constraint_name.as_deref()
        }

        fn statement_position(&self) -> Option<i32> {
            None
        }
    }

    fn db_error(kind: DatabaseErrorKind, message: &str, constraint: Option<&str>) -> DieselError {
        DieselError::DatabaseError(
            kind,
            Box::new(MockDatabaseErrorInfo {
                message: message.to_string(),
                constraint_name: constraint.map(String::from),
            }),
        )
    }

    #[test]
    fn test_convert_not_found_error() {
        let result = DatabaseErrorConverter::convert_diesel_error(DieselError::NotFound, "find");
        assert!(matches!(result, AppError::NotFound { .. }));
    }

    #[test]
    fn test_convert_unique_username_violation() {
        let error = db_error(
            DatabaseErrorKind::UniqueViolation,
            "duplicate key value violates unique constraint \"users_username_key\"\nDETAIL: Key (username)=(alice) already exists.",
            Some("users_username_key"),
        );

        match DatabaseErrorConverter::convert_diesel_error(error, "insert user") {
            AppError::Duplicate {
                entity,
                field,
                value,
            } => {
                assert_eq!(entity, "users");
                assert_eq!(field, "username");
                assert_eq!(value, "alice");
            }
            other => panic!("Expected Duplicate error, got: {:?}", other),
        }
    }

    #[test]
    fn test_convert_check_violation() {
        let error = db_error(
            DatabaseErrorKind::CheckViolation,
            "new row for relation \"experiences\" violates check constraint \"experiences_deleted_pair_check\"",
            Some("experiences_deleted_pair_check"),
        );

        match DatabaseErrorConverter::convert_diesel_error(error, "soft delete") {
            AppError::Validation { field, reason } => {
                assert_eq!(field, "experiences_deleted_pair_check");
                assert!(reason.contains("experiences"));
            }
            other => panic!("Expected Validation error, got: {:?}", other),
        }
    }

    #[test]
    fn test_unparseable_violation_falls_back_to_database_error() {
        let error = db_error(DatabaseErrorKind::UniqueViolation, "opaque", None);
        let result = DatabaseErrorConverter::convert_diesel_error(error, "insert");
        assert!(matches!(result, AppError::Database { .. }));
    }
}
