//! Range checks for each settings section.
//!
//! [`Settings::validate`] stops at the first failing section. JWT settings
//! are left out of it and checked by `serve`, so `migrate` and
//! `create-superuser` work without a signing secret.

use crate::config::error::ConfigError;
use crate::config::settings::{
    DatabaseConfig, JwtConfig, LoggerSettings, PaginationConfig, ServerConfig, Settings,
};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const LOG_FORMATS: [&str; 3] = ["full", "compact", "json"];
const POSTGRES_SCHEMES: [&str; 2] = ["postgres://", "postgresql://"];
const MIN_JWT_SECRET_LEN: usize = 32;

fn ensure(ok: bool, field: &str, message: impl FnOnce() -> String) -> Result<(), ConfigError> {
    if ok {
        Ok(())
    } else {
        Err(ConfigError::validation(field, message()))
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure(self.port != 0, "server.port", || {
            "Port must be between 1 and 65535.".to_string()
        })?;
        ensure(self.request_timeout > 0, "server.request_timeout", || {
            "Request timeout must be at least one second.".to_string()
        })
    }
}

impl DatabaseConfig {
    /// The URL is only checked when PostgreSQL is in use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.in_memory {
            ensure(!self.url.is_empty(), "database.url", || {
                "A database URL is required unless database.in_memory is set.".to_string()
            })?;
            ensure(
                POSTGRES_SCHEMES.iter().any(|s| self.url.starts_with(s)),
                "database.url",
                || "Expected postgres://[user:password@]host[:port]/database".to_string(),
            )?;
        }

        ensure(self.max_connections > 0, "database.max_connections", || {
            "Max connections must be greater than 0.".to_string()
        })?;
        ensure(self.min_connections > 0, "database.min_connections", || {
            "Min connections must be greater than 0.".to_string()
        })?;
        ensure(
            self.min_connections <= self.max_connections,
            "database.min_connections",
            || {
                format!(
                    "Min connections ({}) cannot exceed max connections ({}).",
                    self.min_connections, self.max_connections
                )
            },
        )
    }
}

impl JwtConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure(!self.secret.is_empty(), "jwt.secret", || {
            "Set a signing secret, e.g. through RESUME_JWT__SECRET.".to_string()
        })?;
        ensure(self.secret.len() >= MIN_JWT_SECRET_LEN, "jwt.secret", || {
            format!("The secret must be at least {} characters.", MIN_JWT_SECRET_LEN)
        })?;
        ensure(
            self.access_token_expiration > 0,
            "jwt.access_token_expiration",
            || "Access token expiration must be positive.".to_string(),
        )?;
        ensure(
            self.refresh_token_expiration > self.access_token_expiration,
            "jwt.refresh_token_expiration",
            || "Refresh tokens must outlive access tokens.".to_string(),
        )
    }
}

impl LoggerSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let level = self.level.to_ascii_lowercase();
        ensure(LOG_LEVELS.contains(&level.as_str()), "logger.level", || {
            format!(
                "Unknown log level '{}'; use one of {}.",
                self.level,
                LOG_LEVELS.join(", ")
            )
        })?;
        ensure(
            !self.file.enabled || !self.file.path.trim().is_empty(),
            "logger.file.path",
            || "A path is required when file logging is enabled.".to_string(),
        )?;
        let format = self.file.format.to_ascii_lowercase();
        ensure(
            LOG_FORMATS.contains(&format.as_str()),
            "logger.file.format",
            || {
                format!(
                    "Unknown log format '{}'; use one of {}.",
                    self.file.format,
                    LOG_FORMATS.join(", ")
                )
            },
        )
    }
}

impl PaginationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure(
            self.default_page_size > 0,
            "pagination.default_page_size",
            || "Default page size must be greater than 0.".to_string(),
        )?;
        ensure(
            self.default_page_size <= self.max_page_size,
            "pagination.max_page_size",
            || {
                format!(
                    "Max page size ({}) cannot be below the default page size ({}).",
                    self.max_page_size, self.default_page_size
                )
            },
        )
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server.validate()?;
        self.database.validate()?;
        self.logger.validate()?;
        self.pagination.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failing_field(result: Result<(), ConfigError>) -> String {
        match result {
            Err(ConfigError::ValidationError { field, .. }) => field,
            other => panic!("Expected ValidationError, got {:?}", other),
        }
    }

    fn postgres() -> DatabaseConfig {
        DatabaseConfig {
            url: "postgres://localhost/resume".to_string(),
            ..Default::default()
        }
    }

    fn jwt() -> JwtConfig {
        JwtConfig {
            secret: "s".repeat(MIN_JWT_SECRET_LEN),
            ..Default::default()
        }
    }

    #[test]
    fn test_server_bounds() {
        assert!(ServerConfig::default().validate().is_ok());

        let zero_port = ServerConfig {
            port: 0,
            ..Default::default()
        };
        assert_eq!(failing_field(zero_port.validate()), "server.port");

        let zero_timeout = ServerConfig {
            request_timeout: 0,
            ..Default::default()
        };
        assert_eq!(
            failing_field(zero_timeout.validate()),
            "server.request_timeout"
        );
    }

    #[test]
    fn test_database_url_rules() {
        assert!(postgres().validate().is_ok());
        assert_eq!(
            failing_field(DatabaseConfig::default().validate()),
            "database.url"
        );

        let mysql = DatabaseConfig {
            url: "mysql://localhost/resume".to_string(),
            ..Default::default()
        };
        assert_eq!(failing_field(mysql.validate()), "database.url");

        let in_memory = DatabaseConfig {
            in_memory: true,
            ..Default::default()
        };
        assert!(in_memory.validate().is_ok());
    }

    #[test]
    fn test_database_pool_bounds() {
        let inverted = DatabaseConfig {
            max_connections: 2,
            min_connections: 5,
            ..postgres()
        };
        assert_eq!(
            failing_field(inverted.validate()),
            "database.min_connections"
        );

        let empty = DatabaseConfig {
            max_connections: 0,
            ..postgres()
        };
        assert_eq!(failing_field(empty.validate()), "database.max_connections");
    }

    #[test]
    fn test_jwt_rules() {
        assert!(jwt().validate().is_ok());
        assert_eq!(failing_field(JwtConfig::default().validate()), "jwt.secret");

        let short = JwtConfig {
            secret: "short".to_string(),
            ..jwt()
        };
        assert_eq!(failing_field(short.validate()), "jwt.secret");

        let inverted = JwtConfig {
            refresh_token_expiration: 1,
            ..jwt()
        };
        assert_eq!(
            failing_field(inverted.validate()),
            "jwt.refresh_token_expiration"
        );
    }

    #[test]
    fn test_log_levels_are_case_insensitive() {
        for level in ["trace", "DEBUG", "info", "Warn", "error"] {
            let settings = LoggerSettings {
                level: level.to_string(),
                ..Default::default()
            };
            assert!(settings.validate().is_ok(), "{}", level);
        }

        let settings = LoggerSettings {
            level: "verbose".to_string(),
            ..Default::default()
        };
        assert_eq!(failing_field(settings.validate()), "logger.level");
    }

    #[test]
    fn test_file_logging_needs_a_path() {
        let mut settings = LoggerSettings::default();
        settings.file.enabled = true;
        settings.file.path = "  ".to_string();
        assert_eq!(failing_field(settings.validate()), "logger.file.path");

        settings.file.enabled = false;
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_pagination_bounds() {
        assert!(PaginationConfig::default().validate().is_ok());

        let zero = PaginationConfig {
            default_page_size: 0,
            max_page_size: 10,
        };
        assert_eq!(
            failing_field(zero.validate()),
            "pagination.default_page_size"
        );

        let inverted = PaginationConfig {
            default_page_size: 50,
            max_page_size: 10,
        };
        assert_eq!(
            failing_field(inverted.validate()),
            "pagination.max_page_size"
        );
    }

    #[test]
    fn test_settings_skip_jwt_and_stop_at_first_failure() {
        let settings = Settings {
            database: postgres(),
            ..Default::default()
        };
        assert!(settings.validate().is_ok());

        let settings = Settings {
            server: ServerConfig {
                port: 0,
                ..Default::default()
            },
            pagination: PaginationConfig {
                default_page_size: 0,
                max_page_size: 1,
            },
            ..Default::default()
        };
        assert_eq!(failing_field(settings.validate()), "server.port");
    }
}
