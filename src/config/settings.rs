//! Settings tree deserialized from the layered TOML files.
//!
//! Every struct is `#[serde(default)]`, so a layer only names the keys it
//! changes and anything missing falls back to the `Default` impl below.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::error::ConfigError;
use crate::logger::{ConsoleConfig, FileConfig, LogFormat, LoggerConfig};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationConfig {
    pub name: String,
    pub version: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            name: "resume-rs".to_string(),
            version: crate::pkg_version().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Seconds before a request is answered with 408.
    pub request_timeout: u64,
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            request_timeout: 30,
        }
    }
}

/// PostgreSQL pool settings, or the in-memory store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    /// Seconds to wait for a pooled connection.
    pub connection_timeout: u64,
    /// Apply pending migrations before `serve` binds.
    pub auto_migrate: bool,
    /// Keep all data in process memory; `url` is ignored and nothing
    /// survives a restart.
    pub in_memory: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 10,
            min_connections: 1,
            connection_timeout: 30,
            auto_migrate: false,
            in_memory: false,
        }
    }
}

/// Token signing settings. Expirations are in hours.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JwtConfig {
    /// HS256 key, normally from `RESUME_JWT__SECRET`.
    pub secret: String,
    pub access_token_expiration: i64,
    pub refresh_token_expiration: i64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::new(),
            access_token_expiration: 1,
            refresh_token_expiration: 24 * 7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    pub default_page_size: u32,
    pub max_page_size: u32,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page_size: 20,
            max_page_size: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleSettings {
    pub enabled: bool,
    pub colored: bool,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            colored: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSettings {
    pub enabled: bool,
    pub path: String,
    /// `full`, `compact` or `json`
    pub format: String,
}

impl Default for FileSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            path: "logs/resume.log".to_string(),
            format: "json".to_string(),
        }
    }
}

/// The `[logger]` table as written in TOML. Turned into a
/// [`LoggerConfig`] before the subscriber is installed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerSettings {
    pub level: String,
    pub console: ConsoleSettings,
    pub file: FileSettings,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            console: ConsoleSettings::default(),
            file: FileSettings::default(),
        }
    }
}

impl LoggerSettings {
    pub fn into_logger_config(self) -> Result<LoggerConfig, ConfigError> {
        let format: LogFormat = self
            .file
            .format
            .parse()
            .map_err(|e: crate::logger::LoggerError| {
                ConfigError::validation("logger.file.format", e.to_string())
            })?;

        let config = LoggerConfig {
            level: self.level,
            console: ConsoleConfig {
                enabled: self.console.enabled,
                colored: self.console.colored,
            },
            file: FileConfig {
                enabled: self.file.enabled,
                path: PathBuf::from(self.file.path),
                format,
            },
        };
        config
            .validate()
            .map_err(|e| ConfigError::validation("logger", e.to_string()))?;
        Ok(config)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub application: ApplicationConfig,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub logger: LoggerSettings,
    pub pagination: PaginationConfig,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    prop_compose! {
        fn arb_database()(
            url in prop_oneof![
                Just("postgres://localhost/resume".to_string()),
                Just("postgresql://user:pass@db:5432/resume".to_string()),
            ],
            max_connections in 1u32..=50,
            min_connections in 1u32..=50,
            connection_timeout in 1u64..=120,
            auto_migrate in any::<bool>(),
            in_memory in any::<bool>(),
        ) -> DatabaseConfig {
            DatabaseConfig {
                url,
                max_connections,
                min_connections: min_connections.min(max_connections),
                connection_timeout,
                auto_migrate,
                in_memory,
            }
        }
    }

    prop_compose! {
        fn arb_settings()(
            host in prop_oneof![Just("127.0.0.1"), Just("0.0.0.0"), Just("localhost")],
            port in 1u16..=u16::MAX,
            request_timeout in 1u64..=300,
            database in arb_database(),
            secret in "[a-zA-Z0-9]{32,48}",
            access in 1i64..=24,
            refresh in 25i64..=720,
            level in prop_oneof![Just("debug"), Just("info"), Just("warn")],
            format in prop_oneof![Just("full"), Just("compact"), Just("json")],
            file_enabled in any::<bool>(),
            default_page_size in 1u32..=50,
        ) -> Settings {
            Settings {
                application: ApplicationConfig::default(),
                server: ServerConfig { host: host.to_string(), port, request_timeout },
                database,
                jwt: JwtConfig {
                    secret,
                    access_token_expiration: access,
                    refresh_token_expiration: refresh,
                },
                logger: LoggerSettings {
                    level: level.to_string(),
                    console: ConsoleSettings::default(),
                    file: FileSettings {
                        enabled: file_enabled,
                        format: format.to_string(),
                        ..FileSettings::default()
                    },
                },
                pagination: PaginationConfig {
                    default_page_size,
                    max_page_size: default_page_size * 4,
                },
            }
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_settings_survive_toml(settings in arb_settings()) {
            let text = toml::to_string(&settings).unwrap();
            let parsed: Settings = toml::from_str(&text).unwrap();
            prop_assert_eq!(settings, parsed);
        }
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.application.name, "resume-rs");
        assert_eq!(settings.server.address(), "127.0.0.1:8000");
        assert_eq!(settings.server.request_timeout(), Duration::from_secs(30));
        assert_eq!(settings.jwt.refresh_token_expiration, 168);
        assert_eq!(settings.pagination.default_page_size, 20);
        assert_eq!(settings.pagination.max_page_size, 100);
        assert!(!settings.database.in_memory);
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let settings: Settings = toml::from_str("").unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_partial_table_keeps_other_defaults() {
        let settings: Settings = toml::from_str("[server]\nport = 9000\n").unwrap();
        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.server.host, "127.0.0.1");
        assert_eq!(settings.server.request_timeout, 30);
    }

    #[test]
    fn test_into_logger_config() {
        let settings = LoggerSettings {
            file: FileSettings {
                enabled: true,
                path: "logs/test.log".to_string(),
                format: "compact".to_string(),
            },
            ..LoggerSettings::default()
        };
        let config = settings.into_logger_config().unwrap();
        assert_eq!(config.file.format, LogFormat::Compact);
        assert_eq!(config.file.path, PathBuf::from("logs/test.log"));
    }

    #[test]
    fn test_into_logger_config_rejects_unknown_format() {
        let settings = LoggerSettings {
            file: FileSettings {
                format: "xml".to_string(),
                ..FileSettings::default()
            },
            ..LoggerSettings::default()
        };
        assert!(matches!(
            settings.into_logger_config(),
            Err(ConfigError::ValidationError { field, .. }) if field == "logger.file.format"
        ));
    }
}
