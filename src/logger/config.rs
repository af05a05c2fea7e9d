use std::path::PathBuf;
use std::str::FromStr;

use tracing::Level;

use crate::logger::error::LoggerError;

/// Resolved logger settings, built from the `[logger]` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggerConfig {
    /// trace, debug, info, warn or error
    pub level: String,
    pub console: ConsoleConfig,
    pub file: FileConfig,
}

impl LoggerConfig {
    pub fn validate(&self) -> Result<(), LoggerError> {
        if !self.console.enabled && !self.file.enabled {
            return Err(LoggerError::config("console and file output are both disabled"));
        }
        if self.file.enabled && self.file.path.as_os_str().is_empty() {
            return Err(LoggerError::config("file output is enabled without a path"));
        }
        if self.level.parse::<Level>().is_err() {
            return Err(LoggerError::config(format!(
                "'{}' is not a log level",
                self.level
            )));
        }
        Ok(())
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            console: ConsoleConfig {
                enabled: true,
                colored: true,
            },
            file: FileConfig {
                enabled: false,
                path: PathBuf::from("logs/resume.log"),
                format: LogFormat::Json,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleConfig {
    pub enabled: bool,
    /// ANSI colours, honoured only when stdout is a terminal
    pub colored: bool,
}

/// The file is always opened in append mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileConfig {
    pub enabled: bool,
    pub path: PathBuf,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Full,
    Compact,
    Json,
}

impl FromStr for LogFormat {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("full") {
            Ok(LogFormat::Full)
        } else if s.eq_ignore_ascii_case("compact") {
            Ok(LogFormat::Compact)
        } else if s.eq_ignore_ascii_case("json") {
            Ok(LogFormat::Json)
        } else {
            Err(LoggerError::format(format!(
                "'{}' is not one of full, compact, json",
                s
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_from_str() {
        assert_eq!("full".parse::<LogFormat>().unwrap(), LogFormat::Full);
        assert_eq!("COMPACT".parse::<LogFormat>().unwrap(), LogFormat::Compact);
        assert_eq!("Json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert!(matches!(
            "xml".parse::<LogFormat>(),
            Err(LoggerError::Format { .. })
        ));
    }

    #[test]
    fn test_no_output_is_rejected() {
        let mut config = LoggerConfig::default();
        config.console.enabled = false;
        assert!(config.validate().is_err());

        config.file.enabled = true;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_enabled_file_needs_path() {
        let mut config = LoggerConfig::default();
        config.file.enabled = true;
        config.file.path = PathBuf::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_level_validation() {
        let mut config = LoggerConfig::default();
        assert!(config.validate().is_ok());

        config.level = "WARN".to_string();
        assert!(config.validate().is_ok());

        config.level = "loud".to_string();
        assert!(config.validate().is_err());
    }
}
