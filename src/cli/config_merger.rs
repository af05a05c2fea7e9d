//! Merges CLI argument overrides into file-based configuration.
//!
//! Command-line flags win over every file and `RESUME_*` variable.

use super::parser::{Cli, Commands};
use crate::config::error::ConfigError;
use crate::config::{ConfigLoader, Settings};

pub struct ConfigurationMerger {
    base_config: Settings,
}

impl ConfigurationMerger {
    pub fn new(base_config: Settings) -> Self {
        Self { base_config }
    }

    /// Loads the base configuration the CLI points at: `--config` selects a
    /// single file and `--env` the environment layer.
    ///
    /// Validation is deferred to [`Self::merge_cli_args`] so that flags can
    /// repair a configuration that would not validate on its own.
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let mut loader = ConfigLoader::new()?;
        if let Some(path) = &cli.config {
            loader = loader.with_config_file(path);
        }
        if let Some(env) = cli.env {
            loader = loader.with_environment(env.into());
        }

        Ok(Self::new(loader.load_unvalidated()?))
    }

    /// Applies global flags, then the command's own flags, then validates.
    pub fn merge_cli_args(&self, cli: &Cli) -> Result<Settings, ConfigError> {
        let mut config = self.base_config.clone();

        if cli.verbose {
            config.logger.level = "debug".to_string();
        } else if cli.quiet {
            config.logger.level = "error".to_string();
        }

        if let Some(Commands::Serve {
            host,
            port,
            log_level,
            in_memory,
            dry_run: _,
        }) = &cli.command
        {
            if let Some(host) = host {
                config.server.host = host.clone();
            }
            if let Some(port) = port {
                config.server.port = *port;
            }
            if let Some(level) = log_level {
                config.logger.level = level.as_str().to_string();
            }
            if *in_memory {
                config.database.in_memory = true;
            }
        }

        config.validate()?;
        Ok(config)
    }

    pub fn config(&self) -> &Settings {
        &self.base_config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn base_config() -> Settings {
        let mut config = Settings::default();
        config.database.url = "postgres://localhost/resume".to_string();
        config
    }

    fn merge(args: &[&str]) -> Result<Settings, ConfigError> {
        let cli = Cli::try_parse_from(args).unwrap();
        ConfigurationMerger::new(base_config()).merge_cli_args(&cli)
    }

    #[test]
    fn test_no_flags_keeps_base() {
        assert_eq!(merge(&["resume-rs"]).unwrap(), base_config());
    }

    #[test]
    fn test_verbose_and_quiet() {
        assert_eq!(merge(&["resume-rs", "-v"]).unwrap().logger.level, "debug");
        assert_eq!(merge(&["resume-rs", "-q"]).unwrap().logger.level, "error");
    }

    #[test]
    fn test_serve_overrides() {
        let config = merge(&[
            "resume-rs",
            "--verbose",
            "serve",
            "--host",
            "0.0.0.0",
            "--port",
            "9000",
            "--log-level",
            "warn",
        ])
        .unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9000);
        // The serve flag beats the global one.
        assert_eq!(config.logger.level, "warn");
    }

    #[test]
    fn test_in_memory_flag_makes_missing_url_acceptable() {
        let cli = Cli::try_parse_from(["resume-rs", "serve", "--in-memory"]).unwrap();
        let merger = ConfigurationMerger::new(Settings::default());
        assert!(merger.config().database.url.is_empty());

        let config = merger.merge_cli_args(&cli).unwrap();
        assert!(config.database.in_memory);

        let cli = Cli::try_parse_from(["resume-rs", "serve"]).unwrap();
        assert!(matches!(
            merger.merge_cli_args(&cli),
            Err(ConfigError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_migrate_leaves_server_alone() {
        let config = merge(&["resume-rs", "migrate", "--dry-run"]).unwrap();
        assert_eq!(config.server, base_config().server);
    }
}
