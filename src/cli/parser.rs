//! CLI argument parsing with clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use super::validation::{
    validate_config_file_path, validate_host_address, validate_port, validate_rollback_steps,
};

/// Environment variable the superuser password may be read from
pub const SUPERUSER_PASSWORD_ENV: &str = "RESUME_SUPERUSER_PASSWORD";

/// Résumé service: user accounts and their work experiences over a JSON API
#[derive(Parser, Debug)]
#[command(name = "resume-rs")]
#[command(about = "Résumé service: user accounts and their work experiences over a JSON API")]
#[command(long_about = "
Resume-rs serves user accounts and their work experiences over a JSON API,
backed by PostgreSQL or by process memory for local runs.

EXAMPLES:
    # Start the server with the layered configuration in ./config
    resume-rs serve

    # Start on all interfaces without a database
    resume-rs serve --host 0.0.0.0 --port 8080 --in-memory

    # Use a single configuration file
    resume-rs --config /etc/resume/production.toml serve

    # Check configuration without starting the server
    resume-rs serve --dry-run

    # Apply or preview database migrations
    resume-rs migrate
    resume-rs migrate --dry-run

    # Roll back the last 2 migrations
    resume-rs migrate --rollback 2

    # Create an admin account
    RESUME_SUPERUSER_PASSWORD=secret resume-rs create-superuser --username admin
")]
#[command(version = crate::clap_long_version())]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Configuration file path
    ///
    /// Load this single TOML file instead of the layered files in the
    /// configuration directory. RESUME_* environment variables still apply.
    #[arg(short, long, value_name = "FILE", value_parser = validate_config_file_path)]
    pub config: Option<PathBuf>,

    /// Override environment detection (RESUME_APP_ENV)
    #[arg(short, long, value_enum)]
    pub env: Option<Environment>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Start the web server (default)
    Serve {
        /// Host address to bind to
        #[arg(long, value_name = "ADDRESS", value_parser = validate_host_address)]
        host: Option<String>,

        /// Port number to listen on
        #[arg(short, long, value_name = "PORT", value_parser = validate_port)]
        port: Option<u16>,

        /// Log level override, taking precedence over --verbose and --quiet
        #[arg(long, value_enum)]
        log_level: Option<LogLevel>,

        /// Keep all data in process memory; nothing survives a restart
        #[arg(long)]
        in_memory: bool,

        /// Validate configuration and exit
        #[arg(long)]
        dry_run: bool,
    },
    /// Database migration operations
    Migrate {
        /// Show pending migrations without applying
        #[arg(long, conflicts_with = "rollback")]
        dry_run: bool,

        /// Number of most recent migrations to revert (1-100)
        #[arg(long, value_name = "STEPS", value_parser = validate_rollback_steps)]
        rollback: Option<u32>,
    },
    /// Create an admin account
    CreateSuperuser {
        #[arg(long)]
        username: String,

        #[arg(long)]
        email: Option<String>,

        /// Password; prefer the environment variable over the command line
        #[arg(long, env = SUPERUSER_PASSWORD_ENV, hide_env_values = true)]
        password: String,

        #[arg(long)]
        first_name: Option<String>,

        #[arg(long)]
        last_name: Option<String>,
    },
}

/// Environment options
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    #[value(name = "development", alias = "dev")]
    Development,
    #[value(name = "test")]
    Test,
    #[value(name = "staging", alias = "stage")]
    Staging,
    #[value(name = "production", alias = "prod")]
    Production,
}

/// Log level options
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    #[value(name = "error")]
    Error,
    #[value(name = "warn", alias = "warning")]
    Warn,
    #[value(name = "info")]
    Info,
    #[value(name = "debug")]
    Debug,
    #[value(name = "trace")]
    Trace,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl From<Environment> for crate::config::Environment {
    fn from(env: Environment) -> Self {
        match env {
            Environment::Development => crate::config::Environment::Development,
            Environment::Test => crate::config::Environment::Test,
            Environment::Staging => crate::config::Environment::Staging,
            Environment::Production => crate::config::Environment::Production,
        }
    }
}

impl Cli {
    /// The command to run; no subcommand means `serve` with defaults.
    pub fn command_or_default(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Serve {
            host: None,
            port: None,
            log_level: None,
            in_memory: false,
            dry_run: false,
        })
    }
}
