//! Configuration management
//!
//! Settings are layered, lowest priority first:
//! 1. built-in defaults
//! 2. `default.toml`
//! 3. `{environment}.toml`, picked by `RESUME_APP_ENV`
//! 4. `local.toml`, not committed to version control
//! 5. `RESUME_*` environment variables, e.g. `RESUME_JWT__SECRET`

pub mod environment;
pub mod error;
pub mod loader;
pub mod settings;
pub mod validation;

pub use environment::Environment;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use settings::{
    ApplicationConfig, DatabaseConfig, JwtConfig, LoggerSettings, PaginationConfig, ServerConfig,
    Settings,
};
