//! Serve command handler

use crate::config::Settings;
use crate::error::AppResult;
use crate::server::Server;

pub struct ServeCommandHandler {
    config: Settings,
}

impl ServeCommandHandler {
    pub fn new(config: Settings) -> Self {
        Self { config }
    }

    /// Runs the server until a shutdown signal, or only checks the
    /// configuration when `dry_run` is set.
    pub async fn execute(self, dry_run: bool) -> AppResult<()> {
        if dry_run {
            return self.validate_only();
        }

        Server::new(self.config).run().await?;
        Ok(())
    }

    /// Everything `serve` checks before touching the network or database.
    pub fn validate_only(&self) -> AppResult<()> {
        self.config.validate()?;
        println!("✓ Configuration is valid");

        self.config.jwt.validate()?;
        println!("✓ JWT secret is configured");

        println!("✓ Server would bind to: {}", self.config.server.address());
        if self.config.database.in_memory {
            println!("✓ Storage: in memory (data is lost on shutdown)");
        } else {
            println!(
                "✓ Storage: PostgreSQL, pool of {}-{} connections",
                self.config.database.min_connections, self.config.database.max_connections
            );
        }

        println!("Dry run completed successfully");
        Ok(())
    }

    pub fn config(&self) -> &Settings {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    fn valid_config() -> Settings {
        let mut config = Settings::default();
        config.database.url = "postgres://localhost/resume".to_string();
        config.jwt.secret = "a-test-secret-that-is-long-enough-for-hs256".to_string();
        config
    }

    #[tokio::test]
    async fn test_dry_run_accepts_valid_config() {
        let handler = ServeCommandHandler::new(valid_config());
        assert_eq!(handler.config(), &valid_config());
        assert!(handler.execute(true).await.is_ok());
    }

    #[tokio::test]
    async fn test_dry_run_rejects_invalid_port() {
        let mut config = valid_config();
        config.server.port = 0;
        assert!(ServeCommandHandler::new(config).execute(true).await.is_err());
    }

    #[tokio::test]
    async fn test_dry_run_requires_jwt_secret() {
        let mut config = valid_config();
        config.jwt.secret.clear();

        let result = ServeCommandHandler::new(config).execute(true).await;
        assert!(matches!(result, Err(AppError::Configuration { .. })));
    }
}
