//! Migrate command handler

use crate::config::Settings;
use crate::db::{pending_migrations, revert_migrations, run_pending_migrations};
use crate::error::{AppError, AppResult};

/// What `migrate` was asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrateAction {
    Apply,
    DryRun,
    Rollback(u32),
}

impl MigrateAction {
    pub fn from_flags(dry_run: bool, rollback: Option<u32>) -> Self {
        match (dry_run, rollback) {
            (true, _) => MigrateAction::DryRun,
            (false, Some(steps)) => MigrateAction::Rollback(steps),
            (false, None) => MigrateAction::Apply,
        }
    }
}

pub struct MigrateCommandHandler {
    config: Settings,
}

impl MigrateCommandHandler {
    pub fn new(config: Settings) -> Self {
        Self { config }
    }

    /// # Errors
    /// - `Validation` when the configuration selects in-memory storage
    /// - `Database` when the connection or a migration fails
    pub async fn execute(&self, action: MigrateAction) -> AppResult<()> {
        let url = self.database_url()?.to_string();

        match action {
            MigrateAction::DryRun => {
                println!("Checking for pending migrations...");
                let pending = pending_migrations(url).await?;
                if pending.is_empty() {
                    println!("✓ No pending migrations - database is up to date");
                } else {
                    println!("Found {} pending migration(s):", pending.len());
                    print_names(&pending);
                    println!("Run without --dry-run to apply them");
                }
            }
            MigrateAction::Apply => {
                println!("Running database migrations...");
                let applied = run_pending_migrations(url).await?;
                if applied.is_empty() {
                    println!("✓ No migrations to apply - database is up to date");
                } else {
                    println!("✓ Applied {} migration(s):", applied.len());
                    print_names(&applied);
                }
            }
            MigrateAction::Rollback(steps) => {
                println!("Rolling back {} migration(s)...", steps);
                let reverted = revert_migrations(url, steps).await?;
                println!("✓ Reverted {} migration(s):", reverted.len());
                print_names(&reverted);
            }
        }

        Ok(())
    }

    fn database_url(&self) -> AppResult<&str> {
        if self.config.database.in_memory {
            return Err(AppError::Validation {
                field: "database.in_memory".to_string(),
                reason: "migrations need a PostgreSQL database".to_string(),
            });
        }
        self.config.database.validate()?;
        Ok(&self.config.database.url)
    }
}

fn print_names(names: &[String]) {
    for name in names {
        println!("  - {}", name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_from_flags() {
        assert_eq!(MigrateAction::from_flags(false, None), MigrateAction::Apply);
        assert_eq!(MigrateAction::from_flags(true, None), MigrateAction::DryRun);
        assert_eq!(
            MigrateAction::from_flags(false, Some(3)),
            MigrateAction::Rollback(3)
        );
    }

    #[tokio::test]
    async fn test_in_memory_storage_is_rejected() {
        let mut config = Settings::default();
        config.database.in_memory = true;

        let result = MigrateCommandHandler::new(config)
            .execute(MigrateAction::Apply)
            .await;
        assert!(matches!(result, Err(AppError::Validation { field, .. }) if field == "database.in_memory"));
    }

    #[tokio::test]
    async fn test_missing_url_is_rejected_before_connecting() {
        let result = MigrateCommandHandler::new(Settings::default())
            .execute(MigrateAction::DryRun)
            .await;
        assert!(matches!(result, Err(AppError::Configuration { key, .. }) if key == "database.url"));
    }
}
