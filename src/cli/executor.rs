//! Dispatches a parsed command to its handler.

use super::handlers::{
    CreateSuperuserHandler, MigrateAction, MigrateCommandHandler, ServeCommandHandler,
    SuperuserInput,
};
use super::parser::{Cli, Commands};
use crate::config::Settings;
use crate::error::AppResult;

/// Runs the command in `cli` with merged and validated `settings`.
pub async fn execute_command(cli: &Cli, settings: Settings) -> AppResult<()> {
    match cli.command_or_default() {
        Commands::Serve { dry_run, .. } => {
            ServeCommandHandler::new(settings).execute(dry_run).await
        }
        Commands::Migrate { dry_run, rollback } => {
            MigrateCommandHandler::new(settings)
                .execute(MigrateAction::from_flags(dry_run, rollback))
                .await
        }
        Commands::CreateSuperuser {
            username,
            email,
            password,
            first_name,
            last_name,
        } => {
            let handler = CreateSuperuserHandler::from_settings(&settings).await?;
            let user = handler
                .execute(SuperuserInput {
                    username,
                    email,
                    password,
                    first_name,
                    last_name,
                })
                .await?;
            println!("✓ Superuser '{}' created ({})", user.username, user.uuid);
            Ok(())
        }
    }
}
