//! Command handlers, one per subcommand.

pub mod create_superuser;
pub mod migrate;
pub mod serve;

pub use create_superuser::{CreateSuperuserHandler, SuperuserInput};
pub use migrate::{MigrateAction, MigrateCommandHandler};
pub use serve::ServeCommandHandler;
