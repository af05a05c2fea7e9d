//! State shared by every handler.

use crate::config::{JwtConfig, PaginationConfig};
use crate::db::AsyncDbPool;
use crate::repositories::Repositories;
use crate::services::Services;

/// Clones share the same repositories.
#[derive(Clone)]
pub struct AppState {
    pub services: Services,
    /// Used by the auth middleware and the login/refresh handlers.
    pub jwt_config: JwtConfig,
    pub pagination: PaginationConfig,
}

impl AppState {
    /// PostgreSQL-backed state.
    pub fn new(pool: AsyncDbPool, jwt_config: JwtConfig, pagination: PaginationConfig) -> Self {
        Self::with_repositories(Repositories::new(pool), jwt_config, pagination)
    }

    /// State whose data lives in process memory and is lost on shutdown.
    pub fn in_memory(jwt_config: JwtConfig, pagination: PaginationConfig) -> Self {
        Self::with_repositories(Repositories::in_memory(), jwt_config, pagination)
    }

    fn with_repositories(
        repos: Repositories,
        jwt_config: JwtConfig,
        pagination: PaginationConfig,
    ) -> Self {
        Self {
            services: Services::new(repos),
            jwt_config,
            pagination,
        }
    }
}
