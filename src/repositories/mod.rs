//! Repository layer for data access operations.
//!
//! Each entity has a repository trait with a PostgreSQL implementation and
//! an in-memory implementation. Handlers and services only see the traits.

mod experience_repo;
mod memory;
mod user_repo;

pub use experience_repo::PgExperienceRepository;
pub use memory::{AuditedStore, MemoryExperienceRepository, MemoryUserRepository};
pub use user_repo::PgUserRepository;

use std::sync::Arc;

use async_trait::async_trait;

use crate::db::AsyncDbPool;
use crate::error::AppResult;
use crate::models::{DeleteMode, Experience, NewExperience, NewUser, User, Visibility};

/// Storage operations for user accounts.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts a user and returns it with its generated id.
    async fn create(&self, new_user: NewUser) -> AppResult<User>;

    async fn find_by_id(&self, id: i32) -> AppResult<Option<User>>;

    async fn find_by_uuid(&self, uuid: &str) -> AppResult<Option<User>>;

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;

    /// Lists users newest `date_joined` first.
    ///
    /// # Returns
    /// A tuple of (users, total_count)
    async fn list_paginated(&self, offset: i64, limit: i64) -> AppResult<(Vec<User>, i64)>;

    /// Writes the profile fields of `user` back, matched by id.
    async fn update(&self, user: &User) -> AppResult<User>;

    /// Physically removes a user.
    ///
    /// # Returns
    /// The number of affected rows (0 or 1)
    async fn delete(&self, id: i32) -> AppResult<usize>;

    /// Round-trips to the backing store.
    async fn ping(&self) -> AppResult<()>;
}

/// Storage operations for experiences, honouring the soft-delete views.
#[async_trait]
pub trait ExperienceRepository: Send + Sync {
    async fn create(&self, new_experience: NewExperience) -> AppResult<Experience>;

    async fn find_by_uuid(
        &self,
        uuid: &str,
        visibility: Visibility,
    ) -> AppResult<Option<Experience>>;

    /// Lists experiences newest `created_at` first.
    ///
    /// # Returns
    /// A tuple of (experiences, total_count) within the given view
    async fn list_paginated(
        &self,
        visibility: Visibility,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<Experience>, i64)>;

    /// Writes the mutable fields and update stamp of `experience`, matched by id.
    async fn update(&self, experience: &Experience) -> AppResult<Experience>;

    /// Soft delete stamps `actor` and now on a live row; hard delete removes
    /// the row whatever its state.
    ///
    /// # Returns
    /// `true` when a row was affected
    async fn delete(&self, uuid: &str, actor: i32, mode: DeleteMode) -> AppResult<bool>;

    /// Clears the delete marker unconditionally.
    async fn restore(&self, uuid: &str) -> AppResult<Option<Experience>>;
}

/// Aggregates all repositories for convenient access.
///
/// Cloning is cheap; every repository sits behind an `Arc`.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub experiences: Arc<dyn ExperienceRepository>,
}

impl Repositories {
    /// Creates PostgreSQL-backed repositories sharing one pool.
    ///
    /// # Arguments
    /// * `pool` - The async database connection pool
    pub fn new(pool: AsyncDbPool) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(pool.clone())),
            experiences: Arc::new(PgExperienceRepository::new(pool)),
        }
    }

    /// Creates process-local repositories with no database behind them.
    pub fn in_memory() -> Self {
        let experiences = Arc::new(MemoryExperienceRepository::new());
        Self {
            users: Arc::new(MemoryUserRepository::with_experiences(experiences.clone())),
            experiences,
        }
    }
}
