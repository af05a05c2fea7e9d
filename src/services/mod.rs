//! Business rules on top of the repositories: password hashing and
//! sessions for users; date-range checks, audit stamps and restore rules for
//! experiences.

pub mod experience;
mod user_service;

pub use experience::ExperienceService;
pub use user_service::{Registration, Session, UserService};

use crate::repositories::Repositories;

/// The authenticated user on whose behalf a write happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: i32,
    pub is_admin: bool,
}

#[derive(Clone)]
pub struct Services {
    pub users: UserService,
    pub experiences: ExperienceService,
}

impl Services {
    pub fn new(repos: Repositories) -> Self {
        Self {
            users: UserService::new(repos.users),
            experiences: ExperienceService::new(repos.experiences),
        }
    }
}
