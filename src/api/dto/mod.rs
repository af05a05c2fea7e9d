//! Data Transfer Objects for API requests and responses.
//!
//! DTOs are organized by domain:
//! - `user` / `experience` - writable and readable resource shapes
//! - `auth` - login and token DTOs
//! - `error` - Common error response DTOs
//! - `pagination` - Pagination-related DTOs

mod auth;
mod error;
mod experience;
mod health;
mod pagination;
mod user;

pub use auth::{LoginRequest, RefreshTokenRequest, TokenResponse};
pub use error::ErrorResponse;
pub use experience::{ExperienceReadable, ExperienceWrite};
pub use health::{ComponentHealth, HealthResponse, HealthStatus};
pub use pagination::{Page, PagedResponse, PaginationParams};
pub use user::{UserCreate, UserReadable, UserUpdate};
