//! API module for HTTP handlers, middleware, and DTOs.
//!
//! This module provides the HTTP API layer for the application,
//! including request handlers, middleware components, access policies,
//! the per-action shape table and data transfer objects.

pub mod doc;
pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod permissions;
pub mod routes;
pub mod shapes;
