//! HTTP request handlers for API endpoints.
//!
//! This module contains all request handlers organized by resource type.

pub mod auth;
pub mod experiences;
pub mod health;
pub mod me;
pub mod users;
