//! Access policies for the resource endpoints.
//!
//! Every request is a single accept/reject decision made from the caller's
//! role and the action. Rejections are always 403, authenticated or not.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::api::middleware::AuthUser;
use crate::api::shapes::Action;
use crate::error::{AppError, AppResult};
use crate::services::Actor;

const NOT_AUTHENTICATED: &str = "Authentication credentials were not provided.";
const NOT_PERMITTED: &str = "You do not have permission to perform this action.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// Only admins, whatever the action.
    AdminOnly,
    /// Anyone may list and retrieve; everything else needs an admin.
    AdminOrReadOnly,
    /// Any signed-in user.
    Authenticated,
}

impl Policy {
    pub fn allows(self, caller: Option<&AuthUser>, action: Action) -> bool {
        let is_admin = caller.is_some_and(|c| c.is_admin);
        match self {
            Policy::AdminOnly => is_admin,
            Policy::AdminOrReadOnly => action.is_safe() || is_admin,
            Policy::Authenticated => caller.is_some(),
        }
    }
}

/// The possibly anonymous caller, as attached by the auth middleware.
#[derive(Debug, Clone)]
pub struct Caller(pub Option<AuthUser>);

impl<S: Send + Sync> FromRequestParts<S> for Caller {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Caller(parts.extensions.get::<AuthUser>().cloned()))
    }
}

impl Caller {
    /// Fails with 403 unless `policy` lets this caller perform `action`.
    pub fn authorize(&self, policy: Policy, action: Action) -> AppResult<()> {
        if policy.allows(self.0.as_ref(), action) {
            return Ok(());
        }

        let message = match &self.0 {
            None => NOT_AUTHENTICATED,
            Some(_) => NOT_PERMITTED,
        };
        tracing::warn!(
            caller = self.0.as_ref().map(|c| c.username.as_str()).unwrap_or("anonymous"),
            action = ?action,
            policy = ?policy,
            "Permission denied"
        );
        Err(AppError::forbidden(message))
    }

    /// Authorizes, then returns the caller as the acting user.
    pub fn authorize_actor(&self, policy: Policy, action: Action) -> AppResult<Actor> {
        self.authorize(policy, action)?;
        self.0
            .as_ref()
            .map(AuthUser::actor)
            .ok_or_else(|| AppError::forbidden(NOT_AUTHENTICATED))
    }

    pub fn user(&self) -> Option<&AuthUser> {
        self.0.as_ref()
    }
}
