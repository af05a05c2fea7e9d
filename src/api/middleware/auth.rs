//! JWT authentication middleware.
//!
//! Every request passes through [`optional_auth_middleware`]; it attaches an
//! [`AuthUser`] when a valid access token belongs to an active account and
//! otherwise lets the request continue anonymously. Handlers decide what
//! anonymous callers may do.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use serde::{Deserialize, Serialize};

use crate::models::User;
use crate::services::Actor;
use crate::state::AppState;

/// Extension type for authenticated user information
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: i32,
    pub uuid: String,
    pub username: String,
    pub is_admin: bool,
}

impl From<&User> for AuthUser {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            uuid: user.uuid.clone(),
            username: user.username.clone(),
            is_admin: user.is_admin,
        }
    }
}

impl AuthUser {
    pub fn actor(&self) -> Actor {
        Actor {
            id: self.user_id,
            is_admin: self.is_admin,
        }
    }
}

/// Bearer token from the `Authorization` header, if well formed.
fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
}

/// Optional JWT authentication middleware
///
/// A bad token, or one whose account is gone or inactive, leaves the
/// request anonymous. The role is read from the account, not the token.
pub async fn optional_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_user = match bearer_token(&request) {
        Some(token) => match state
            .services
            .users
            .authorize(token, &state.jwt_config)
            .await
        {
            Ok(user) => Some(AuthUser::from(&user)),
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring bearer token");
                None
            }
        },
        None => None,
    };

    if let Some(user) = auth_user {
        request.extensions_mut().insert(user);
    }

    next.run(request).await
}
