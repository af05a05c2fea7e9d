//! Current user (me) endpoint.
//!
//! The one user action open to non-admins: any signed-in caller may read
//! their own profile.

use axum::{Json, extract::State};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::USER_TAG;
use crate::api::dto::UserReadable;
use crate::api::permissions::{Caller, Policy};
use crate::api::shapes::Action;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Creates the "me" route, mounted next to the user routes.
///
/// # Routes
/// - `GET /me` - Get the caller's profile
pub fn me_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(get_me))
}

/// GET /api/v1/users/me - Get the caller's profile
#[utoipa::path(
    get,
    path = "/me",
    tag = USER_TAG,
    responses(
        (status = 200, description = "Current user information", body = UserReadable),
        (status = 403, description = "No valid access token")
    ),
    security(("bearerAuth" = []))
)]
async fn get_me(State(state): State<AppState>, caller: Caller) -> AppResult<Json<UserReadable>> {
    caller.authorize(Policy::Authenticated, Action::Custom("me"))?;
    let auth_user = caller
        .user()
        .ok_or_else(|| AppError::forbidden("Authentication credentials were not provided."))?;

    let user = state.services.users.get_user(auth_user.user_id).await?;
    Ok(Json(UserReadable::from(&user)))
}
