//! User CRUD request handlers.
//!
//! Every action on this resource is admin-only. Write bodies are decoded
//! through the user shape table so that only the create shape ever sees a
//! password.

use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::USER_TAG;
use crate::api::dto::{PagedResponse, PaginationParams, UserCreate, UserReadable, UserUpdate};
use crate::api::permissions::{Caller, Policy};
use crate::api::shapes::{Action, UserInput, UserShape, json_body};
use crate::error::{AppError, AppResult};
use crate::models::UserChanges;
use crate::state::AppState;

const POLICY: Policy = Policy::AdminOnly;

/// Creates user-related routes.
///
/// Routes:
/// - GET /          - List users
/// - POST /         - Create a user
/// - GET /{uuid}    - Retrieve a user
/// - PUT /{uuid}    - Replace a user's profile
/// - PATCH /{uuid}  - Partially update a user's profile
/// - DELETE /{uuid} - Delete a user
pub fn user_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list_users, create_user))
        .routes(routes!(get_user, update_user, partial_update_user, delete_user))
}

/// GET /api/v1/users - List users, newest first
#[utoipa::path(
    get,
    path = "/",
    tag = USER_TAG,
    params(PaginationParams),
    responses(
        (status = 200, description = "Users by page", body = PagedResponse<UserReadable>),
        (status = 403, description = "Caller is not an admin")
    ),
    security(("bearerAuth" = []))
)]
async fn list_users(
    State(state): State<AppState>,
    caller: Caller,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<PagedResponse<UserReadable>>> {
    caller.authorize(POLICY, Action::List)?;

    let page = params.resolve(&state.pagination);
    let (users, count) = state
        .services
        .users
        .list_users_paginated(page.offset(), page.limit())
        .await?;
    let results = users.iter().map(UserReadable::from).collect();

    Ok(Json(PagedResponse::new(results, page, count)))
}

/// POST /api/v1/users - Create a user
#[utoipa::path(
    post,
    path = "/",
    tag = USER_TAG,
    request_body = UserCreate,
    responses(
        (status = 201, description = "User created", body = UserReadable),
        (status = 400, description = "Invalid payload"),
        (status = 403, description = "Caller is not an admin"),
        (status = 409, description = "Username already taken")
    ),
    security(("bearerAuth" = []))
)]
async fn create_user(
    State(state): State<AppState>,
    caller: Caller,
    body: Bytes,
) -> AppResult<(StatusCode, Json<UserReadable>)> {
    caller.authorize(POLICY, Action::Create)?;

    let UserInput::Create(input) = UserShape::decode(Action::Create, json_body(&body)?)? else {
        return Err(unexpected_shape(Action::Create));
    };
    let user = state
        .services
        .users
        .create_user(input.into_registration()?)
        .await?;

    Ok((StatusCode::CREATED, Json(UserReadable::from(&user))))
}

/// GET /api/v1/users/{uuid} - Retrieve a user
#[utoipa::path(
    get,
    path = "/{uuid}",
    tag = USER_TAG,
    params(("uuid" = String, Path, description = "User UUID")),
    responses(
        (status = 200, description = "User found", body = UserReadable),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "User not found")
    ),
    security(("bearerAuth" = []))
)]
async fn get_user(
    State(state): State<AppState>,
    caller: Caller,
    Path(uuid): Path<String>,
) -> AppResult<Json<UserReadable>> {
    caller.authorize(POLICY, Action::Retrieve)?;

    let user = state.services.users.get_by_uuid(&uuid).await?;
    Ok(Json(UserReadable::from(&user)))
}

/// PUT /api/v1/users/{uuid} - Replace a user's profile
#[utoipa::path(
    put,
    path = "/{uuid}",
    tag = USER_TAG,
    params(("uuid" = String, Path, description = "User UUID")),
    request_body = UserUpdate,
    responses(
        (status = 200, description = "User updated", body = UserReadable),
        (status = 400, description = "Invalid payload"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "User not found")
    ),
    security(("bearerAuth" = []))
)]
async fn update_user(
    State(state): State<AppState>,
    caller: Caller,
    Path(uuid): Path<String>,
    body: Bytes,
) -> AppResult<Json<UserReadable>> {
    write_user(state, caller, uuid, Action::Update, body).await
}

/// PATCH /api/v1/users/{uuid} - Partially update a user's profile
#[utoipa::path(
    patch,
    path = "/{uuid}",
    tag = USER_TAG,
    params(("uuid" = String, Path, description = "User UUID")),
    request_body = UserUpdate,
    responses(
        (status = 200, description = "User updated", body = UserReadable),
        (status = 400, description = "Invalid payload"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "User not found")
    ),
    security(("bearerAuth" = []))
)]
async fn partial_update_user(
    State(state): State<AppState>,
    caller: Caller,
    Path(uuid): Path<String>,
    body: Bytes,
) -> AppResult<Json<UserReadable>> {
    write_user(state, caller, uuid, Action::PartialUpdate, body).await
}

/// DELETE /api/v1/users/{uuid} - Delete a user
///
/// Users are removed physically; their experiences go with them.
#[utoipa::path(
    delete,
    path = "/{uuid}",
    tag = USER_TAG,
    params(("uuid" = String, Path, description = "User UUID")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "User not found")
    ),
    security(("bearerAuth" = []))
)]
async fn delete_user(
    State(state): State<AppState>,
    caller: Caller,
    Path(uuid): Path<String>,
) -> AppResult<StatusCode> {
    caller.authorize(POLICY, Action::Destroy)?;

    state.services.users.delete_user(&uuid).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn write_user(
    state: AppState,
    caller: Caller,
    uuid: String,
    action: Action,
    body: Bytes,
) -> AppResult<Json<UserReadable>> {
    caller.authorize(POLICY, action)?;

    let UserInput::Update(input) = UserShape::decode(action, json_body(&body)?)? else {
        return Err(unexpected_shape(action));
    };
    let user = state
        .services
        .users
        .update_user(&uuid, UserChanges::from(input))
        .await?;

    Ok(Json(UserReadable::from(&user)))
}

fn unexpected_shape(action: Action) -> AppError {
    AppError::Internal {
        source: anyhow::anyhow!("unexpected user shape for {:?}", action),
    }
}
