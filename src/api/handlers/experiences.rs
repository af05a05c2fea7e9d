//! Experience request handlers.
//!
//! Anyone may list and retrieve live experiences; every other action needs
//! an admin. Writes are stamped with the acting admin.

use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use utoipa::IntoParams;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::EXPERIENCE_TAG;
use crate::api::dto::{ExperienceReadable, ExperienceWrite, PagedResponse, PaginationParams};
use crate::api::permissions::{Caller, Policy};
use crate::api::shapes::{Action, ExperienceShape, json_body};
use crate::error::AppResult;
use crate::models::{DeleteMode, Visibility};
use crate::state::AppState;

const POLICY: Policy = Policy::AdminOrReadOnly;

/// Query parameters for deleting an experience.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct DeleteParams {
    /// Remove the row physically instead of marking it deleted
    #[param(default = false)]
    pub hard: Option<bool>,
}

/// Creates experience-related routes.
///
/// Routes:
/// - GET /                - List live experiences
/// - POST /               - Create an experience
/// - GET /deleted         - List soft-deleted experiences
/// - GET /{uuid}          - Retrieve a live experience
/// - PUT /{uuid}          - Replace an experience
/// - PATCH /{uuid}        - Partially update an experience
/// - DELETE /{uuid}       - Soft delete, or hard delete with `?hard=true`
/// - POST /{uuid}/restore - Restore a soft-deleted experience
pub fn experience_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(list_experiences, create_experience))
        .routes(routes!(list_deleted_experiences))
        .routes(routes!(
            get_experience,
            update_experience,
            partial_update_experience,
            delete_experience
        ))
        .routes(routes!(restore_experience))
}

async fn list_in(
    state: &AppState,
    visibility: Visibility,
    params: &PaginationParams,
) -> AppResult<PagedResponse<ExperienceReadable>> {
    let page = params.resolve(&state.pagination);
    let (experiences, count) = state
        .services
        .experiences
        .list_paginated(visibility, page.offset(), page.limit())
        .await?;
    let results = experiences.iter().map(ExperienceReadable::from).collect();

    Ok(PagedResponse::new(results, page, count))
}

/// GET /api/v1/experiences - List live experiences, newest first
#[utoipa::path(
    get,
    path = "/",
    tag = EXPERIENCE_TAG,
    params(PaginationParams),
    responses(
        (status = 200, description = "Experiences by page", body = PagedResponse<ExperienceReadable>)
    )
)]
async fn list_experiences(
    State(state): State<AppState>,
    caller: Caller,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<PagedResponse<ExperienceReadable>>> {
    caller.authorize(POLICY, Action::List)?;
    Ok(Json(list_in(&state, Visibility::Active, &params).await?))
}

/// POST /api/v1/experiences - Create an experience owned by the caller
#[utoipa::path(
    post,
    path = "/",
    tag = EXPERIENCE_TAG,
    request_body = ExperienceWrite,
    responses(
        (status = 201, description = "Experience created", body = ExperienceReadable),
        (status = 400, description = "Invalid payload or date range"),
        (status = 403, description = "Caller is not an admin")
    ),
    security(("bearerAuth" = []))
)]
async fn create_experience(
    State(state): State<AppState>,
    caller: Caller,
    body: Bytes,
) -> AppResult<(StatusCode, Json<ExperienceReadable>)> {
    let actor = caller.authorize_actor(POLICY, Action::Create)?;

    let input = ExperienceShape::decode(Action::Create, json_body(&body)?)?;
    let experience = state
        .services
        .experiences
        .create(actor, input.into_draft()?)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ExperienceReadable::from(&experience)),
    ))
}

/// GET /api/v1/experiences/deleted - List soft-deleted experiences
#[utoipa::path(
    get,
    path = "/deleted",
    tag = EXPERIENCE_TAG,
    params(PaginationParams),
    responses(
        (status = 200, description = "Deleted experiences by page", body = PagedResponse<ExperienceReadable>),
        (status = 403, description = "Caller is not an admin")
    ),
    security(("bearerAuth" = []))
)]
async fn list_deleted_experiences(
    State(state): State<AppState>,
    caller: Caller,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<PagedResponse<ExperienceReadable>>> {
    caller.authorize(POLICY, Action::Custom("deleted"))?;
    Ok(Json(list_in(&state, Visibility::DeletedOnly, &params).await?))
}

/// GET /api/v1/experiences/{uuid} - Retrieve a live experience
#[utoipa::path(
    get,
    path = "/{uuid}",
    tag = EXPERIENCE_TAG,
    params(("uuid" = String, Path, description = "Experience UUID")),
    responses(
        (status = 200, description = "Experience found", body = ExperienceReadable),
        (status = 404, description = "Experience not found")
    )
)]
async fn get_experience(
    State(state): State<AppState>,
    caller: Caller,
    Path(uuid): Path<String>,
) -> AppResult<Json<ExperienceReadable>> {
    caller.authorize(POLICY, Action::Retrieve)?;

    let experience = state.services.experiences.get(&uuid).await?;
    Ok(Json(ExperienceReadable::from(&experience)))
}

/// PUT /api/v1/experiences/{uuid} - Replace an experience
#[utoipa::path(
    put,
    path = "/{uuid}",
    tag = EXPERIENCE_TAG,
    params(("uuid" = String, Path, description = "Experience UUID")),
    request_body = ExperienceWrite,
    responses(
        (status = 200, description = "Experience updated", body = ExperienceReadable),
        (status = 400, description = "Invalid payload or date range"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Experience not found")
    ),
    security(("bearerAuth" = []))
)]
async fn update_experience(
    State(state): State<AppState>,
    caller: Caller,
    Path(uuid): Path<String>,
    body: Bytes,
) -> AppResult<Json<ExperienceReadable>> {
    let actor = caller.authorize_actor(POLICY, Action::Update)?;

    let input = ExperienceShape::decode(Action::Update, json_body(&body)?)?;
    let experience = state
        .services
        .experiences
        .update(&uuid, actor, input.into_draft()?)
        .await?;

    Ok(Json(ExperienceReadable::from(&experience)))
}

/// PATCH /api/v1/experiences/{uuid} - Partially update an experience
///
/// The patch is merged into the stored record before the date range is
/// checked.
#[utoipa::path(
    patch,
    path = "/{uuid}",
    tag = EXPERIENCE_TAG,
    params(("uuid" = String, Path, description = "Experience UUID")),
    request_body = ExperienceWrite,
    responses(
        (status = 200, description = "Experience updated", body = ExperienceReadable),
        (status = 400, description = "Invalid payload or date range"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Experience not found")
    ),
    security(("bearerAuth" = []))
)]
async fn partial_update_experience(
    State(state): State<AppState>,
    caller: Caller,
    Path(uuid): Path<String>,
    body: Bytes,
) -> AppResult<Json<ExperienceReadable>> {
    let actor = caller.authorize_actor(POLICY, Action::PartialUpdate)?;

    let input = ExperienceShape::decode(Action::PartialUpdate, json_body(&body)?)?;
    let experience = state
        .services
        .experiences
        .partial_update(&uuid, actor, input.into_patch()?)
        .await?;

    Ok(Json(ExperienceReadable::from(&experience)))
}

/// DELETE /api/v1/experiences/{uuid} - Delete an experience
#[utoipa::path(
    delete,
    path = "/{uuid}",
    tag = EXPERIENCE_TAG,
    params(
        ("uuid" = String, Path, description = "Experience UUID"),
        DeleteParams
    ),
    responses(
        (status = 204, description = "Experience deleted"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "Experience not found")
    ),
    security(("bearerAuth" = []))
)]
async fn delete_experience(
    State(state): State<AppState>,
    caller: Caller,
    Path(uuid): Path<String>,
    Query(params): Query<DeleteParams>,
) -> AppResult<StatusCode> {
    let actor = caller.authorize_actor(POLICY, Action::Destroy)?;

    let mode = DeleteMode::from_hard_flag(params.hard.unwrap_or(false));
    state.services.experiences.delete(&uuid, actor, mode).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/experiences/{uuid}/restore - Restore a soft-deleted experience
#[utoipa::path(
    post,
    path = "/{uuid}/restore",
    tag = EXPERIENCE_TAG,
    params(("uuid" = String, Path, description = "Experience UUID")),
    responses(
        (status = 200, description = "Experience restored", body = ExperienceReadable),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "No deleted experience with this UUID")
    ),
    security(("bearerAuth" = []))
)]
async fn restore_experience(
    State(state): State<AppState>,
    caller: Caller,
    Path(uuid): Path<String>,
) -> AppResult<Json<ExperienceReadable>> {
    let actor = caller.authorize_actor(Policy::AdminOnly, Action::Custom("restore"))?;

    let experience = state.services.experiences.restore(&uuid, actor).await?;
    Ok(Json(ExperienceReadable::from(&experience)))
}
