//! Authentication handlers for login and token refresh.

use axum::{Json, extract::State};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::AUTH_TAG;
use crate::api::dto::{LoginRequest, RefreshTokenRequest, TokenResponse};
use crate::error::AppResult;
use crate::state::AppState;
use crate::utils::validate::ValidatedJson;

/// Creates the authentication routes
///
/// # Routes
/// - `POST /login` - Authenticate and get tokens
/// - `POST /refresh` - Exchange a refresh token for a new pair
pub fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(login))
        .routes(routes!(refresh_token))
}

/// POST /api/v1/auth/login - Authenticate with username and password
#[utoipa::path(
    post,
    path = "/login",
    tag = AUTH_TAG,
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 400, description = "Invalid request data"),
        (status = 401, description = "Invalid credentials")
    )
)]
async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<Json<TokenResponse>> {
    let session = state
        .services
        .users
        .authenticate(&payload.username, &payload.password, &state.jwt_config)
        .await?;

    Ok(Json(TokenResponse::from(session)))
}

/// POST /api/v1/auth/refresh - Refresh the token pair
#[utoipa::path(
    post,
    path = "/refresh",
    tag = AUTH_TAG,
    request_body = RefreshTokenRequest,
    responses(
        (status = 200, description = "Tokens refreshed successfully", body = TokenResponse),
        (status = 401, description = "Invalid or expired refresh token")
    )
)]
async fn refresh_token(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RefreshTokenRequest>,
) -> AppResult<Json<TokenResponse>> {
    let session = state
        .services
        .users
        .refresh(&payload.refresh_token, &state.jwt_config)
        .await?;

    Ok(Json(TokenResponse::from(session)))
}
