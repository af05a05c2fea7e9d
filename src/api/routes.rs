//! Router configuration for the API.
//!
//! This module provides centralized route registration, the OpenAPI
//! document and middleware configuration for the application.

use std::time::Duration;

use axum::{Router, http::StatusCode, middleware};
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, normalize_path::NormalizePath,
    timeout::TimeoutLayer,
};
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::doc::ApiDoc;
use crate::api::handlers;
use crate::api::middleware::{
    global_error_handler, logging_middleware, optional_auth_middleware, request_id_middleware,
};
use crate::state::AppState;

pub const API_PREFIX: &str = "/api/v1";
pub const OPENAPI_JSON_PATH: &str = "/api-docs/openapi.json";
pub const SWAGGER_UI_PATH: &str = "/swagger-ui";

/// Creates the main application router with all routes and middleware.
///
/// # Middleware Order
/// Outermost first:
/// 1. Request ID - generates/propagates request IDs
/// 2. Logging - logs requests with request IDs
/// 3. Global error handler - turns plain-text errors into JSON
/// 4. CORS, compression and the request timeout
/// 5. Optional auth - attaches the caller when a valid token is sent
///
/// # Routes
/// - `/api/v1/users` - User CRUD operations and `/me`
/// - `/api/v1/experiences` - Experience CRUD, soft delete and restore
/// - `/api/v1/auth` - Login and token refresh
/// - `/health`, `/health/live` - Health checks
/// - `/swagger-ui`, `/api-docs/openapi.json` - API documentation
pub fn create_router(state: AppState, request_timeout: Duration) -> Router {
    let api_routes = OpenApiRouter::new()
        .nest(
            "/users",
            handlers::me::me_routes().merge(handlers::users::user_routes()),
        )
        .nest("/experiences", handlers::experiences::experience_routes())
        .nest("/auth", handlers::auth::auth_routes());

    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .nest(API_PREFIX, api_routes)
        .merge(handlers::health::health_routes())
        .split_for_parts();

    router
        .merge(SwaggerUi::new(SWAGGER_UI_PATH).url(OPENAPI_JSON_PATH, api))
        // Middleware is applied in reverse order - last added runs first
        .layer(middleware::from_fn_with_state(
            state.clone(),
            optional_auth_middleware,
        ))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(middleware::from_fn(global_error_handler))
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}

/// Wraps the router so that `/users/` and `/users` reach the same route.
///
/// Serve with `axum::ServiceExt::<Request>::into_make_service`; the path
/// is rewritten before routing happens.
pub fn create_app(state: AppState, request_timeout: Duration) -> NormalizePath<Router> {
    NormalizePath::trim_trailing_slash(create_router(state, request_timeout))
}
