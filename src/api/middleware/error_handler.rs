//! Error handler for converting AppError to HTTP responses.
//!
//! Handlers return `AppError` and this module turns it into the standard
//! [`ErrorResponse`] body. [`global_error_handler`] catches the remaining
//! plain-text error responses produced by axum itself (unknown routes,
//! query rejections, wrong methods) and rewrites them into the same format.

use axum::{
    Json,
    extract::Request,
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::api::dto::ErrorResponse;
use crate::api::middleware::RequestId;
use crate::error::AppError;

/// Largest plain-text error body that is folded into the JSON message.
const MAX_PLAIN_BODY: usize = 64 * 1024;

/// Maps an AppError variant to its corresponding HTTP status code.
pub fn error_to_status_code(error: &AppError) -> StatusCode {
    match error {
        AppError::NotFound { .. } => StatusCode::NOT_FOUND,
        AppError::Duplicate { .. } => StatusCode::CONFLICT,
        AppError::Validation { .. } => StatusCode::BAD_REQUEST,
        AppError::ValidationErrors { .. } => StatusCode::BAD_REQUEST,
        AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        AppError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
        AppError::Forbidden { .. } => StatusCode::FORBIDDEN,
        AppError::Database { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        AppError::Configuration { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        AppError::ConnectionPool { .. } => StatusCode::SERVICE_UNAVAILABLE,
        AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Maps an AppError variant to its error code string.
pub fn error_to_code(error: &AppError) -> &'static str {
    match error {
        AppError::NotFound { .. } => "NOT_FOUND",
        AppError::Duplicate { .. } => "DUPLICATE_ENTRY",
        AppError::Validation { .. } | AppError::ValidationErrors { .. } => "VALIDATION_ERROR",
        AppError::BadRequest { .. } => "BAD_REQUEST",
        AppError::Unauthorized { .. } => "UNAUTHORIZED",
        AppError::Forbidden { .. } => "FORBIDDEN",
        AppError::Database { .. } => "DATABASE_ERROR",
        AppError::Configuration { .. } => "CONFIGURATION_ERROR",
        AppError::ConnectionPool { .. } => "SERVICE_UNAVAILABLE",
        AppError::Internal { .. } => "INTERNAL_ERROR",
    }
}

fn error_body(error: &AppError) -> ErrorResponse {
    let code = error_to_code(error);
    match error {
        AppError::NotFound { entity, .. } => {
            ErrorResponse::new(code, &format!("No {} matches the given query.", entity))
        }
        AppError::Duplicate {
            entity,
            field,
            value,
        } => ErrorResponse::new(
            code,
            &format!("A {} with {} '{}' already exists.", entity, field, value),
        )
        .with_details(json!({ "field": field })),
        AppError::Validation { field, reason } => {
            ErrorResponse::validation(vec![format!("{}: {}", field, reason)])
        }
        AppError::ValidationErrors { errors } => ErrorResponse::validation(errors.clone()),
        AppError::BadRequest { message }
        | AppError::Unauthorized { message }
        | AppError::Forbidden { message } => ErrorResponse::new(code, message),
        AppError::Database { operation, .. } => {
            ErrorResponse::new(code, "Database operation failed")
                .with_details(json!({ "operation": operation }))
        }
        AppError::Configuration { key, .. } => {
            ErrorResponse::new(code, "Configuration error").with_details(json!({ "key": key }))
        }
        AppError::ConnectionPool { .. } => {
            ErrorResponse::new(code, "Database connection unavailable")
        }
        AppError::Internal { .. } => ErrorResponse::new(code, "An internal error occurred"),
    }
}

impl IntoResponse for AppError {
    /// Server-side failures are logged with their source chain; the body
    /// only carries a sanitized message.
    fn into_response(self) -> Response {
        let status = error_to_status_code(&self);
        if status.is_server_error() {
            tracing::error!(error = ?self, "Request failed");
        }

        (status, Json(error_body(&self))).into_response()
    }
}

/// Rewrites non-JSON error responses into [`ErrorResponse`] bodies and tags
/// them with the request id.
pub async fn global_error_handler(request: Request, next: Next) -> Response {
    let request_id = request.extensions().get::<RequestId>().map(|r| r.0.clone());
    let response = next.run(request).await;

    let status = response.status();
    if !(status.is_client_error() || status.is_server_error()) {
        return response;
    }

    let is_json = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("application/json"));
    if is_json {
        return response;
    }

    let (_parts, body) = response.into_parts();
    let original = axum::body::to_bytes(body, MAX_PLAIN_BODY)
        .await
        .map(|bytes| String::from_utf8_lossy(&bytes).trim().to_string())
        .unwrap_or_default();

    let code = match status {
        StatusCode::BAD_REQUEST => "BAD_REQUEST",
        StatusCode::NOT_FOUND => "NOT_FOUND",
        StatusCode::METHOD_NOT_ALLOWED => "METHOD_NOT_ALLOWED",
        StatusCode::UNSUPPORTED_MEDIA_TYPE => "UNSUPPORTED_MEDIA_TYPE",
        StatusCode::PAYLOAD_TOO_LARGE => "PAYLOAD_TOO_LARGE",
        StatusCode::SERVICE_UNAVAILABLE => "SERVICE_UNAVAILABLE",
        s if s.is_server_error() => "INTERNAL_SERVER_ERROR",
        _ => "UNKNOWN_ERROR",
    };
    let message = if original.is_empty() {
        status.canonical_reason().unwrap_or("Error").to_string()
    } else {
        original
    };

    let mut body = ErrorResponse::new(code, &message);
    if let Some(id) = request_id {
        body = body.with_request_id(&id);
    }
    (status, Json(body)).into_response()
}
