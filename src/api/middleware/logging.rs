//! Request/response logging.
//!
//! Each request runs inside an `http_request` span carrying the method,
//! path and request id, so every event a handler emits is correlated.

use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};
use tracing::{Instrument, Level, info, span, warn};

use super::RequestId;

/// Placeholder used when the request id middleware did not run.
const UNKNOWN_REQUEST_ID: &str = "unknown";

fn request_id_of(request: &Request) -> String {
    request
        .extensions()
        .get::<RequestId>()
        .map(|r| r.0.clone())
        .unwrap_or_else(|| UNKNOWN_REQUEST_ID.to_string())
}

/// Logs the request on arrival and the status with elapsed time on the way
/// out. Server errors are logged at warn level.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let request_id = request_id_of(&request);

    let span = span!(
        Level::INFO,
        "http_request",
        method = %method,
        path = %path,
        request_id = %request_id
    );

    async move {
        info!("Request received");

        let start = Instant::now();
        let response = next.run(request).await;
        let duration_ms = start.elapsed().as_millis();
        let status = response.status().as_u16();

        if response.status().is_server_error() {
            warn!(status, duration_ms, "Response sent");
        } else {
            info!(status, duration_ms, "Response sent");
        }

        response
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn test_request_id_falls_back_to_unknown() {
        let request = Request::builder().body(Body::empty()).unwrap();
        assert_eq!(request_id_of(&request), UNKNOWN_REQUEST_ID);
    }

    #[test]
    fn test_request_id_read_from_extensions() {
        let mut request = Request::builder().body(Body::empty()).unwrap();
        request
            .extensions_mut()
            .insert(RequestId("abc-123".to_string()));
        assert_eq!(request_id_of(&request), "abc-123");
    }
}
