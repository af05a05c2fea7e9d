//! Request id propagation.
//!
//! A caller-supplied `x-request-id` is reused; otherwise a v4 UUID is
//! generated. The id is stored in the request extensions and echoed back on
//! the response.

use axum::{
    extract::Request,
    http::{HeaderMap, HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest caller-supplied id accepted before a fresh one is generated.
const MAX_REQUEST_ID_LEN: usize = 128;

/// Request id stored in request extensions for downstream access.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestId(pub String);

fn incoming_request_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty() && v.len() <= MAX_REQUEST_ID_LEN)
        .map(String::from)
}

pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id =
        incoming_request_id(request.headers()).unwrap_or_else(|| Uuid::new_v4().to_string());

    request
        .extensions_mut()
        .insert(RequestId(request_id.clone()));

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_incoming_id_is_reused() {
        assert_eq!(
            incoming_request_id(&headers("req-42")),
            Some("req-42".to_string())
        );
    }

    #[test]
    fn test_blank_or_oversized_id_is_ignored() {
        assert_eq!(incoming_request_id(&headers("  ")), None);
        assert_eq!(incoming_request_id(&headers(&"x".repeat(200))), None);
        assert_eq!(incoming_request_id(&HeaderMap::new()), None);
    }
}
