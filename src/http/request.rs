//! Request handling and transformation.
//!
//! # Responsibilities
//! - Generate unique request ID (UUID v4)
//! - Extract the forwarded path from the raw inbound URI
//! - Read and parse the JSON body for body-bearing methods
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - The path tail is taken from the raw URI, so percent-encoding survives
//! - Bodies of retrieval methods are never read, let alone forwarded

use axum::body::Body;
use axum::http::{HeaderMap, HeaderValue, Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::gateway::{carries_body, ForwardedRequest, GatewayError, PathSegments};

/// Header carrying the per-request correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Generates a fresh UUID v4 for requests that arrive without an ID.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Request ID of an inbound request, or `"unknown"`.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Reduce an inbound request under `route_prefix` to a [`ForwardedRequest`].
pub async fn extract_forwarded(
    request: Request<Body>,
    route_prefix: &str,
    max_body_size: usize,
) -> Result<ForwardedRequest, GatewayError> {
    let (parts, body) = request.into_parts();

    let tail = parts
        .uri
        .path()
        .strip_prefix(route_prefix)
        .ok_or_else(|| {
            GatewayError::InvalidTarget(format!(
                "path {} is outside {}",
                parts.uri.path(),
                route_prefix
            ))
        })?;
    let segments = PathSegments::parse(tail)
        .map_err(|_| GatewayError::PathNotAllowed(tail.to_string()))?;
    let query = parts.uri.query().map(str::to_string);

    let body = if carries_body(&parts.method) {
        let bytes = axum::body::to_bytes(body, max_body_size)
            .await
            .map_err(|e| GatewayError::InvalidBody(e.to_string()))?;
        if bytes.is_empty() {
            None
        } else {
            Some(
                serde_json::from_slice(&bytes)
                    .map_err(|e| GatewayError::InvalidBody(e.to_string()))?,
            )
        }
    } else {
        None
    };

    Ok(ForwardedRequest {
        method: parts.method,
        segments,
        query,
        headers: parts.headers,
        body,
    })
}
