//! Response handling and transformation.
//!
//! # Responsibilities
//! - Relay upstream status and JSON body to the caller
//! - Map gateway errors to a generic JSON error body
//!
//! # Design Decisions
//! - Upstream error statuses are passed through, never masked
//! - Gateway failures never leak their cause; it is logged instead

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::gateway::error::NOT_FOUND_MESSAGE;
use crate::gateway::{ForwardedResponse, GatewayError};

/// JSON error payload: `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

impl IntoResponse for ForwardedResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        (self.status(), Json(ErrorBody::new(self.public_message()))).into_response()
    }
}

/// Fallback for every route the gateway does not serve.
pub async fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(ErrorBody::new(NOT_FOUND_MESSAGE))).into_response()
}
