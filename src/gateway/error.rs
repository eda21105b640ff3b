//! Gateway error taxonomy.

use axum::http::StatusCode;
use thiserror::Error;

/// Generic body message for every gateway-internal failure.
pub const INTERNAL_ERROR_MESSAGE: &str = "Terjadi kesalahan pada server";
/// Body message for malformed inbound requests.
pub const BAD_REQUEST_MESSAGE: &str = "Permintaan tidak valid";
/// Body message for paths the gateway does not expose.
pub const NOT_FOUND_MESSAGE: &str = "Endpoint tidak ditemukan";

/// Errors raised while forwarding a request upstream.
///
/// Upstream responses with a non-2xx status are not errors: they are relayed
/// as-is. Only failures of the gateway itself end up here.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Required configuration is missing or unusable.
    #[error("configuration error: {0}")]
    Config(String),

    /// The upstream URL could not be built from the inbound path.
    #[error("invalid upstream target: {0}")]
    InvalidTarget(String),

    /// The path is outside the configured allow-list.
    #[error("path not allowed: {0}")]
    PathNotAllowed(String),

    /// The inbound body could not be read or is not JSON.
    #[error("invalid request body: {0}")]
    InvalidBody(String),

    /// The upstream did not answer within the configured timeout.
    #[error("upstream request timed out: {0}")]
    Timeout(#[source] reqwest::Error),

    /// Connection refused, reset, DNS failure and similar.
    #[error("upstream transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// The upstream answered with a body that is not JSON.
    #[error("upstream returned a non-JSON body (status {status}): {source}")]
    MalformedResponse {
        status: u16,
        #[source]
        source: serde_json::Error,
    },
}

impl GatewayError {
    /// Classify a client error as timeout or transport failure.
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GatewayError::Timeout(err)
        } else {
            GatewayError::Transport(err)
        }
    }

    /// Status code reported to the caller.
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::InvalidTarget(_) | GatewayError::InvalidBody(_) => {
                StatusCode::BAD_REQUEST
            }
            GatewayError::PathNotAllowed(_) => StatusCode::NOT_FOUND,
            GatewayError::Config(_)
            | GatewayError::Timeout(_)
            | GatewayError::Transport(_)
            | GatewayError::MalformedResponse { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show the caller. Never includes the cause.
    pub fn public_message(&self) -> &'static str {
        match self.status() {
            StatusCode::BAD_REQUEST => BAD_REQUEST_MESSAGE,
            StatusCode::NOT_FOUND => NOT_FOUND_MESSAGE,
            _ => INTERNAL_ERROR_MESSAGE,
        }
    }

    /// Short label used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::Config(_) => "config",
            GatewayError::InvalidTarget(_) => "invalid_target",
            GatewayError::PathNotAllowed(_) => "path_not_allowed",
            GatewayError::InvalidBody(_) => "invalid_body",
            GatewayError::Timeout(_) => "timeout",
            GatewayError::Transport(_) => "transport",
            GatewayError::MalformedResponse { .. } => "malformed_response",
        }
    }
}
