//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Required upstream fields (base URL, API key) are present
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Header names and route prefixes are well formed
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::{HeaderName, HeaderValue};
use thiserror::Error;
use url::Url;

use crate::config::schema::GatewayConfig;

/// A single semantic configuration error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("upstream.base_url is required")]
    MissingBaseUrl,

    #[error("upstream.base_url is not a valid http(s) URL: {0}")]
    InvalidBaseUrl(String),

    #[error("upstream.api_key is required")]
    MissingApiKey,

    #[error("upstream.api_key contains characters not allowed in a header value")]
    InvalidApiKey,

    #[error("upstream.api_key_header is not a valid header name: {0}")]
    InvalidApiKeyHeader(String),

    #[error("upstream.forwarded_headers contains an invalid header name: {0}")]
    InvalidForwardedHeader(String),

    #[error("{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("route.prefix must start with '/' and must not end with '/': {0}")]
    InvalidRoutePrefix(String),

    #[error("route.allowed_prefixes contains an empty entry")]
    EmptyAllowedPrefix,

    #[error("{field} is not a valid socket address: {value}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("security.max_body_size must be greater than zero")]
    ZeroBodyLimit,
}

/// Validate a parsed configuration, collecting every violation.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let upstream = &config.upstream;

    match upstream.base_url.as_deref().map(str::trim) {
        None | Some("") => errors.push(ValidationError::MissingBaseUrl),
        Some(base) => match Url::parse(base) {
            Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => {}
            _ => errors.push(ValidationError::InvalidBaseUrl(base.to_string())),
        },
    }

    match &upstream.api_key {
        None => errors.push(ValidationError::MissingApiKey),
        Some(key) if key.is_blank() => errors.push(ValidationError::MissingApiKey),
        Some(key) => {
            if HeaderValue::from_str(key.expose()).is_err() {
                errors.push(ValidationError::InvalidApiKey);
            }
        }
    }

    if HeaderName::from_bytes(upstream.api_key_header.as_bytes()).is_err() {
        errors.push(ValidationError::InvalidApiKeyHeader(
            upstream.api_key_header.clone(),
        ));
    }

    for name in &upstream.forwarded_headers {
        if HeaderName::from_bytes(name.as_bytes()).is_err() {
            errors.push(ValidationError::InvalidForwardedHeader(name.clone()));
        }
    }

    if upstream.timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("upstream.timeout_secs"));
    }
    if upstream.connect_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("upstream.connect_timeout_secs"));
    }

    let prefix = &config.route.prefix;
    if !prefix.starts_with('/') || prefix.ends_with('/') {
        errors.push(ValidationError::InvalidRoutePrefix(prefix.clone()));
    }
    if config
        .route
        .allowed_prefixes
        .iter()
        .any(|p| p.trim_matches('/').is_empty())
    {
        errors.push(ValidationError::EmptyAllowedPrefix);
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }
    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    if config.security.max_body_size == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
