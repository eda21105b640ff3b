//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → body limit (tower-http RequestBodyLimitLayer, see http::server)
//!     → gateway forwards only the configured header subset
//!     → headers.rs adds security headers to the response
//! ```
//!
//! # Design Decisions
//! - The upstream API key only ever exists server-side
//! - No client authentication: the gateway is a public read surface

pub mod headers;

pub use headers::with_security_headers;
