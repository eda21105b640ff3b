//! Proxy gateway core.
//!
//! # Data Flow
//! ```text
//! ForwardedRequest (method, segments, query, headers, body)
//!     → routing::PathPolicy (allow-list, optional)
//!     → target.rs (normalized base + joined segments)
//!     → forward.rs (inject API key, send, parse JSON)
//!     → ForwardedResponse (upstream status + body) or GatewayError
//! ```
//!
//! # Design Decisions
//! - No shared mutable state: one `Gateway` serves all requests concurrently
//! - Connection pooling is left to `reqwest`
//! - Upstream timeout is explicit and configurable; no retries

pub mod error;
pub mod forward;
pub mod target;

pub use error::GatewayError;
pub use forward::{carries_body, ForwardedRequest, ForwardedResponse, Gateway};
pub use target::{normalize_base, PathSegments, UpstreamTarget};
