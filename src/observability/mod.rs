//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Gateway and HTTP layer produce:
//!     → logging.rs (structured log events, request-id spans)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout, pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through logs, upstream calls and responses
//! - Failure causes are logged here, never returned to callers

pub mod logging;
pub mod metrics;
