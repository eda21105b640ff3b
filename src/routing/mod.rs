//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Forwarded path segments
//!     → policy.rs (allow-list decision)
//!     → matcher.rs (evaluate prefix conditions)
//!     → Return: allowed or PathNotAllowed
//!
//! Policy Compilation (at startup and on reload):
//!     RouteConfig.allowed_prefixes
//!     → Compile segment matchers
//!     → Freeze as immutable PathPolicy
//! ```
//!
//! # Design Decisions
//! - Compiled once, immutable at runtime
//! - No regex in hot path (segment prefix matching only)
//! - Deterministic: same input always gets the same decision

pub mod matcher;
pub mod policy;

pub use policy::PathPolicy;
