//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, middleware, catch-all route)
//!     → request.rs (request ID, path tail, JSON body)
//!     → gateway (forward upstream)
//!     → response.rs (relay status + body, or generic error)
//!     → Send to client
//! ```

pub mod health;
pub mod request;
pub mod response;
pub mod server;

pub use request::{UuidRequestId, X_REQUEST_ID};
pub use response::ErrorBody;
pub use server::HttpServer;
