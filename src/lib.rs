//! Donghua catalog API gateway library.
//!
//! Forwards `/api/donghua/*` to an upstream content API, injecting the
//! server-held API key so it never reaches the browser.

pub mod config;
pub mod gateway;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod routing;
pub mod security;

pub use config::schema::GatewayConfig;
pub use gateway::{Gateway, GatewayError};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
