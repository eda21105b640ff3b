//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the catch-all proxy route
//! - Wire up middleware (request ID, tracing, body limit, security headers)
//! - Bind server to a plain or TLS listener
//! - Hand inbound requests to the gateway and relay the result
//! - Swap the gateway when a reloaded configuration arrives

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::{IntoResponse, Response},
    routing::{any, get},
    Router,
};
use axum_server::tls_rustls::RustlsConfig;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::{validate_config, ConfigError, GatewayConfig};
use crate::gateway::{Gateway, GatewayError};
use crate::http::health::get_health;
use crate::http::request::{extract_forwarded, request_id, UuidRequestId};
use crate::http::response::not_found;
use crate::observability::metrics;
use crate::security::with_security_headers;

/// How long in-flight TLS connections may drain after a shutdown signal.
const TLS_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<ArcSwap<Gateway>>,
    pub route_prefix: Arc<str>,
    pub max_body_size: usize,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
    gateway: Arc<ArcSwap<Gateway>>,
}

impl HttpServer {
    /// Validate `config` and build the server. Fails fast when the upstream
    /// base URL or API key is missing.
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        validate_config(&config)
            .map_err(|errors| GatewayError::Config(ConfigError::Validation(errors).to_string()))?;

        let gateway = Arc::new(ArcSwap::from_pointee(Gateway::from_config(&config)?));

        let state = AppState {
            gateway: gateway.clone(),
            route_prefix: Arc::from(config.route.prefix.as_str()),
            max_body_size: config.security.max_body_size,
        };

        let router = Self::build_router(&config, state);
        Ok(Self {
            router,
            config,
            gateway,
        })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let proxy_route = format!("{}/{{*path}}", config.route.prefix);

        let mut router = Router::new()
            .route("/healthz", get(get_health))
            .route(&proxy_route, any(proxy_handler))
            .fallback(not_found)
            .with_state(state);

        if config.security.enable_headers {
            router = with_security_headers(router);
        }

        router.layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(RequestBodyLimitLayer::new(config.security.max_body_size)),
        )
    }

    /// The fully layered router, for serving or driving in tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Handle to the live gateway; reloads swap what it points to.
    pub fn gateway(&self) -> Arc<ArcSwap<Gateway>> {
        self.gateway.clone()
    }

    /// Get a reference to the config the server was started with.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Serve plain HTTP on `listener` until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        config_updates: mpsc::UnboundedReceiver<GatewayConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            prefix = %self.config.route.prefix,
            upstream = %self.gateway.load().target().base(),
            "HTTP server starting"
        );

        let reload = tokio::spawn(apply_config_updates(self.gateway.clone(), config_updates));

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        reload.abort();
        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Serve HTTPS on `addr` until `shutdown` fires.
    pub async fn run_tls(
        self,
        addr: SocketAddr,
        tls: RustlsConfig,
        config_updates: mpsc::UnboundedReceiver<GatewayConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        tracing::info!(
            address = %addr,
            prefix = %self.config.route.prefix,
            upstream = %self.gateway.load().target().base(),
            "HTTPS server starting"
        );

        let handle = axum_server::Handle::new();
        let shutdown_handle = handle.clone();
        tokio::spawn(async move {
            let _ = shutdown.recv().await;
            tracing::info!("Shutdown signal received");
            shutdown_handle.graceful_shutdown(Some(TLS_DRAIN_TIMEOUT));
        });

        let reload = tokio::spawn(apply_config_updates(self.gateway.clone(), config_updates));

        axum_server::bind_rustls(addr, tls)
            .handle(handle)
            .serve(self.router.into_make_service())
            .await?;

        reload.abort();
        tracing::info!("HTTPS server stopped");
        Ok(())
    }
}

/// Rebuild and swap the gateway for every validated config received.
///
/// A config the gateway cannot be built from is logged and dropped; the
/// current gateway keeps serving.
pub async fn apply_config_updates(
    gateway: Arc<ArcSwap<Gateway>>,
    mut config_updates: mpsc::UnboundedReceiver<GatewayConfig>,
) {
    while let Some(config) = config_updates.recv().await {
        match Gateway::from_config(&config) {
            Ok(next) => {
                tracing::info!(upstream = %next.target().base(), "Gateway configuration reloaded");
                gateway.store(Arc::new(next));
            }
            Err(e) => {
                tracing::error!(error = %e, "Rejected reloaded configuration, keeping current gateway");
            }
        }
    }
}

/// Catch-all proxy handler.
/// Extracts the forwarded request, hands it to the gateway, relays the result.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request_id(request.headers()).to_string();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %path,
        "Proxying request"
    );

    let gateway = state.gateway.load_full();
    let result = match extract_forwarded(request, &state.route_prefix, state.max_body_size).await {
        Ok(forwarded) => gateway.forward(forwarded).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(response) => {
            metrics::record_request(
                method.as_str(),
                response.status.as_u16(),
                "forwarded",
                start_time,
            );
            response.into_response()
        }
        Err(e) => {
            let status = e.status();
            if status.is_server_error() {
                tracing::error!(
                    request_id = %request_id,
                    method = %method,
                    path = %path,
                    kind = e.kind(),
                    error = %e,
                    "Gateway request failed"
                );
            } else {
                tracing::warn!(
                    request_id = %request_id,
                    method = %method,
                    path = %path,
                    kind = e.kind(),
                    error = %e,
                    "Rejected request"
                );
            }
            metrics::record_request(method.as_str(), status.as_u16(), e.kind(), start_time);
            e.into_response()
        }
    }
}
