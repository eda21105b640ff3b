//! Request forwarding with server-side credential injection.

use std::fmt;
use std::time::Duration;

use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use serde_json::Value;

use crate::config::{GatewayConfig, RouteConfig, UpstreamConfig};
use crate::gateway::error::GatewayError;
use crate::gateway::target::{PathSegments, UpstreamTarget};
use crate::routing::PathPolicy;

/// An inbound request reduced to what the gateway forwards.
#[derive(Debug, Clone)]
pub struct ForwardedRequest {
    pub method: Method,
    pub segments: PathSegments,
    /// Raw query string, without the leading `?`.
    pub query: Option<String>,
    /// Inbound headers; only the configured subset is sent upstream.
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

impl ForwardedRequest {
    pub fn new(method: Method, segments: PathSegments) -> Self {
        Self {
            method,
            segments,
            query: None,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Upstream status and parsed JSON body, relayed unmodified.
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardedResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// Methods whose body is forwarded. Everything else goes out without one.
pub fn carries_body(method: &Method) -> bool {
    matches!(*method, Method::POST | Method::PUT | Method::PATCH)
}

/// Stateless forwarder to one upstream API.
///
/// Built once from validated configuration; a `Gateway` cannot exist
/// without a base URL and an API key.
pub struct Gateway {
    target: UpstreamTarget,
    api_key_header: HeaderName,
    api_key: HeaderValue,
    forwarded_headers: Vec<HeaderName>,
    policy: PathPolicy,
    timeout: Duration,
    client: reqwest::Client,
}

impl Gateway {
    pub fn new(upstream: &UpstreamConfig, route: &RouteConfig) -> Result<Self, GatewayError> {
        let base_url = upstream
            .base_url
            .as_deref()
            .ok_or_else(|| GatewayError::Config("upstream base URL is not set".to_string()))?;
        let target = UpstreamTarget::new(base_url)?;

        let api_key = match &upstream.api_key {
            Some(key) if !key.is_blank() => key,
            _ => {
                return Err(GatewayError::Config(
                    "upstream API key is not set".to_string(),
                ))
            }
        };
        let mut api_key = HeaderValue::from_str(api_key.expose()).map_err(|_| {
            GatewayError::Config("upstream API key is not a valid header value".to_string())
        })?;
        api_key.set_sensitive(true);

        let api_key_header = HeaderName::from_bytes(upstream.api_key_header.as_bytes())
            .map_err(|_| {
                GatewayError::Config(format!(
                    "invalid API key header name: {}",
                    upstream.api_key_header
                ))
            })?;

        let forwarded_headers = upstream
            .forwarded_headers
            .iter()
            .map(|name| {
                HeaderName::from_bytes(name.as_bytes()).map_err(|_| {
                    GatewayError::Config(format!("invalid forwarded header name: {name}"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let timeout = Duration::from_secs(upstream.timeout_secs);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(upstream.connect_timeout_secs))
            .build()
            .map_err(|e| GatewayError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            target,
            api_key_header,
            api_key,
            forwarded_headers,
            policy: PathPolicy::from_config(route),
            timeout,
            client,
        })
    }

    pub fn from_config(config: &GatewayConfig) -> Result<Self, GatewayError> {
        Self::new(&config.upstream, &config.route)
    }

    pub fn target(&self) -> &UpstreamTarget {
        &self.target
    }

    pub fn policy(&self) -> &PathPolicy {
        &self.policy
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Headers sent upstream: the forwarded subset of `inbound`, then
    /// `Content-Type: application/json`, then the API key. The server key
    /// always replaces anything the caller sent under the same name.
    pub fn outbound_headers(&self, inbound: &HeaderMap) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for name in &self.forwarded_headers {
            if *name == self.api_key_header || *name == header::CONTENT_TYPE {
                continue;
            }
            for value in inbound.get_all(name) {
                headers.append(name.clone(), value.clone());
            }
        }

        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(self.api_key_header.clone(), self.api_key.clone());
        headers
    }

    /// Forward one request and relay the upstream's status and JSON body.
    ///
    /// No retry is attempted. Upstream error statuses with a JSON body are
    /// returned as `Ok`. An empty upstream body (204, or any reply to `HEAD`)
    /// is not JSON and fails as `MalformedResponse`.
    pub async fn forward(
        &self,
        request: ForwardedRequest,
    ) -> Result<ForwardedResponse, GatewayError> {
        self.policy.check(&request.segments)?;
        let url = self
            .target
            .resolve(&request.segments, request.query.as_deref())?;

        tracing::debug!(
            method = %request.method,
            upstream = %url,
            "Forwarding to upstream"
        );

        let mut outbound = self
            .client
            .request(request.method.clone(), url)
            .headers(self.outbound_headers(&request.headers));

        if carries_body(&request.method) {
            if let Some(body) = &request.body {
                outbound = outbound.json(body);
            }
        }

        let response = outbound.send().await.map_err(GatewayError::from_transport)?;
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(GatewayError::from_transport)?;

        let body: Value = serde_json::from_slice(&bytes).map_err(|source| {
            GatewayError::MalformedResponse {
                status: status.as_u16(),
                source,
            }
        })?;

        if !status.is_success() {
            tracing::info!(status = %status, "Upstream reported an error, passing through");
        }

        Ok(ForwardedResponse { status, body })
    }
}

impl fmt::Debug for Gateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gateway")
            .field("base", &self.target.base())
            .field("api_key_header", &self.api_key_header)
            .field("forwarded_headers", &self.forwarded_headers)
            .field("restricted", &self.policy.is_restricted())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
