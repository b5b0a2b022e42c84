//! Outbound HTTP exchange behind a narrow trait.
//!
//! # Responsibilities
//! - Send one request to an upstream and buffer its response
//! - Enforce a deadline covering connect, headers and body
//! - Classify which upstream statuses count as failures
//!
//! # Design Decisions
//! - Uses Tokio's timeout around the whole exchange
//! - Timeout errors are distinct from connection errors
//! - The default client speaks plain HTTP/1.1 and HTTP/2 (no TLS); `https`
//!   targets are rejected when the proxy handler is built

use std::fmt;
use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Method, Request, StatusCode, Uri};
use futures_util::future::BoxFuture;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use tokio::time;

use crate::config::ProxyConfig;
use crate::error::UpstreamError;

/// Request sent to an upstream.
#[derive(Debug, Clone)]
pub struct UpstreamRequest {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Fully buffered upstream response.
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Executes proxied requests.
pub trait Upstream: Send + Sync + fmt::Debug {
    /// Send `request`, giving up after `timeout`.
    fn forward(
        &self,
        request: UpstreamRequest,
        timeout: Duration,
    ) -> BoxFuture<'_, Result<UpstreamResponse, UpstreamError>>;

    /// Whether a received status should trigger failover.
    fn is_failure(&self, status: StatusCode) -> bool {
        status.is_client_error() || status.is_server_error()
    }
}

/// Upstream client backed by hyper's pooled legacy client.
#[derive(Clone)]
pub struct HyperUpstream {
    client: Client<HttpConnector, Body>,
    max_body_bytes: usize,
}

impl HyperUpstream {
    pub fn new(config: &ProxyConfig) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(config.timeout()));

        let client = Client::builder(TokioExecutor::new()).build(connector);
        Self {
            client,
            max_body_bytes: config.max_body_bytes,
        }
    }

    async fn exchange(&self, request: Request<Body>) -> Result<UpstreamResponse, UpstreamError> {
        let response = self
            .client
            .request(request)
            .await
            .map_err(|e| UpstreamError::Connect(Box::new(e)))?;

        let (parts, body) = response.into_parts();
        let body = axum::body::to_bytes(Body::new(body), self.max_body_bytes)
            .await
            .map_err(|e| UpstreamError::Body(e.to_string()))?;

        Ok(UpstreamResponse {
            status: parts.status,
            headers: parts.headers,
            body,
        })
    }
}

impl fmt::Debug for HyperUpstream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HyperUpstream")
            .field("max_body_bytes", &self.max_body_bytes)
            .finish_non_exhaustive()
    }
}

impl Upstream for HyperUpstream {
    fn forward(
        &self,
        request: UpstreamRequest,
        timeout: Duration,
    ) -> BoxFuture<'_, Result<UpstreamResponse, UpstreamError>> {
        Box::pin(async move {
            let mut builder = Request::builder().method(request.method).uri(request.uri);
            if let Some(headers) = builder.headers_mut() {
                *headers = request.headers;
            }
            let request = builder
                .body(Body::from(request.body))
                .map_err(|e| UpstreamError::Request(e.to_string()))?;

            match time::timeout(timeout, self.exchange(request)).await {
                Ok(result) => result,
                Err(_) => Err(UpstreamError::Timeout(timeout)),
            }
        })
    }
}
