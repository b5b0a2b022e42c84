//! Proxy subsystem.
//!
//! # Data Flow
//! ```text
//! ProxyDescription
//!     → ProxyBuilder::build (validate url, resolve failover)
//!     → ProxyHandler
//!
//! Per request:
//!     → upstream.rs (forward with timeout)
//!     → success: copy upstream status/headers/body into the context
//!     → failure + failover: serve failover content
//!     → failure, no failover: ResponseError::Proxy
//! ```
//!
//! # Design Decisions
//! - Every upstream call has a deadline
//! - One failover attempt, never a retry of the primary
//! - Failover is an explicit branch on the classified outcome

pub mod handler;
pub mod upstream;

use std::sync::Arc;
use std::time::Duration;

use axum::http::Uri;
use url::Url;

use crate::config::ProxyConfig;
use crate::description::ProxyDescription;
use crate::error::ConfigurationError;
use crate::resource::ResourceResolver;

pub use handler::ProxyHandler;
pub use upstream::{HyperUpstream, Upstream, UpstreamRequest, UpstreamResponse};

/// Builds proxy handlers sharing one upstream client.
#[derive(Debug, Clone)]
pub struct ProxyBuilder {
    upstream: Arc<dyn Upstream>,
    timeout: Duration,
}

impl ProxyBuilder {
    pub fn new(config: &ProxyConfig) -> Self {
        Self {
            upstream: Arc::new(HyperUpstream::new(config)),
            timeout: config.timeout(),
        }
    }

    pub fn with_upstream(mut self, upstream: Arc<dyn Upstream>) -> Self {
        self.upstream = upstream;
        self
    }

    /// Build the handler for `proxy`; failover content is read through
    /// `resolver`'s file reader.
    pub fn build(
        &self,
        proxy: &ProxyDescription,
        resolver: &ResourceResolver,
    ) -> Result<ProxyHandler, ConfigurationError> {
        let url = proxy.url.as_deref().ok_or(ConfigurationError::MissingProxyUrl)?;
        let target = parse_target(url)?;

        let handler = ProxyHandler::new(target, self.timeout, self.upstream.clone());
        Ok(match &proxy.failover {
            Some(failover) => handler.with_failover(resolver.file(failover)),
            None => handler,
        })
    }
}

fn parse_target(url: &str) -> Result<Uri, ConfigurationError> {
    let invalid = |reason: String| ConfigurationError::InvalidProxyUrl {
        url: url.to_string(),
        reason,
    };

    let parsed = Url::parse(url).map_err(|e| invalid(e.to_string()))?;
    // The upstream client has no TLS connector.
    if parsed.scheme() != "http" {
        return Err(invalid(format!("unsupported scheme `{}`", parsed.scheme())));
    }
    if parsed.host_str().is_none() {
        return Err(invalid("missing host".to_string()));
    }

    parsed
        .as_str()
        .parse::<Uri>()
        .map_err(|e| invalid(e.to_string()))
}
