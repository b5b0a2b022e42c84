//! Error types for handler composition and response construction.
//!
//! # Design Decisions
//! - Configuration problems surface at compose time, before any request is served
//! - Request-time failures never panic; the transport renders them as 5xx
//! - Upstream errors keep their own type so failover can branch on them

use std::error::Error as StdError;
use std::path::PathBuf;
use std::time::Duration;

use axum::http::StatusCode;
use thiserror::Error;

/// A response description that cannot be turned into a handler.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("unknown response setting with {0}")]
    EmptyDescription(String),

    #[error("no content facet in response setting with {0}")]
    NoResource(String),

    #[error("unrecognized {facet} operation `{operation}`")]
    UnknownOperation {
        facet: &'static str,
        operation: String,
    },

    #[error("status `{0}` is not a valid HTTP status code")]
    InvalidStatus(String),

    #[error("invalid header `{name}`: {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error("invalid cookie `{name}`: {reason}")]
    InvalidCookie { name: String, reason: String },

    #[error("path resource `{0}` must be a relative path inside the resource root")]
    InvalidPathResource(String),

    #[error("proxy setting requires a url")]
    MissingProxyUrl,

    #[error("invalid proxy url `{url}`: {reason}")]
    InvalidProxyUrl { url: String, reason: String },

    #[error("conflicting resource facets: {}", .0.join(", "))]
    ConflictingResources(Vec<&'static str>),
}

/// Error reported by a template engine.
#[derive(Debug, Error)]
#[error("template expansion failed: {0}")]
pub struct TemplateError(pub String);

/// Boxed cause carried by an upstream error.
pub type BoxError = Box<dyn StdError + Send + Sync>;

/// Outcome of a failed upstream exchange.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("failed to build upstream request: {0}")]
    Request(String),

    #[error("upstream connection failed")]
    Connect(#[source] BoxError),

    #[error("upstream timed out after {0:?}")]
    Timeout(Duration),

    #[error("failed to read upstream body: {0}")]
    Body(String),

    #[error("upstream answered with failure status {0}")]
    Status(StatusCode),
}

/// Failure while executing a built handler against a request.
#[derive(Debug, Error)]
pub enum ResponseError {
    #[error("failed to read `{}`", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("proxy to {url} failed")]
    Proxy {
        url: String,
        #[source]
        source: UpstreamError,
    },

    #[error("failover after proxy failure could not be served")]
    Failover(#[source] Box<ResponseError>),
}

impl ResponseError {
    /// Short label used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ResponseError::Read { .. } => "read",
            ResponseError::Template(_) => "template",
            ResponseError::Proxy { .. } => "proxy",
            ResponseError::Failover(_) => "failover",
        }
    }
}

/// Render `err` followed by each of its causes, separated by `: `.
pub fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut rendered = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        rendered.push_str(": ");
        rendered.push_str(&cause.to_string());
        source = cause.source();
    }
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        let template = ResponseError::Template(TemplateError("bad".into()));
        assert_eq!(template.kind(), "template");

        let failover = ResponseError::Failover(Box::new(ResponseError::Read {
            path: "backup.json".into(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        }));
        assert_eq!(failover.kind(), "failover");
        assert!(error_chain(&failover).contains("backup.json"));
    }

    #[test]
    fn test_conflicting_resources_message() {
        let err = ConfigurationError::ConflictingResources(vec!["text", "file"]);
        assert_eq!(err.to_string(), "conflicting resource facets: text, file");
    }

    #[test]
    fn test_error_chain_keeps_causes() {
        let refused = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused");
        let err = ResponseError::Proxy {
            url: "http://localhost:1/".into(),
            source: UpstreamError::Connect(Box::new(refused)),
        };

        assert_eq!(err.to_string(), "proxy to http://localhost:1/ failed");
        assert_eq!(
            error_chain(&err),
            "proxy to http://localhost:1/ failed: upstream connection failed: connection refused"
        );
    }
}
