//! Proxy facet of a response description.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Forward the request to `url`, optionally falling back to `failover`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProxyDescription {
    /// Absolute upstream URL. Required; checked when the handler is composed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Path of the content served when the upstream fails.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failover: Option<String>,
}

impl ProxyDescription {
    pub fn to(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            failover: None,
        }
    }

    pub fn with_failover(mut self, failover: impl Into<String>) -> Self {
        self.failover = Some(failover.into());
        self
    }
}

impl fmt::Display for ProxyDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{url={:?}", self.url.as_deref().unwrap_or(""))?;
        if let Some(failover) = &self.failover {
            write!(f, ", failover={failover:?}")?;
        }
        write!(f, "}}")
    }
}
