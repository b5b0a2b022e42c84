//! Configuration schema definitions.
//!
//! Settings of the engine itself. Response descriptions are not part of
//! this file; they arrive already deserialized.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the mock server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct MockConfig {
    /// Listener configuration (bind address, body limit).
    pub listener: ListenerConfig,

    /// Where file-less static resources live.
    pub resources: ResourceConfig,

    /// Upstream proxy settings.
    pub proxy: ProxyConfig,

    /// Template variables.
    pub templates: TemplateConfig,

    /// Logging settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "127.0.0.1:12306").
    pub bind_address: String,

    /// Largest request body buffered for handlers, in bytes.
    pub max_body_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:12306".to_string(),
            max_body_bytes: 1024 * 1024,
        }
    }
}

/// Static resource configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ResourceConfig {
    /// Directory `path_resource` entries are resolved against.
    pub root: PathBuf,

    /// Reject descriptions with more than one content facet.
    pub strict: bool,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            strict: false,
        }
    }
}

/// Upstream proxy configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Deadline for one upstream exchange, body included, in milliseconds.
    pub timeout_ms: u64,

    /// Largest upstream body copied into a response, in bytes.
    pub max_body_bytes: usize,
}

impl ProxyConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 5_000,
            max_body_bytes: 8 * 1024 * 1024,
        }
    }
}

/// Template configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TemplateConfig {
    /// Variables visible to every template.
    pub vars: BTreeMap<String, String>,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default log filter, overridden by `RUST_LOG`.
    pub log_level: String,

    /// Emit JSON lines instead of human readable output.
    pub json: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json: false,
        }
    }
}
