//! Declarative response description.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::description::{ProxyDescription, TextContainer};

/// One configured response.
///
/// Every field is optional. Resource facets are looked at in the order
/// `text`, `file`, `path_resource`, `version`; the first one present wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResponseDescription {
    /// Status code as a base-10 string, e.g. `"404"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy: Option<ProxyDescription>,

    /// Headers in declaration order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<IndexMap<String, String>>,

    /// Cookies in declaration order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cookies: Option<IndexMap<String, String>>,

    /// Minimum time in milliseconds before the response is finalized.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<TextContainer>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<TextContainer>,

    /// Static resource relative to the configured resource root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path_resource: Option<String>,

    /// Served verbatim as the body.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl ResponseDescription {
    /// Whether any content facet is present.
    pub fn is_resource(&self) -> bool {
        self.text.is_some()
            || self.file.is_some()
            || self.path_resource.is_some()
            || self.version.is_some()
    }

    /// Names of the content facets present, in resolution priority order.
    pub fn resource_facets(&self) -> Vec<&'static str> {
        [
            ("text", self.text.is_some()),
            ("file", self.file.is_some()),
            ("path_resource", self.path_resource.is_some()),
            ("version", self.version.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, present)| present.then_some(name))
        .collect()
    }

    /// Whether no facet at all is present.
    pub fn is_empty(&self) -> bool {
        !self.is_resource()
            && self.status.is_none()
            && self.headers.is_none()
            && self.latency.is_none()
            && self.cookies.is_none()
            && self.proxy.is_none()
    }
}

impl fmt::Display for ResponseDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut fields: Vec<String> = Vec::new();
        if let Some(text) = &self.text {
            fields.push(format!("text={text}"));
        }
        if let Some(file) = &self.file {
            fields.push(format!("file={file}"));
        }
        if let Some(path) = &self.path_resource {
            fields.push(format!("path_resource={path:?}"));
        }
        if let Some(version) = &self.version {
            fields.push(format!("version={version:?}"));
        }
        if let Some(status) = &self.status {
            fields.push(format!("status={status:?}"));
        }
        if let Some(headers) = &self.headers {
            fields.push(format!("headers={headers:?}"));
        }
        if let Some(cookies) = &self.cookies {
            fields.push(format!("cookies={cookies:?}"));
        }
        if let Some(proxy) = &self.proxy {
            fields.push(format!("proxy={proxy}"));
        }
        if let Some(latency) = self.latency {
            fields.push(format!("latency={latency}"));
        }
        write!(f, "ResponseDescription{{{}}}", fields.join(", "))
    }
}
