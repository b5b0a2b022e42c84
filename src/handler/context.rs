//! Request-scoped response construction state.
//!
//! # Responsibilities
//! - Hold the request being answered (parts, buffered body, request id)
//! - Accumulate the response under construction (status, headers, body)
//! - Carry the latency deadline until the response is finalized
//! - Expose the request to templates as a JSON value
//!
//! # Design Decisions
//! - One context per request; handler trees never hold per-request state
//! - Headers overwrite on insert, cookies append
//! - Latency is a deadline measured from context creation, honored in `finish`

use std::collections::BTreeMap;
use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::http::{header, request, HeaderMap, HeaderName, HeaderValue, Request, Response, StatusCode};
use serde_json::{json, Map, Value};
use tokio::time::Instant;

/// Header carrying the request id.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Whether a header belongs to one connection only.
pub fn is_hop_by_hop(name: &HeaderName) -> bool {
    matches!(
        name.as_str(),
        "connection"
            | "keep-alive"
            | "proxy-authenticate"
            | "proxy-authorization"
            | "te"
            | "trailer"
            | "transfer-encoding"
            | "upgrade"
    )
}

/// The request being answered together with the response being built.
#[derive(Debug)]
pub struct ResponseContext {
    request_id: String,
    parts: request::Parts,
    body: Bytes,
    vars: Map<String, Value>,
    started: Instant,
    not_before: Option<Instant>,
    status: StatusCode,
    headers: HeaderMap,
    content: Bytes,
}

impl ResponseContext {
    /// Start constructing a response for `request`.
    ///
    /// The request id is taken from `x-request-id` when present, otherwise a
    /// fresh UUID is generated.
    pub fn new(request: Request<Bytes>) -> Self {
        let (parts, body) = request.into_parts();
        let request_id = parts
            .headers
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        Self {
            request_id,
            parts,
            body,
            vars: Map::new(),
            started: Instant::now(),
            not_before: None,
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            content: Bytes::new(),
        }
    }

    /// Add a request-scoped template variable.
    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.vars.insert(name.into(), value.into());
        self
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn request(&self) -> &request::Parts {
        &self.parts
    }

    pub fn request_body(&self) -> &Bytes {
        &self.body
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Set a header, replacing any previous value under the same name.
    pub fn insert_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.insert(name, value);
    }

    /// Add a header line without touching existing ones.
    pub fn append_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.headers.append(name, value);
    }

    pub fn body(&self) -> &Bytes {
        &self.content
    }

    pub fn set_body(&mut self, content: impl Into<Bytes>) {
        self.content = content.into();
    }

    /// Do not finalize the response before `delay` has elapsed since the
    /// context was created. Several directives keep the latest deadline.
    pub fn delay_at_least(&mut self, delay: Duration) {
        let deadline = self.started + delay;
        self.not_before = Some(match self.not_before {
            Some(current) => current.max(deadline),
            None => deadline,
        });
    }

    /// Instant before which the response must not be finalized.
    pub fn deadline(&self) -> Option<Instant> {
        self.not_before
    }

    /// Replace status, headers and body with an upstream response.
    ///
    /// Upstream header names replace ours; multi-valued upstream headers
    /// are kept whole. Hop-by-hop headers and `content-length` are dropped.
    pub fn replace_with_upstream(&mut self, status: StatusCode, headers: &HeaderMap, body: Bytes) {
        self.status = status;
        for name in headers.keys() {
            self.headers.remove(name);
        }
        for (name, value) in headers {
            if is_hop_by_hop(name) || name == header::CONTENT_LENGTH {
                continue;
            }
            self.headers.append(name.clone(), value.clone());
        }
        self.content = body;
    }

    /// The request as seen by templates: `req` plus request-scoped variables.
    pub fn template_context(&self) -> Value {
        let headers: BTreeMap<String, String> = self
            .parts
            .headers
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();

        let queries: BTreeMap<String, String> = self
            .parts
            .uri
            .query()
            .map(|query| {
                url::form_urlencoded::parse(query.as_bytes())
                    .into_owned()
                    .collect()
            })
            .unwrap_or_default();

        let mut context = self.vars.clone();
        context.insert(
            "req".to_string(),
            json!({
                "method": self.parts.method.as_str(),
                "uri": self.parts.uri.to_string(),
                "path": self.parts.uri.path(),
                "version": format!("{:?}", self.parts.version),
                "headers": headers,
                "queries": queries,
                "content": String::from_utf8_lossy(&self.body),
            }),
        );
        Value::Object(context)
    }

    /// Wait out the latency deadline, then produce the response.
    pub async fn finish(self) -> Response<Body> {
        if let Some(deadline) = self.not_before {
            tokio::time::sleep_until(deadline).await;
        }
        let mut response = Response::new(Body::from(self.content));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}
