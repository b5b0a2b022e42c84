//! Response handlers: executable response pipelines.
//!
//! # Data Flow
//! ```text
//! ResponseDescription
//!     → composer.rs (fixed slot order: resource, status, headers,
//!                    latency, cookies, proxy)
//!         → resource::ResourceResolver
//!         → builders.rs (status, headers, cookies, latency)
//!         → proxy::ProxyBuilder
//!     → ResponseHandler (Single | Composite)
//!
//! Per request:
//!     Request<Bytes> → ResponseContext (context.rs)
//!         → ResponseHandler::apply (children in order)
//!         → ResponseContext::finish (latency deadline)
//!         → Response<Body>
//! ```
//!
//! # Design Decisions
//! - Handler trees are immutable and shared read-only across requests
//! - Composite application is sequential, never short-circuits on success
//! - A failing child aborts the pass; earlier mutations are not undone but
//!   the half-built response is dropped

pub mod builders;
pub mod composer;
pub mod context;

use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderName, HeaderValue, Request, Response, StatusCode};
use futures_util::future::BoxFuture;
use tokio::time::Instant;

use crate::error::{error_chain, ResponseError};
use crate::observability::metrics;
use crate::proxy::ProxyHandler;
use crate::resource::Resource;

pub use composer::HandlerComposer;
pub use context::{ResponseContext, X_REQUEST_ID};

/// One mutation of the response under construction.
#[derive(Debug, Clone)]
pub enum Modifier {
    /// Replace the body with the resource content.
    Content(Resource),
    /// Set the status code.
    Status(StatusCode),
    /// Set one header, replacing earlier values of the same name.
    Header(HeaderName, HeaderValue),
    /// Append one `Set-Cookie` line.
    Cookie { name: String, value: HeaderValue },
    /// Do not finalize before the delay has elapsed.
    Latency(Duration),
    /// Produce the response from an upstream.
    Proxy(ProxyHandler),
}

impl Modifier {
    async fn apply(&self, ctx: &mut ResponseContext) -> Result<(), ResponseError> {
        match self {
            Modifier::Content(resource) => {
                let content = resource.read(ctx)?;
                ctx.set_body(content);
            }
            Modifier::Status(status) => ctx.set_status(*status),
            Modifier::Header(name, value) => ctx.insert_header(name.clone(), value.clone()),
            Modifier::Cookie { value, .. } => ctx.append_header(header::SET_COOKIE, value.clone()),
            Modifier::Latency(delay) => ctx.delay_at_least(*delay),
            Modifier::Proxy(proxy) => proxy.apply(ctx).await?,
        }
        Ok(())
    }
}

/// Executable response pipeline.
#[derive(Debug, Clone)]
pub enum ResponseHandler {
    Single(Modifier),
    /// Children applied in order to the same context.
    Composite(Vec<ResponseHandler>),
}

impl ResponseHandler {
    /// Wrap `children`, returning a lone child unwrapped.
    pub fn all(mut children: Vec<ResponseHandler>) -> ResponseHandler {
        if children.len() == 1 {
            if let Some(only) = children.pop() {
                return only;
            }
        }
        ResponseHandler::Composite(children)
    }

    /// Apply this handler to `ctx`.
    pub fn apply<'a>(
        &'a self,
        ctx: &'a mut ResponseContext,
    ) -> BoxFuture<'a, Result<(), ResponseError>> {
        Box::pin(async move {
            match self {
                ResponseHandler::Single(modifier) => modifier.apply(ctx).await,
                ResponseHandler::Composite(children) => {
                    for child in children {
                        child.apply(ctx).await?;
                    }
                    Ok(())
                }
            }
        })
    }

    /// Answer `request`.
    pub async fn respond(&self, request: Request<Bytes>) -> Result<Response<Body>, ResponseError> {
        self.respond_with(ResponseContext::new(request)).await
    }

    /// Answer the request held by a prepared context.
    pub async fn respond_with(&self, mut ctx: ResponseContext) -> Result<Response<Body>, ResponseError> {
        let start = Instant::now();
        let request_id = ctx.request_id().to_string();

        if let Err(e) = self.apply(&mut ctx).await {
            tracing::error!(
                request_id = %request_id,
                error = %error_chain(&e),
                "Failed to construct response"
            );
            metrics::record_construction_failure(e.kind());
            return Err(e);
        }

        let response = ctx.finish().await;
        tracing::debug!(
            request_id = %request_id,
            status = %response.status(),
            elapsed = ?start.elapsed(),
            "Response constructed"
        );
        metrics::record_response(response.status().as_u16(), start);
        Ok(response)
    }

    /// Number of modifiers in the tree.
    pub fn len(&self) -> usize {
        match self {
            ResponseHandler::Single(_) => 1,
            ResponseHandler::Composite(children) => children.iter().map(Self::len).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
