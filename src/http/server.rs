//! HTTP server answering every request with one composed handler.
//!
//! # Responsibilities
//! - Create Axum Router catching every path and method
//! - Wire up middleware (request ID, tracing)
//! - Buffer request bodies up to the configured limit
//! - Hand each request to the response handler
//! - Render construction failures as 5xx responses
//!
//! No request matching happens here: the server plays the role of a
//! dispatcher that has already decided which handler applies.

use std::future::Future;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, DefaultBodyLimit, State},
    http::{request, Request},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::ListenerConfig;
use crate::handler::ResponseHandler;

/// State injected into the request handler.
#[derive(Clone)]
struct ServerState {
    handler: Arc<ResponseHandler>,
}

/// Mock HTTP server serving a single response handler.
pub struct MockServer {
    router: Router,
    config: ListenerConfig,
}

impl MockServer {
    /// Create a server answering with `handler`.
    pub fn new(handler: ResponseHandler, config: ListenerConfig) -> Self {
        let state = ServerState {
            handler: Arc::new(handler),
        };
        let router = Self::build_router(state, config.max_body_bytes);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: ServerState, max_body_bytes: usize) -> Router {
        Router::new()
            .route("/{*path}", any(mock_handler))
            .route("/", any(mock_handler))
            .with_state(state)
            .layer(DefaultBodyLimit::max(max_body_bytes))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The router, for serving through another transport.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn config(&self) -> &ListenerConfig {
        &self.config
    }

    /// Serve on `listener` until `shutdown` resolves.
    pub async fn run<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Mock server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!(address = %addr, "Mock server stopped");
        Ok(())
    }
}

/// Oversized bodies are answered with 413, unreadable ones with 400.
async fn mock_handler(
    State(state): State<ServerState>,
    parts: request::Parts,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let body = match body {
        Ok(bytes) => bytes,
        Err(rejection) => {
            tracing::warn!(
                path = %parts.uri.path(),
                status = %rejection.status(),
                error = %rejection.body_text(),
                "Rejected request body"
            );
            return rejection.into_response();
        }
    };

    match state.handler.respond(Request::from_parts(parts, body)).await {
        Ok(response) => response.into_response(),
        Err(e) => e.into_response(),
    }
}
