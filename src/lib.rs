//! Mock HTTP server response engine.
//!
//! # Architecture Overview
//!
//! ```text
//!   ResponseDescription (deserialized elsewhere)
//!          │
//!          ▼
//!   ┌──────────────────────── HandlerComposer ────────────────────────┐
//!   │  resource::ResourceResolver   text > file > path_resource > version
//!   │  handler::builders            status, headers, latency, cookies  │
//!   │  proxy::ProxyBuilder          upstream + optional failover       │
//!   └──────────────────────────────────────────────────────────────────┘
//!          │
//!          ▼
//!   ResponseHandler (Single | Composite), built once, shared read-only
//!          │  per request
//!          ▼
//!   ResponseContext ── apply children in order ── finish (latency) ──▶ Response
//! ```
//!
//! ```no_run
//! use mock_server::{HandlerComposer, MockConfig, ResponseDescription, TextContainer};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = MockConfig::default();
//! let description = ResponseDescription {
//!     text: Some(TextContainer::template("Hello {{ req.queries.name }}")),
//!     status: Some("200".into()),
//!     ..Default::default()
//! };
//! let handler = HandlerComposer::new(&config).compose(&description)?;
//!
//! let listener = tokio::net::TcpListener::bind(&config.listener.bind_address).await?;
//! mock_server::MockServer::new(handler, config.listener)
//!     .run(listener, async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     })
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod description;
pub mod error;
pub mod handler;
pub mod http;
pub mod observability;
pub mod proxy;
pub mod resource;

pub use config::MockConfig;
pub use description::{ProxyDescription, ResponseDescription, TextContainer};
pub use error::{ConfigurationError, ResponseError};
pub use handler::{HandlerComposer, ResponseContext, ResponseHandler};
pub use http::MockServer;
