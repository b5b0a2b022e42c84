//! HTTP transport subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request id, body buffering)
//!     → handler::ResponseHandler::respond
//!     → response.rs (construction failures → 5xx)
//!     → Send to client
//! ```

pub mod response;
pub mod server;

pub use server::MockServer;
