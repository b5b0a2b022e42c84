//! Mapping of construction failures to HTTP responses.
//!
//! # Design Decisions
//! - Upstream timeouts result in 504 Gateway Timeout
//! - Other upstream failures result in 502 Bad Gateway
//! - Everything else is a 500
//! - The body carries the error with all of its causes

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::error::{error_chain, ResponseError, UpstreamError};

impl ResponseError {
    /// Status a transport should answer with.
    pub fn status(&self) -> StatusCode {
        match self {
            ResponseError::Proxy {
                source: UpstreamError::Timeout(_),
                ..
            } => StatusCode::GATEWAY_TIMEOUT,
            ResponseError::Proxy { .. } => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ResponseError {
    fn into_response(self) -> Response {
        (self.status(), error_chain(&self)).into_response()
    }
}
