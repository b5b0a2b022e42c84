//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Composer and handlers produce:
//!     → logging.rs (structured log events, request id on every request event)
//!     → metrics.rs (counters, histograms)
//! ```

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
