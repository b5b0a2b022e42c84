//! Response descriptions: the deserialized input of the engine.
//!
//! # Data Flow
//! ```text
//! configuration loader (external, any serde format)
//!     → ResponseDescription (immutable)
//!     → handler::HandlerComposer::compose
//!     → ResponseHandler
//! ```
//!
//! # Design Decisions
//! - Unknown fields are rejected so typos fail at load time
//! - Header and cookie maps keep declaration order

pub mod proxy;
pub mod response;
pub mod text;

pub use proxy::ProxyDescription;
pub use response::ResponseDescription;
pub use text::TextContainer;
