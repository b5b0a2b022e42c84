//! Response content resources.
//!
//! # Data Flow
//! ```text
//! ResponseDescription
//!     → resolver.rs (text > file > path_resource > version)
//!     → Resource (immutable)
//!     → per request: Resource::read(context)
//!         → file.rs (FileReader) for file and path resources
//!         → template.rs (TemplateEngine) for template resources
//! ```
//!
//! # Design Decisions
//! - No caching: file-backed content is re-read on every request
//! - Template resources wrap another resource and expand its current content
//! - Collaborators are trait objects injected at resolve time

pub mod file;
pub mod resolver;
pub mod template;

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Bytes;

use crate::error::{ResponseError, TemplateError};
use crate::handler::ResponseContext;

pub use file::{FileReader, FsReader};
pub use resolver::ResourceResolver;
pub use template::{MiniJinjaEngine, TemplateEngine};

/// Resolved content provider.
#[derive(Debug, Clone)]
pub enum Resource {
    /// Literal text.
    Text(String),
    /// A file read on every request.
    File {
        path: PathBuf,
        reader: Arc<dyn FileReader>,
    },
    /// A static resource under the configured root.
    PathResource {
        name: String,
        path: PathBuf,
        reader: Arc<dyn FileReader>,
    },
    /// A version string served verbatim.
    Version(String),
    /// The expansion of another resource's content.
    Template {
        source: Box<Resource>,
        engine: Arc<dyn TemplateEngine>,
    },
}

impl Resource {
    /// Produce the content for the request held by `ctx`.
    pub fn read(&self, ctx: &ResponseContext) -> Result<Bytes, ResponseError> {
        match self {
            Resource::Text(text) => Ok(Bytes::from(text.clone())),
            Resource::Version(version) => Ok(Bytes::from(version.clone())),
            Resource::File { path, reader } | Resource::PathResource { path, reader, .. } => reader
                .read(path)
                .map(Bytes::from)
                .map_err(|source| ResponseError::Read {
                    path: path.clone(),
                    source,
                }),
            Resource::Template { source, engine } => {
                let raw = source.read(ctx)?;
                let text = std::str::from_utf8(&raw)
                    .map_err(|e| TemplateError(format!("template source is not UTF-8: {e}")))?;
                let rendered = engine.render(text, &ctx.template_context())?;
                Ok(Bytes::from(rendered))
            }
        }
    }

    /// Short name of the resource kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Resource::Text(_) => "text",
            Resource::File { .. } => "file",
            Resource::PathResource { .. } => "path_resource",
            Resource::Version(_) => "version",
            Resource::Template { .. } => "template",
        }
    }
}
