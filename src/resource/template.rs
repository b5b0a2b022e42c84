//! Template expansion behind a narrow trait.

use std::collections::BTreeMap;
use std::fmt;

use minijinja::Environment;
use serde_json::Value;

use crate::error::TemplateError;

/// Expands template source against a JSON context.
pub trait TemplateEngine: Send + Sync + fmt::Debug {
    fn render(&self, source: &str, context: &Value) -> Result<String, TemplateError>;
}

/// Jinja-style templates (`{{ req.path }}`) rendered with minijinja.
///
/// Sources are compiled on every call, so edited template files take effect
/// on the next request.
pub struct MiniJinjaEngine {
    env: Environment<'static>,
}

impl MiniJinjaEngine {
    /// Create an engine exposing `globals` to every template.
    pub fn new(globals: &BTreeMap<String, String>) -> Self {
        let mut env = Environment::new();
        for (name, value) in globals {
            env.add_global(name.clone(), value.clone());
        }
        Self { env }
    }
}

impl Default for MiniJinjaEngine {
    fn default() -> Self {
        Self::new(&BTreeMap::new())
    }
}

impl fmt::Debug for MiniJinjaEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiniJinjaEngine").finish_non_exhaustive()
    }
}

impl TemplateEngine for MiniJinjaEngine {
    fn render(&self, source: &str, context: &Value) -> Result<String, TemplateError> {
        self.env
            .render_str(source, context)
            .map_err(|e| TemplateError(e.to_string()))
    }
}
