//! Resolution of content facets into a `Resource`.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use crate::config::MockConfig;
use crate::description::{ResponseDescription, TextContainer};
use crate::error::ConfigurationError;
use crate::resource::{FileReader, FsReader, MiniJinjaEngine, Resource, TemplateEngine};

const TEMPLATE_OPERATION: &str = "template";

/// Turns the content facets of a description into one resource.
#[derive(Debug, Clone)]
pub struct ResourceResolver {
    files: Arc<dyn FileReader>,
    templates: Arc<dyn TemplateEngine>,
    root: PathBuf,
    strict: bool,
}

impl ResourceResolver {
    /// Resolver over the local file system and minijinja templates.
    pub fn new(config: &MockConfig) -> Self {
        Self {
            files: Arc::new(FsReader),
            templates: Arc::new(MiniJinjaEngine::new(&config.templates.vars)),
            root: config.resources.root.clone(),
            strict: config.resources.strict,
        }
    }

    pub fn with_file_reader(mut self, files: Arc<dyn FileReader>) -> Self {
        self.files = files;
        self
    }

    pub fn with_template_engine(mut self, templates: Arc<dyn TemplateEngine>) -> Self {
        self.templates = templates;
        self
    }

    /// Resolve the primary resource of `description`.
    ///
    /// Facets are tried in the order text, file, path_resource, version and
    /// the first present one wins. In strict mode more than one facet is an
    /// error instead.
    pub fn resolve(&self, description: &ResponseDescription) -> Result<Resource, ConfigurationError> {
        if self.strict {
            let facets = description.resource_facets();
            if facets.len() > 1 {
                return Err(ConfigurationError::ConflictingResources(facets));
            }
        }

        if let Some(text) = &description.text {
            return self.from_container("text", text, |content| Resource::Text(content.to_string()));
        }

        if let Some(file) = &description.file {
            return self.from_container("file", file, |path| self.file(path));
        }

        if let Some(name) = &description.path_resource {
            return self.path_resource(name);
        }

        if let Some(version) = &description.version {
            return Ok(Resource::Version(version.clone()));
        }

        Err(ConfigurationError::NoResource(description.to_string()))
    }

    /// A resource reading `path` on every request.
    pub fn file(&self, path: impl Into<PathBuf>) -> Resource {
        Resource::File {
            path: path.into(),
            reader: self.files.clone(),
        }
    }

    fn from_container(
        &self,
        facet: &'static str,
        container: &TextContainer,
        base: impl FnOnce(&str) -> Resource,
    ) -> Result<Resource, ConfigurationError> {
        match container.operation() {
            None => Ok(base(container.text())),
            Some(operation) if operation.eq_ignore_ascii_case(TEMPLATE_OPERATION) => {
                Ok(Resource::Template {
                    source: Box::new(base(container.text())),
                    engine: self.templates.clone(),
                })
            }
            Some(operation) => Err(ConfigurationError::UnknownOperation {
                facet,
                operation: operation.to_string(),
            }),
        }
    }

    fn path_resource(&self, name: &str) -> Result<Resource, ConfigurationError> {
        let relative = Path::new(name);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if name.is_empty() || escapes {
            return Err(ConfigurationError::InvalidPathResource(name.to_string()));
        }

        Ok(Resource::PathResource {
            name: name.to_string(),
            path: self.root.join(relative),
            reader: self.files.clone(),
        })
    }
}
