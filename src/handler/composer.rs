//! Composition of response descriptions into handlers.

use std::sync::Arc;

use crate::config::MockConfig;
use crate::description::ResponseDescription;
use crate::error::ConfigurationError;
use crate::handler::{builders, Modifier, ResponseHandler};
use crate::proxy::{ProxyBuilder, Upstream};
use crate::resource::{FileReader, ResourceResolver, TemplateEngine};

/// Translates descriptions into handlers.
///
/// Built once per configuration; `compose` is called once per description
/// at load time and the resulting handlers are reused for every request.
#[derive(Debug, Clone)]
pub struct HandlerComposer {
    resolver: ResourceResolver,
    proxies: ProxyBuilder,
}

impl HandlerComposer {
    /// Composer with the default collaborators: local files, minijinja
    /// templates and a hyper upstream client.
    pub fn new(config: &MockConfig) -> Self {
        Self {
            resolver: ResourceResolver::new(config),
            proxies: ProxyBuilder::new(&config.proxy),
        }
    }

    pub fn with_file_reader(mut self, files: Arc<dyn FileReader>) -> Self {
        self.resolver = self.resolver.with_file_reader(files);
        self
    }

    pub fn with_template_engine(mut self, templates: Arc<dyn TemplateEngine>) -> Self {
        self.resolver = self.resolver.with_template_engine(templates);
        self
    }

    pub fn with_upstream(mut self, upstream: Arc<dyn Upstream>) -> Self {
        self.proxies = self.proxies.with_upstream(upstream);
        self
    }

    pub fn resolver(&self) -> &ResourceResolver {
        &self.resolver
    }

    /// Build the handler for `description`.
    ///
    /// Facets are applied in the order resource, status, headers, latency,
    /// cookies, proxy. A single facet is returned as is, several are wrapped
    /// in a composite.
    pub fn compose(&self, description: &ResponseDescription) -> Result<ResponseHandler, ConfigurationError> {
        let resource = description
            .is_resource()
            .then(|| self.resolver.resolve(description).map(builders::content))
            .transpose()?;
        let status = description.status.as_deref().map(builders::status).transpose()?;
        let headers = description.headers.as_ref().map(builders::headers).transpose()?;
        let latency = description.latency.map(builders::latency);
        let cookies = description.cookies.as_ref().map(builders::cookies).transpose()?;
        let proxy = description
            .proxy
            .as_ref()
            .map(|proxy| {
                self.proxies
                    .build(proxy, &self.resolver)
                    .map(|handler| ResponseHandler::Single(Modifier::Proxy(handler)))
            })
            .transpose()?;

        let children: Vec<ResponseHandler> = [resource, status, headers, latency, cookies, proxy]
            .into_iter()
            .flatten()
            .collect();

        if children.is_empty() {
            return Err(ConfigurationError::EmptyDescription(description.to_string()));
        }

        tracing::debug!(
            facets = children.len(),
            modifiers = children.iter().map(ResponseHandler::len).sum::<usize>(),
            "Composed response handler"
        );
        Ok(ResponseHandler::all(children))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Bytes;
    use axum::http::{header, Request, StatusCode};
    use indexmap::IndexMap;

    use crate::description::{ProxyDescription, TextContainer};

    fn composer() -> HandlerComposer {
        HandlerComposer::new(&MockConfig::default())
    }

    fn request() -> Request<Bytes> {
        Request::builder().uri("/").body(Bytes::new()).unwrap()
    }

    #[test]
    fn test_empty_description_rejected() {
        let err = composer().compose(&ResponseDescription::default()).unwrap_err();
        assert!(matches!(err, ConfigurationError::EmptyDescription(_)));
        assert_eq!(err.to_string(), "unknown response setting with ResponseDescription{}");
    }

    #[test]
    fn test_single_facet_unwrapped() {
        let description = ResponseDescription {
            text: Some(TextContainer::raw("hello")),
            ..Default::default()
        };
        let handler = composer().compose(&description).unwrap();
        assert!(matches!(handler, ResponseHandler::Single(Modifier::Content(_))));
    }

    #[test]
    fn test_headers_alone_stay_composite() {
        let description = ResponseDescription {
            headers: Some(IndexMap::from([("X-A".to_string(), "1".to_string())])),
            ..Default::default()
        };
        let handler = composer().compose(&description).unwrap();
        assert!(matches!(handler, ResponseHandler::Composite(ref c) if c.len() == 1));
    }

    #[test]
    fn test_invalid_facets_fail_eagerly() {
        let bad_status = ResponseDescription {
            text: Some(TextContainer::raw("ok")),
            status: Some("two hundred".into()),
            ..Default::default()
        };
        assert!(matches!(
            composer().compose(&bad_status).unwrap_err(),
            ConfigurationError::InvalidStatus(_)
        ));

        let bad_proxy = ResponseDescription {
            proxy: Some(ProxyDescription::default()),
            ..Default::default()
        };
        assert!(matches!(
            composer().compose(&bad_proxy).unwrap_err(),
            ConfigurationError::MissingProxyUrl
        ));

        let bad_operation = ResponseDescription {
            text: Some(TextContainer::with_operation("xml", "<a/>")),
            ..Default::default()
        };
        assert!(matches!(
            composer().compose(&bad_operation).unwrap_err(),
            ConfigurationError::UnknownOperation { facet: "text", .. }
        ));
    }

    #[tokio::test]
    async fn test_status_and_headers_compose() {
        let description = ResponseDescription {
            status: Some("404".into()),
            headers: Some(IndexMap::from([
                ("X-A".to_string(), "1".to_string()),
                ("X-B".to_string(), "2".to_string()),
            ])),
            ..Default::default()
        };
        let handler = composer().compose(&description).unwrap();
        let response = handler.respond(request()).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()["x-a"], "1");
        assert_eq!(response.headers()["x-b"], "2");
    }

    #[tokio::test]
    async fn test_all_local_facets() {
        let description = ResponseDescription {
            text: Some(TextContainer::template("{{ req.method }} {{ req.path }}")),
            status: Some("201".into()),
            headers: Some(IndexMap::from([(
                "Content-Type".to_string(),
                "text/plain".to_string(),
            )])),
            cookies: Some(IndexMap::from([("session".to_string(), "s1".to_string())])),
            latency: Some(1),
            ..Default::default()
        };
        let handler = composer().compose(&description).unwrap();
        assert_eq!(handler.len(), 5);

        let request = Request::builder()
            .method("DELETE")
            .uri("/items/3")
            .body(Bytes::new())
            .unwrap();
        let response = handler.respond(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/plain");
        assert_eq!(response.headers()[header::SET_COOKIE], "session=s1");
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(body, "DELETE /items/3");
    }
}
