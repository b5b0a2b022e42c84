//! Proxy modifier with optional failover.

use std::sync::Arc;
use std::time::Duration;

use axum::http::{header, uri::PathAndQuery, HeaderMap, Uri};

use crate::error::{error_chain, ResponseError, UpstreamError};
use crate::handler::context::is_hop_by_hop;
use crate::handler::ResponseContext;
use crate::observability::metrics;
use crate::proxy::upstream::{Upstream, UpstreamRequest, UpstreamResponse};
use crate::resource::Resource;

/// Delegates response production to an upstream.
#[derive(Debug, Clone)]
pub struct ProxyHandler {
    target: Uri,
    timeout: Duration,
    upstream: Arc<dyn Upstream>,
    failover: Option<Resource>,
}

impl ProxyHandler {
    pub fn new(target: Uri, timeout: Duration, upstream: Arc<dyn Upstream>) -> Self {
        Self {
            target,
            timeout,
            upstream,
            failover: None,
        }
    }

    /// Serve `failover` whenever the upstream fails.
    pub fn with_failover(mut self, failover: Resource) -> Self {
        self.failover = Some(failover);
        self
    }

    pub fn target(&self) -> &Uri {
        &self.target
    }

    pub fn has_failover(&self) -> bool {
        self.failover.is_some()
    }

    /// Forward the request held by `ctx` and copy the answer into it.
    ///
    /// Without failover any upstream answer is copied as is and only
    /// transport failures are errors. With failover, transport failures,
    /// timeouts and failure statuses all switch to the failover content.
    pub async fn apply(&self, ctx: &mut ResponseContext) -> Result<(), ResponseError> {
        let request = self.upstream_request(ctx);
        let outcome = self.classify(self.upstream.forward(request, self.timeout).await);

        match (outcome, &self.failover) {
            (Ok(response), _) => {
                tracing::debug!(
                    request_id = %ctx.request_id(),
                    target = %self.target,
                    status = %response.status,
                    "Proxied request"
                );
                ctx.replace_with_upstream(response.status, &response.headers, response.body);
                Ok(())
            }
            (Err(source), None) => Err(ResponseError::Proxy {
                url: self.target.to_string(),
                source,
            }),
            (Err(source), Some(failover)) => {
                tracing::warn!(
                    request_id = %ctx.request_id(),
                    target = %self.target,
                    error = %error_chain(&source),
                    "Upstream failed, serving failover"
                );
                metrics::record_proxy_failover();
                let content = failover
                    .read(ctx)
                    .map_err(|e| ResponseError::Failover(Box::new(e)))?;
                ctx.set_body(content);
                Ok(())
            }
        }
    }

    fn classify(
        &self,
        outcome: Result<UpstreamResponse, UpstreamError>,
    ) -> Result<UpstreamResponse, UpstreamError> {
        match outcome {
            Ok(response) if self.failover.is_some() && self.upstream.is_failure(response.status) => {
                Err(UpstreamError::Status(response.status))
            }
            other => other,
        }
    }

    fn upstream_request(&self, ctx: &ResponseContext) -> UpstreamRequest {
        let request = ctx.request();

        let mut headers = HeaderMap::with_capacity(request.headers.len());
        for (name, value) in &request.headers {
            if is_hop_by_hop(name) || name == header::HOST || name == header::CONTENT_LENGTH {
                continue;
            }
            headers.append(name.clone(), value.clone());
        }

        UpstreamRequest {
            method: request.method.clone(),
            uri: self.target_for(request.uri.query()),
            headers,
            body: ctx.request_body().clone(),
        }
    }

    /// The target URI, carrying the incoming query when the target has none.
    fn target_for(&self, query: Option<&str>) -> Uri {
        let (Some(query), None) = (query, self.target.query()) else {
            return self.target.clone();
        };

        let path_and_query = format!("{}?{}", self.target.path(), query);
        let mut parts = self.target.clone().into_parts();
        match PathAndQuery::try_from(path_and_query) {
            Ok(pq) => parts.path_and_query = Some(pq),
            Err(_) => return self.target.clone(),
        }
        Uri::from_parts(parts).unwrap_or_else(|_| self.target.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Bytes;
    use axum::http::{HeaderValue, Method, Request, StatusCode};
    use futures_util::future::BoxFuture;
    use std::sync::Mutex;

    /// Records requests and answers with a fixed outcome.
    #[derive(Debug)]
    struct ScriptedUpstream {
        outcome: fn() -> Result<UpstreamResponse, UpstreamError>,
        seen: Mutex<Vec<UpstreamRequest>>,
    }

    impl ScriptedUpstream {
        fn new(outcome: fn() -> Result<UpstreamResponse, UpstreamError>) -> Arc<Self> {
            Arc::new(Self {
                outcome,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    impl Upstream for ScriptedUpstream {
        fn forward(
            &self,
            request: UpstreamRequest,
            _timeout: Duration,
        ) -> BoxFuture<'_, Result<UpstreamResponse, UpstreamError>> {
            self.seen.lock().unwrap().push(request);
            let outcome = (self.outcome)();
            Box::pin(async move { outcome })
        }
    }

    fn upstream_answer(status: StatusCode, body: &'static str) -> Result<UpstreamResponse, UpstreamError> {
        let mut headers = HeaderMap::new();
        headers.insert("x-upstream", HeaderValue::from_static("yes"));
        Ok(UpstreamResponse {
            status,
            headers,
            body: Bytes::from_static(body.as_bytes()),
        })
    }

    fn ctx() -> ResponseContext {
        ResponseContext::new(
            Request::builder()
                .method(Method::PUT)
                .uri("/orders?id=9")
                .header(header::HOST, "mock.local")
                .header(header::CONNECTION, "keep-alive")
                .header("x-client", "c1")
                .body(Bytes::from_static(b"order"))
                .unwrap(),
        )
    }

    #[tokio::test]
    async fn test_forwards_request_and_copies_response() {
        let upstream = ScriptedUpstream::new(|| upstream_answer(StatusCode::CREATED, "created"));
        let handler = ProxyHandler::new(
            "http://upstream.local/api".parse().unwrap(),
            Duration::from_secs(1),
            upstream.clone(),
        );

        let mut ctx = ctx();
        handler.apply(&mut ctx).await.unwrap();

        assert_eq!(ctx.status(), StatusCode::CREATED);
        assert_eq!(ctx.body().as_ref(), b"created");
        assert_eq!(ctx.headers()["x-upstream"], "yes");

        let seen = upstream.seen.lock().unwrap();
        let sent = &seen[0];
        assert_eq!(sent.method, Method::PUT);
        assert_eq!(sent.uri, "http://upstream.local/api?id=9");
        assert_eq!(sent.body.as_ref(), b"order");
        assert_eq!(sent.headers["x-client"], "c1");
        assert!(sent.headers.get(header::HOST).is_none());
        assert!(sent.headers.get(header::CONNECTION).is_none());
    }

    #[tokio::test]
    async fn test_target_query_kept() {
        let upstream = ScriptedUpstream::new(|| upstream_answer(StatusCode::OK, ""));
        let handler = ProxyHandler::new(
            "http://upstream.local/api?fixed=1".parse().unwrap(),
            Duration::from_secs(1),
            upstream.clone(),
        );
        handler.apply(&mut ctx()).await.unwrap();
        assert_eq!(upstream.seen.lock().unwrap()[0].uri, "http://upstream.local/api?fixed=1");
    }

    #[tokio::test]
    async fn test_failure_status_copied_without_failover() {
        let upstream = ScriptedUpstream::new(|| upstream_answer(StatusCode::NOT_FOUND, "missing"));
        let handler = ProxyHandler::new(
            "http://upstream.local/".parse().unwrap(),
            Duration::from_secs(1),
            upstream,
        );
        let mut ctx = ctx();
        handler.apply(&mut ctx).await.unwrap();
        assert_eq!(ctx.status(), StatusCode::NOT_FOUND);
        assert_eq!(ctx.body().as_ref(), b"missing");
    }

    #[tokio::test]
    async fn test_connection_failure_without_failover() {
        let upstream = ScriptedUpstream::new(|| Err(UpstreamError::Connect("refused".into())));
        let handler = ProxyHandler::new(
            "http://upstream.invalid/".parse().unwrap(),
            Duration::from_secs(1),
            upstream,
        );
        let err = handler.apply(&mut ctx()).await.unwrap_err();
        assert!(matches!(
            err,
            ResponseError::Proxy { source: UpstreamError::Connect(_), .. }
        ));
    }

    #[tokio::test]
    async fn test_failover_on_each_failure_kind() {
        let outcomes: [fn() -> Result<UpstreamResponse, UpstreamError>; 3] = [
            || Err(UpstreamError::Connect("refused".into())),
            || Err(UpstreamError::Timeout(Duration::from_millis(5))),
            || upstream_answer(StatusCode::BAD_GATEWAY, "broken"),
        ];

        for outcome in outcomes {
            let handler = ProxyHandler::new(
                "http://upstream.invalid/".parse().unwrap(),
                Duration::from_secs(1),
                ScriptedUpstream::new(outcome),
            )
            .with_failover(Resource::Text("backup".into()));

            let mut ctx = ctx();
            handler.apply(&mut ctx).await.unwrap();
            assert_eq!(ctx.status(), StatusCode::OK);
            assert_eq!(ctx.body().as_ref(), b"backup");
            assert!(ctx.headers().get("x-upstream").is_none());
        }
    }

    #[tokio::test]
    async fn test_failing_failover_surfaces() {
        let handler = ProxyHandler::new(
            "http://upstream.invalid/".parse().unwrap(),
            Duration::from_secs(1),
            ScriptedUpstream::new(|| Err(UpstreamError::Connect("refused".into()))),
        )
        .with_failover(Resource::File {
            path: "/no/such/backup.json".into(),
            reader: Arc::new(crate::resource::FsReader),
        });

        let err = handler.apply(&mut ctx()).await.unwrap_err();
        assert!(matches!(err, ResponseError::Failover(_)));
    }
}
