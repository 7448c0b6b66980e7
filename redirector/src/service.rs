use crate::errors::RedirectError;
use crate::metrics_defs::{REDIRECTS, REQUEST_ERRORS, TEMPLATES_NOT_FOUND};
use crate::resolver::{Resolution, Resolver};
use http_body_util::combinators::BoxBody;
use hyper::body::Bytes;
use hyper::service::Service;
use hyper::header::{ALLOW, HeaderValue};
use hyper::{Method, Request, Response, StatusCode, Uri};
use shared::counter;
use shared::http::{make_error_response, make_redirect_response, make_text_response};
use std::fmt::Write;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

pub type ServiceBody = BoxBody<Bytes, RedirectError>;

const INTERNAL_ERROR_MESSAGE: &str = "An internal error occurred";

/// HTTP front of the resolver. Every failure is logged and turned into a
/// response here; the service itself never returns an error.
#[derive(Clone)]
pub struct RedirectService {
    resolver: Arc<Resolver>,
}

impl RedirectService {
    pub fn new(resolver: Arc<Resolver>) -> Self {
        Self { resolver }
    }

    pub async fn handle(&self, uri: &Uri) -> Response<ServiceBody> {
        let path = uri.path();
        let query = uri.query();

        let result = match self.resolver.resolve(path, query).await {
            Ok(Resolution::Landing(location)) => {
                tracing::debug!(%location, "Redirecting to landing page");
                make_redirect_response(StatusCode::FOUND, &location)
            }
            Ok(Resolution::Redirect(location)) => {
                counter!(REDIRECTS).increment(1);
                tracing::debug!(path, ?query, %location, "Redirecting to template");
                make_redirect_response(StatusCode::FOUND, &location)
            }
            Err(err) => return error_response(path, err),
        };

        result.unwrap_or_else(|err| {
            tracing::error!(path, error = %err, "Destination is not a valid Location header");
            counter!(REQUEST_ERRORS).increment(1);
            make_text_response(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE)
        })
    }
}

fn error_response(path: &str, err: RedirectError) -> Response<ServiceBody> {
    let status = err.status_code();
    match status {
        StatusCode::NOT_FOUND => {
            counter!(TEMPLATES_NOT_FOUND).increment(1);
            tracing::info!(path, error = %err, "Template not found");
            make_text_response(status, not_found_body(&err))
        }
        StatusCode::BAD_REQUEST => {
            counter!(REQUEST_ERRORS).increment(1);
            tracing::info!(path, error = %err, "Rejected request");
            make_text_response(status, format!("{err}\n"))
        }
        _ => {
            counter!(REQUEST_ERRORS).increment(1);
            tracing::error!(path, error = %err, "Failed to resolve template");
            make_text_response(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE)
        }
    }
}

fn not_found_body(err: &RedirectError) -> String {
    let mut body = format!("{err}.\n");
    if let RedirectError::TemplateNotFound { available, .. } = err {
        body.push_str("Available templates:\n");
        for name in available {
            let _ = writeln!(body, "- {name}");
        }
    }
    body
}

impl<B> Service<Request<B>> for RedirectService {
    type Response = Response<ServiceBody>;
    type Error = RedirectError;
    type Future =
        Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

    fn call(&self, req: Request<B>) -> Self::Future {
        if !matches!(*req.method(), Method::GET | Method::HEAD) {
            tracing::debug!(method = %req.method(), path = req.uri().path(), "Method not allowed");
            let mut response: Response<ServiceBody> =
                make_error_response(StatusCode::METHOD_NOT_ALLOWED);
            response
                .headers_mut()
                .insert(ALLOW, HeaderValue::from_static("GET, HEAD"));
            return Box::pin(async move { Ok(response) });
        }

        let service = self.clone();
        let uri = req.uri().clone();
        Box::pin(async move { Ok(service.handle(&uri).await) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::testutils::MockGithub;
    use http::header::LOCATION;
    use http_body_util::BodyExt;
    use serde_json::json;

    async fn service(mock: &MockGithub) -> RedirectService {
        let config = Config {
            upstream: mock.upstream_config(),
            ..Config::default()
        };
        RedirectService::new(Arc::new(Resolver::new(&config, None).unwrap()))
    }

    fn get(uri: &str) -> Uri {
        uri.parse().unwrap()
    }

    async fn body_string(response: Response<ServiceBody>) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn example_mock() -> crate::testutils::MockGithubBuilder {
        MockGithub::builder().listing(
            "latest",
            json!([
                {"name": "basics", "size": 0, "html_url": "https://x/basics"},
                {"name": "README.md", "size": 42, "html_url": "https://x/readme"},
            ]),
        )
    }

    #[tokio::test]
    async fn test_root_redirect() {
        let mock = MockGithub::builder().start().await;
        let service = service(&mock).await;

        let response = service.handle(&get("/")).await;
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers().get(LOCATION).unwrap(), "/latest");
        assert_eq!(mock.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_redirect_to_template() {
        let mock = example_mock().start().await;
        let service = service(&mock).await;

        for uri in ["/basics@latest?on=github", "/basics?on=github"] {
            let response = service.handle(&get(uri)).await;
            assert_eq!(response.status(), StatusCode::FOUND);
            assert_eq!(response.headers().get(LOCATION).unwrap(), "https://x/basics");
        }

        let response = service.handle(&get("/basics")).await;
        assert_eq!(
            response.headers().get(LOCATION).unwrap(),
            "https://stackblitz.com/github/withastro/astro/tree/latest/examples/basics"
        );
        assert_eq!(mock.listing_calls(), 1);
    }

    #[tokio::test]
    async fn test_not_found_lists_templates() {
        let mock = example_mock().start().await;
        let service = service(&mock).await;

        let response = service.handle(&get("/nonexistent")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_string(response).await,
            "Template \"nonexistent\" not found for ref \"latest\".\nAvailable templates:\n- basics\n"
        );
    }

    #[tokio::test]
    async fn test_client_errors_are_reported() {
        let mock = example_mock().start().await;
        let service = service(&mock).await;

        let response = service.handle(&get("/basics?on=vercel")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_string(response).await.contains("stackblitz, codesandbox, netlify, github, gitpod"));

        let response = service.handle(&get("/template@somebadref")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_string(response).await;
        assert!(body.starts_with("Invalid version \"somebadref\""));
        assert!(body.contains("https://github.com/withastro/astro/releases"));

        let response = service.handle(&get("/@latest")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_internal_errors_are_opaque() {
        // No listing registered: the API answers with an error object
        let mock = MockGithub::builder().start().await;
        let service = service(&mock).await;

        let response = service.handle(&get("/basics")).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_string(response).await, "An internal error occurred");
    }

    #[tokio::test]
    async fn test_only_get_and_head_are_served() {
        let mock = example_mock().start().await;
        let service = service(&mock).await;

        for method in [Method::POST, Method::PUT, Method::DELETE] {
            let request = Request::builder()
                .method(method)
                .uri("/basics")
                .body(())
                .unwrap();
            let response = service.call(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
            assert_eq!(response.headers().get(ALLOW).unwrap(), "GET, HEAD");
        }
        assert_eq!(mock.total_calls(), 0);

        for method in [Method::GET, Method::HEAD] {
            let request = Request::builder()
                .method(method)
                .uri("/basics?on=github")
                .body(())
                .unwrap();
            let response = service.call(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::FOUND);
            assert_eq!(response.headers().get(LOCATION).unwrap(), "https://x/basics");
        }
    }

    #[tokio::test]
    async fn test_upstream_unreachable() {
        let mut upstream = crate::config::UpstreamConfig::default();
        upstream.api_url = url::Url::parse("http://127.0.0.1:1").unwrap();
        let config = Config {
            upstream,
            ..Config::default()
        };
        let service = RedirectService::new(Arc::new(Resolver::new(&config, None).unwrap()));

        let response = service.handle(&get("/basics")).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_string(response).await, "An internal error occurred");
    }
}
