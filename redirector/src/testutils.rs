//! In-process stand-in for the GitHub REST API used by the tests.

use crate::config::UpstreamConfig;
use http_body_util::Full;
use hyper::body::{Bytes, Incoming};
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::{TokioExecutor, TokioIo};
use serde_json::{Value, json};
use std::collections::{HashMap, HashSet};
use std::convert::Infallible;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

const REPO_PREFIX: &str = "/repos/withastro/astro/";

#[derive(Default)]
struct MockState {
    releases: HashSet<String>,
    listings: HashMap<String, Value>,
    delay: Option<Duration>,
    release_calls: AtomicUsize,
    listing_calls: AtomicUsize,
    last_authorization: Mutex<Option<String>>,
}

#[derive(Default)]
pub struct MockGithubBuilder {
    state: MockState,
}

impl MockGithubBuilder {
    /// Registers a release tag, e.g. `astro@4.0.0`.
    pub fn release(mut self, tag: &str) -> Self {
        self.state.releases.insert(tag.to_string());
        self
    }

    /// Registers the body returned when listing the examples directory at `reference`.
    pub fn listing(mut self, reference: &str, body: Value) -> Self {
        self.state.listings.insert(reference.to_string(), body);
        self
    }

    /// Delays every response so concurrent requests overlap.
    pub fn delay(mut self, delay: Duration) -> Self {
        self.state.delay = Some(delay);
        self
    }

    pub async fn start(self) -> MockGithub {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to address");
        let port = listener.local_addr().unwrap().port();
        let state = Arc::new(self.state);

        let server_state = state.clone();
        tokio::spawn(async move {
            loop {
                let (stream, _) = listener.accept().await.unwrap();
                let io = TokioIo::new(stream);
                let state = server_state.clone();

                tokio::spawn(async move {
                    let service = service_fn(move |req| {
                        let state = state.clone();
                        async move { Ok::<_, Infallible>(handle(&state, req).await) }
                    });
                    if let Err(err) =
                        hyper_util::server::conn::auto::Builder::new(TokioExecutor::new())
                            .serve_connection(io, service)
                            .await
                    {
                        eprintln!("Error serving connection: {:?}", err);
                    }
                });
            }
        });

        MockGithub { port, state }
    }
}

pub struct MockGithub {
    port: u16,
    state: Arc<MockState>,
}

impl MockGithub {
    pub fn builder() -> MockGithubBuilder {
        MockGithubBuilder::default()
    }

    /// Upstream configuration pointing at this mock.
    pub fn upstream_config(&self) -> UpstreamConfig {
        UpstreamConfig {
            api_url: url::Url::parse(&format!("http://127.0.0.1:{}", self.port)).unwrap(),
            ..UpstreamConfig::default()
        }
    }

    pub fn release_calls(&self) -> usize {
        self.state.release_calls.load(Ordering::SeqCst)
    }

    pub fn listing_calls(&self) -> usize {
        self.state.listing_calls.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.release_calls() + self.listing_calls()
    }

    pub fn last_authorization(&self) -> Option<String> {
        self.state.last_authorization.lock().unwrap().clone()
    }
}

async fn handle(state: &MockState, req: Request<Incoming>) -> Response<Full<Bytes>> {
    *state.last_authorization.lock().unwrap() = req
        .headers()
        .get(hyper::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(String::from);

    if let Some(delay) = state.delay {
        tokio::time::sleep(delay).await;
    }

    let path = req.uri().path().strip_prefix(REPO_PREFIX).unwrap_or("");

    if let Some(tag) = path.strip_prefix("releases/tags/") {
        state.release_calls.fetch_add(1, Ordering::SeqCst);
        return match state.releases.contains(tag) {
            true => json_response(
                StatusCode::OK,
                json!({
                    "tag_name": tag,
                    "name": tag,
                    "html_url": format!("https://github.com/withastro/astro/releases/tag/{tag}"),
                    "prerelease": false,
                }),
            ),
            false => json_response(StatusCode::NOT_FOUND, json!({"message": "Not Found"})),
        };
    }

    if path == "contents/examples" {
        state.listing_calls.fetch_add(1, Ordering::SeqCst);
        let reference = req
            .uri()
            .query()
            .and_then(|q| {
                url::form_urlencoded::parse(q.as_bytes())
                    .find(|(k, _)| k == "ref")
                    .map(|(_, v)| v.into_owned())
            })
            .unwrap_or_default();

        return match state.listings.get(&reference) {
            Some(body) => json_response(StatusCode::OK, body.clone()),
            None => json_response(
                StatusCode::NOT_FOUND,
                json!({"message": format!("No commit found for the ref {reference}")}),
            ),
        };
    }

    json_response(StatusCode::NOT_FOUND, json!({"message": "Not Found"}))
}

fn json_response(status: StatusCode, body: Value) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from(body.to_string())));
    *response.status_mut() = status;
    response
}
