//! Client for the two GitHub REST endpoints the redirector depends on:
//! "get a release by tag name" and "get repository content" for the
//! templates directory.

use crate::config::UpstreamConfig;
use crate::errors::{RedirectError, Result};
use crate::metrics_defs::{UPSTREAM_REQUEST_DURATION, UPSTREAM_REQUESTS};
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT};
use serde::Deserialize;
use shared::{counter, histogram};
use std::time::{Duration, Instant};
use url::Url;

const GITHUB_ACCEPT: &str = "application/vnd.github+json";

/// Release metadata as returned by the releases API.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Release {
    pub tag_name: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub prerelease: bool,
}

/// One item of a directory listing from the contents API. `html_url` is
/// nullable in the API schema (e.g. for submodules and symlinks).
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct DirectoryEntry {
    pub name: String,
    pub size: u64,
    #[serde(default)]
    pub html_url: Option<String>,
}

pub struct GithubClient {
    client: reqwest::Client,
    api_url: Url,
    owner: String,
    repo: String,
    examples_dir: String,
    token: Option<String>,
}

impl GithubClient {
    pub fn new(config: &UpstreamConfig, token: Option<String>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("astro-new/", env!("CARGO_PKG_VERSION"))),
        );
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_ACCEPT));

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(GithubClient {
            client: builder.build()?,
            api_url: config.api_url.clone(),
            owner: config.owner.clone(),
            repo: config.repo.clone(),
            examples_dir: config.examples_dir.trim_matches('/').to_string(),
            token,
        })
    }

    /// Looks up a release by its tag. Any status other than 200 means the
    /// release does not exist.
    pub async fn release_by_tag(&self, tag: &str) -> Result<Option<Release>> {
        let url = self.repo_url(&["releases", "tags", tag])?;
        let response = self.get(url).await?;

        match response.status() {
            StatusCode::OK => Ok(Some(response.json::<Release>().await?)),
            status => {
                tracing::debug!(tag, %status, "Release lookup returned no release");
                Ok(None)
            }
        }
    }

    /// Lists the templates directory at `reference`. The body is returned
    /// as-is so the caller can decide how to treat unexpected payloads; the
    /// API reports errors as JSON objects rather than arrays.
    pub async fn list_examples(&self, reference: &str) -> Result<serde_json::Value> {
        let mut segments = vec!["contents"];
        segments.extend(self.examples_dir.split('/'));

        let mut url = self.repo_url(&segments)?;
        url.query_pairs_mut().append_pair("ref", reference);

        let response = self.get(url).await?;
        Ok(response.json::<serde_json::Value>().await?)
    }

    fn repo_url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|_| RedirectError::InvalidUpstreamUrl(self.api_url.to_string()))?
            .pop_if_empty()
            .extend(["repos", self.owner.as_str(), self.repo.as_str()])
            .extend(segments);
        Ok(url)
    }

    async fn get(&self, url: Url) -> Result<reqwest::Response> {
        let mut request = self.client.get(url.clone());
        match &self.token {
            Some(token) => request = request.header(AUTHORIZATION, format!("Bearer {token}")),
            None => tracing::warn!(
                url = %url,
                "No API token configured, requests are unauthenticated and may be rate limited"
            ),
        }

        counter!(UPSTREAM_REQUESTS).increment(1);
        let start = Instant::now();
        let response = request.send().await;
        histogram!(UPSTREAM_REQUEST_DURATION).record(start.elapsed().as_secs_f64());

        let response = response?;
        tracing::debug!(url = %url, status = %response.status(), "Upstream request completed");
        Ok(response)
    }
}
