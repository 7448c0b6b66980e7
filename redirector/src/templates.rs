use crate::config::{CacheConfig, UpstreamConfig};
use crate::errors::{RedirectError, Result};
use crate::github::{DirectoryEntry, GithubClient};
use crate::metrics_defs::LISTING_CACHE_MISS;
use crate::platform::Platform;
use moka::future::Cache;
use shared::counter;
use std::sync::Arc;

/// Placeholder used for every template until deploy links exist.
pub const NETLIFY_PLACEHOLDER: &str = "https://astro.build";

/// A template available at some reference, with its destination on every platform.
#[derive(Clone, Debug, PartialEq)]
pub struct TemplateEntry {
    pub name: String,
    pub github: String,
    pub netlify: String,
    pub stackblitz: String,
    pub codesandbox: String,
    pub gitpod: String,
}

impl TemplateEntry {
    pub fn url(&self, platform: Platform) -> &str {
        match platform {
            Platform::Stackblitz => &self.stackblitz,
            Platform::Codesandbox => &self.codesandbox,
            Platform::Netlify => &self.netlify,
            Platform::Github => &self.github,
            Platform::Gitpod => &self.gitpod,
        }
    }
}

/// Builds the per-platform URLs of the templates in one repository.
#[derive(Clone, Debug)]
struct UrlScheme {
    owner: String,
    repo: String,
    examples_dir: String,
}

impl UrlScheme {
    fn entry(&self, reference: &str, dir: DirectoryEntry) -> TemplateEntry {
        let tree = format!(
            "github.com/{}/{}/tree/{reference}/{}/{}",
            self.owner, self.repo, self.examples_dir, dir.name
        );
        let repo_path = format!(
            "{}/{}/tree/{reference}/{}/{}",
            self.owner, self.repo, self.examples_dir, dir.name
        );

        TemplateEntry {
            github: dir.html_url.unwrap_or_else(|| format!("https://{tree}")),
            netlify: NETLIFY_PLACEHOLDER.to_string(),
            stackblitz: format!("https://stackblitz.com/github/{repo_path}"),
            codesandbox: format!("https://codesandbox.io/p/sandbox/github/{repo_path}"),
            gitpod: format!("https://gitpod.io/#https://{tree}"),
            name: dir.name,
        }
    }
}

/// Template listings keyed by the git ref they were listed at.
pub struct TemplateCache {
    client: Arc<GithubClient>,
    scheme: UrlScheme,
    cache: Cache<String, Arc<Vec<TemplateEntry>>>,
}

impl TemplateCache {
    pub fn new(client: Arc<GithubClient>, upstream: &UpstreamConfig, config: &CacheConfig) -> Self {
        TemplateCache {
            client,
            scheme: UrlScheme {
                owner: upstream.owner.clone(),
                repo: upstream.repo.clone(),
                examples_dir: upstream.examples_dir.trim_matches('/').to_string(),
            },
            cache: crate::cache::build(config),
        }
    }

    /// Returns the templates at `reference`, in upstream order. Concurrent
    /// callers for an uncached reference share a single upstream request.
    pub async fn get(&self, reference: &str) -> Result<Arc<Vec<TemplateEntry>>> {
        let templates = self
            .cache
            .try_get_with_by_ref(reference, self.fetch(reference))
            .await?;

        Ok(templates)
    }

    async fn fetch(&self, reference: &str) -> Result<Arc<Vec<TemplateEntry>>> {
        counter!(LISTING_CACHE_MISS).increment(1);

        let body = self.client.list_examples(reference).await?;
        let items = match body {
            serde_json::Value::Array(items) => items,
            payload => {
                tracing::error!(reference, payload = %payload, "Unexpected template listing payload");
                return Err(RedirectError::UpstreamFormat);
            }
        };

        let mut templates = Vec::new();
        for item in items {
            let dir: DirectoryEntry = match serde_json::from_value(item) {
                Ok(dir) => dir,
                Err(e) => {
                    tracing::warn!(reference, error = %e, "Skipping malformed template listing entry");
                    continue;
                }
            };

            // The contents API reports a size of 0 for directories
            if dir.size == 0 {
                templates.push(self.scheme.entry(reference, dir));
            }
        }

        tracing::info!(reference, count = templates.len(), "Loaded template listing");
        Ok(Arc::new(templates))
    }
}
