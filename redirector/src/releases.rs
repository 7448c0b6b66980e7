use crate::config::CacheConfig;
use crate::errors::Result;
use crate::github::{GithubClient, Release};
use crate::metrics_defs::RELEASE_CACHE_MISS;
use moka::future::Cache;
use shared::counter;
use std::sync::Arc;

/// Release metadata keyed by the user supplied version, e.g. `4.0.0`.
///
/// Missing releases are cached too, so an invalid version is only ever looked
/// up once. Transport errors are not cached.
pub struct ReleaseCache {
    client: Arc<GithubClient>,
    project: String,
    cache: Cache<String, Option<Arc<Release>>>,
}

impl ReleaseCache {
    pub fn new(client: Arc<GithubClient>, project: &str, config: &CacheConfig) -> Self {
        ReleaseCache {
            client,
            project: project.to_string(),
            cache: crate::cache::build(config),
        }
    }

    pub async fn get(&self, version: &str) -> Result<Option<Arc<Release>>> {
        let release = self
            .cache
            .try_get_with_by_ref(version, async {
                counter!(RELEASE_CACHE_MISS).increment(1);
                let tag = format!("{}@{}", self.project, version);
                let release = self.client.release_by_tag(&tag).await?;
                Ok::<_, crate::errors::RedirectError>(release.map(Arc::new))
            })
            .await?;

        Ok(release)
    }
}
