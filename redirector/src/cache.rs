use crate::config::CacheConfig;
use moka::future::Cache;

/// Builds a cache keyed by reference string. Without TTL or capacity settings
/// entries live for the lifetime of the process.
pub fn build<V>(config: &CacheConfig) -> Cache<String, V>
where
    V: Clone + Send + Sync + 'static,
{
    let mut builder = Cache::builder();
    if let Some(ttl) = config.ttl() {
        builder = builder.time_to_live(ttl);
    }
    if let Some(capacity) = config.max_capacity {
        builder = builder.max_capacity(capacity);
    }
    builder.build()
}
