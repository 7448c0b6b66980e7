use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Port cannot be 0")]
    InvalidPort,

    #[error("Upstream API URL cannot be a base: {0}")]
    InvalidApiUrl(Url),

    #[error("Empty upstream field: {0}")]
    EmptyUpstreamField(&'static str),

    #[error("Landing path must start with '/': {0}")]
    InvalidLandingPath(String),

    #[error("Cache {0} cannot be 0")]
    InvalidCacheSetting(&'static str),
}

/// Redirector configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Config {
    /// Main listener for redirect requests
    #[serde(default)]
    pub listener: Listener,
    /// Admin listener for health and readiness probes
    #[serde(default = "default_admin_listener")]
    pub admin_listener: Listener,
    /// Where templates and releases are looked up
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    /// Target of the redirect served for the bare root path
    #[serde(default = "default_landing_path")]
    pub landing_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            listener: Listener::default(),
            admin_listener: default_admin_listener(),
            upstream: UpstreamConfig::default(),
            cache: CacheConfig::default(),
            landing_path: default_landing_path(),
        }
    }
}

impl Config {
    /// Validates the redirector configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.listener.validate()?;
        self.admin_listener.validate()?;
        self.upstream.validate()?;
        self.cache.validate()?;

        if !self.landing_path.starts_with('/') {
            return Err(ValidationError::InvalidLandingPath(
                self.landing_path.clone(),
            ));
        }

        Ok(())
    }
}

/// Network listener configuration
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Listener {
    /// Host address to bind to (e.g., "0.0.0.0" or "127.0.0.1")
    pub host: String,
    /// Port number to listen on
    pub port: u16,
}

impl Default for Listener {
    fn default() -> Self {
        Listener {
            host: "127.0.0.1".into(),
            port: 3000,
        }
    }
}

impl Listener {
    /// Validates the listener configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        Ok(())
    }
}

fn default_admin_listener() -> Listener {
    Listener {
        host: "127.0.0.1".into(),
        port: 3001,
    }
}

fn default_landing_path() -> String {
    "/latest".into()
}

/// Coordinates of the repository holding the templates and the API serving it.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL of the GitHub REST API
    pub api_url: Url,
    pub owner: String,
    pub repo: String,
    /// Directory of the repository whose subdirectories are the templates
    pub examples_dir: String,
    /// Package name used as release tag prefix, as in `astro@4.0.0`
    pub project: String,
    /// Environment variable holding the optional API token
    pub token_env: String,
    /// Timeout applied to each upstream request. Client defaults apply when unset.
    pub timeout_secs: Option<u64>,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        UpstreamConfig {
            api_url: Url::parse("https://api.github.com").expect("valid default api url"),
            owner: "withastro".into(),
            repo: "astro".into(),
            examples_dir: "examples".into(),
            project: "astro".into(),
            token_env: "GITHUB_TOKEN".into(),
            timeout_secs: None,
        }
    }
}

impl UpstreamConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.api_url.cannot_be_a_base() {
            return Err(ValidationError::InvalidApiUrl(self.api_url.clone()));
        }

        let required = [
            ("owner", &self.owner),
            ("repo", &self.repo),
            ("examples_dir", &self.examples_dir),
            ("project", &self.project),
        ];
        for (field, value) in required {
            if value.trim_matches('/').is_empty() {
                return Err(ValidationError::EmptyUpstreamField(field));
            }
        }

        Ok(())
    }

    /// Reads the API token from the configured environment variable.
    pub fn token_from_env(&self) -> Option<String> {
        std::env::var(&self.token_env)
            .ok()
            .filter(|token| !token.is_empty())
    }

    /// Human readable listing of all releases of the repository.
    pub fn releases_url(&self) -> String {
        format!("https://github.com/{}/{}/releases", self.owner, self.repo)
    }
}

/// Cache settings shared by the release and template caches.
///
/// Both caches are unbounded and never expire unless configured otherwise.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_secs: Option<u64>,
    pub max_capacity: Option<u64>,
}

impl CacheConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.ttl_secs == Some(0) {
            return Err(ValidationError::InvalidCacheSetting("ttl_secs"));
        }
        if self.max_capacity == Some(0) {
            return Err(ValidationError::InvalidCacheSetting("max_capacity"));
        }
        Ok(())
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.ttl_secs.map(Duration::from_secs)
    }
}
