use http::StatusCode;
use std::sync::Arc;
use thiserror::Error;

/// Result type alias for redirector operations
pub type Result<T, E = RedirectError> = std::result::Result<T, E>;

/// Errors that can occur while resolving a redirect
#[derive(Error, Debug)]
pub enum RedirectError {
    #[error("Unsupported platform \"{0}\". Valid platforms are: {valid}", valid = crate::platform::Platform::valid_names())]
    UnsupportedPlatform(String),

    #[error("Malformed template reference \"{0}\", expected <template>@<ref>")]
    MalformedReference(String),

    #[error(
        "Invalid version \"{reference}\". Use \"next\", \"latest\" or a released version such as \"4.0.0\". See {releases_url} for all releases."
    )]
    InvalidReference {
        reference: String,
        releases_url: String,
    },

    #[error("Template \"{template}\" not found for ref \"{reference}\"")]
    TemplateNotFound {
        template: String,
        reference: String,
        available: Vec<String>,
    },

    #[error("Unexpected response format from upstream")]
    UpstreamFormat,

    #[error("Upstream request failed: {0}")]
    UpstreamRequest(#[from] reqwest::Error),

    #[error("Invalid upstream URL: {0}")]
    InvalidUpstreamUrl(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error produced by a cache initialization shared between concurrent requests
    #[error(transparent)]
    Cached(#[from] Arc<RedirectError>),
}

impl RedirectError {
    /// Status code returned to the client for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            RedirectError::UnsupportedPlatform(_)
            | RedirectError::MalformedReference(_)
            | RedirectError::InvalidReference { .. } => StatusCode::BAD_REQUEST,
            RedirectError::TemplateNotFound { .. } => StatusCode::NOT_FOUND,
            RedirectError::Cached(inner) => inner.status_code(),
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
