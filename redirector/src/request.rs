use crate::errors::{RedirectError, Result};
use crate::platform::Platform;

/// Query parameter selecting the platform.
const PLATFORM_PARAM: &str = "on";

/// Syntactic view of an incoming request, before the reference is validated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestTarget<'a> {
    pub platform: Platform,
    pub template: &'a str,
    /// Reference exactly as requested, if the path named one.
    pub reference: Option<&'a str>,
}

/// A fully resolved request: the reference is the git ref templates are listed at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedRequest {
    pub platform: Platform,
    pub template: String,
    pub reference: String,
}

/// Parses the request path and query string.
///
/// The platform is checked first so an unsupported value fails before any
/// other work happens.
pub fn parse<'a>(path: &'a str, query: Option<&str>) -> Result<RequestTarget<'a>> {
    let platform = match platform_param(query) {
        Some(value) => value.parse::<Platform>()?,
        None => Platform::default(),
    };

    let path = strip_path(path);
    let (template, reference) = match path.split_once('@') {
        Some((template, reference)) => {
            if template.is_empty() || reference.is_empty() {
                return Err(RedirectError::MalformedReference(path.to_string()));
            }
            (template, Some(reference))
        }
        None => (path, None),
    };

    Ok(RequestTarget {
        platform,
        template,
        reference,
    })
}

/// The bare root, without a template or platform, is served the landing page.
pub fn is_root(path: &str, query: Option<&str>) -> bool {
    strip_path(path).is_empty() && platform_param(query).is_none()
}

fn strip_path(path: &str) -> &str {
    path.strip_prefix('/').unwrap_or(path)
}

fn platform_param(query: Option<&str>) -> Option<String> {
    let query = query?;
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == PLATFORM_PARAM)
        .map(|(_, value)| value.into_owned())
}
