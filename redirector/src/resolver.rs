use crate::config::Config;
use crate::errors::{RedirectError, Result};
use crate::github::GithubClient;
use crate::reference::{LATEST, ReferenceValidator};
use crate::releases::ReleaseCache;
use crate::request::{self, ParsedRequest};
use crate::templates::TemplateCache;
use std::sync::Arc;

/// Outcome of a successfully resolved request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// The bare root was requested
    Landing(String),
    /// Destination of the requested template on the requested platform
    Redirect(String),
}

/// Resolves requests to template destinations. Holds the release and
/// template caches, so one instance is built at startup and shared.
pub struct Resolver {
    validator: ReferenceValidator,
    templates: TemplateCache,
    landing_path: String,
}

impl Resolver {
    pub fn new(config: &Config, token: Option<String>) -> Result<Self> {
        let upstream = &config.upstream;
        let client = Arc::new(GithubClient::new(upstream, token)?);

        let releases = ReleaseCache::new(client.clone(), &upstream.project, &config.cache);
        let validator =
            ReferenceValidator::new(releases, &upstream.project, upstream.releases_url());
        let templates = TemplateCache::new(client, upstream, &config.cache);

        Ok(Resolver {
            validator,
            templates,
            landing_path: config.landing_path.clone(),
        })
    }

    pub async fn resolve(&self, path: &str, query: Option<&str>) -> Result<Resolution> {
        if request::is_root(path, query) {
            return Ok(Resolution::Landing(self.landing_path.clone()));
        }

        let request = self.parse(path, query).await?;
        let templates = self.templates.get(&request.reference).await?;

        match templates.iter().find(|t| t.name == request.template) {
            Some(template) => Ok(Resolution::Redirect(
                template.url(request.platform).to_string(),
            )),
            None => Err(RedirectError::TemplateNotFound {
                template: request.template,
                reference: request.reference,
                available: templates.iter().map(|t| t.name.clone()).collect(),
            }),
        }
    }

    /// Parses the request and normalizes an explicitly requested reference.
    pub async fn parse(&self, path: &str, query: Option<&str>) -> Result<ParsedRequest> {
        let target = request::parse(path, query)?;

        let reference = match target.reference {
            Some(reference) => self.validator.normalize(reference).await?,
            None => LATEST.to_string(),
        };

        Ok(ParsedRequest {
            platform: target.platform,
            template: target.template.to_string(),
            reference,
        })
    }
}
