use crate::errors::{RedirectError, Result};
use crate::releases::ReleaseCache;

/// Reference used when the request does not name one.
pub const LATEST: &str = "latest";
/// Moving reference for the upcoming release.
pub const NEXT: &str = "next";
/// Branch `next` resolves to.
const NEXT_BRANCH: &str = "main";

/// Decides whether a requested version denotes something the upstream can
/// serve and maps it to the git ref templates are listed at.
pub struct ReferenceValidator {
    releases: ReleaseCache,
    project: String,
    releases_url: String,
}

impl ReferenceValidator {
    pub fn new(releases: ReleaseCache, project: &str, releases_url: String) -> Self {
        ReferenceValidator {
            releases,
            project: project.to_string(),
            releases_url,
        }
    }

    /// `next` and `latest` are always valid. Anything else must be the version
    /// of a published release.
    pub async fn validate(&self, reference: &str) -> Result<()> {
        if reference == NEXT || reference == LATEST {
            return Ok(());
        }

        match self.releases.get(reference).await? {
            Some(_) => Ok(()),
            None => Err(RedirectError::InvalidReference {
                reference: reference.to_string(),
                releases_url: self.releases_url.clone(),
            }),
        }
    }

    /// Validates `reference` and returns the git ref to list templates at.
    pub async fn normalize(&self, reference: &str) -> Result<String> {
        self.validate(reference).await?;

        Ok(match reference {
            NEXT => NEXT_BRANCH.to_string(),
            LATEST => LATEST.to_string(),
            version => format!("{}@{}", self.project, version),
        })
    }
}
