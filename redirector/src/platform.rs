use crate::errors::RedirectError;
use std::fmt;
use std::str::FromStr;

/// Destination service a template can be opened on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Platform {
    #[default]
    Stackblitz,
    Codesandbox,
    Netlify,
    Github,
    Gitpod,
}

impl Platform {
    pub const ALL: [Platform; 5] = [
        Platform::Stackblitz,
        Platform::Codesandbox,
        Platform::Netlify,
        Platform::Github,
        Platform::Gitpod,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Platform::Stackblitz => "stackblitz",
            Platform::Codesandbox => "codesandbox",
            Platform::Netlify => "netlify",
            Platform::Github => "github",
            Platform::Gitpod => "gitpod",
        }
    }

    /// Comma separated list of every supported platform name.
    pub fn valid_names() -> String {
        Self::ALL
            .iter()
            .map(Platform::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl FromStr for Platform {
    type Err = RedirectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| RedirectError::UnsupportedPlatform(s.to_string()))
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
