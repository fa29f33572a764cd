//! Application identifier grammar
//!
//! Every read, write, and delete operation addresses an application with a
//! single path token of the form `appId[:version]`:
//!
//! - `com.vendor.app` — no suffix, equivalent to `:latest`
//! - `com.vendor.app:2.1.0` — an explicit version
//! - `com.vendor.app:latest` — the latest version (case-insensitive)
//! - `com.vendor.app:all` — every version (deletes only, case-insensitive)

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdentifierError {
    #[error("invalid identifier {token:?}: expected appId or appId:version")]
    InvalidFormat { token: String },

    #[error("identifier {token:?} is missing a version after ':'")]
    MissingVersion { token: String },
}

/// Which version(s) of an application an identifier addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSelector {
    Latest,
    All,
    Exact(String),
}

impl VersionSelector {
    pub fn is_latest(&self) -> bool {
        matches!(self, VersionSelector::Latest)
    }

    pub fn is_all(&self) -> bool {
        matches!(self, VersionSelector::All)
    }

    /// The explicit version string, if one was given.
    pub fn exact(&self) -> Option<&str> {
        match self {
            VersionSelector::Exact(v) => Some(v),
            _ => None,
        }
    }
}

/// A parsed `appId[:version]` token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppIdentifier {
    pub app_id: String,
    pub selector: VersionSelector,
}

impl AppIdentifier {
    pub fn exact(app_id: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            selector: VersionSelector::Exact(version.into()),
        }
    }

    pub fn latest(app_id: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            selector: VersionSelector::Latest,
        }
    }

    pub fn all(app_id: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            selector: VersionSelector::All,
        }
    }
}

impl FromStr for AppIdentifier {
    type Err = IdentifierError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let mut parts = token.split(':');
        let app_id = parts.next().unwrap_or_default();
        let suffix = parts.next();

        if parts.next().is_some() {
            return Err(IdentifierError::InvalidFormat {
                token: token.to_string(),
            });
        }
        if app_id.is_empty() {
            return Err(IdentifierError::InvalidFormat {
                token: token.to_string(),
            });
        }

        let selector = match suffix {
            None => VersionSelector::Latest,
            Some("") => {
                return Err(IdentifierError::MissingVersion {
                    token: token.to_string(),
                });
            }
            Some(s) if s.eq_ignore_ascii_case("latest") => VersionSelector::Latest,
            Some(s) if s.eq_ignore_ascii_case("all") => VersionSelector::All,
            Some(s) => VersionSelector::Exact(s.to_string()),
        };

        Ok(Self {
            app_id: app_id.to_string(),
            selector,
        })
    }
}

impl fmt::Display for AppIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.selector {
            VersionSelector::Latest => write!(f, "{}:latest", self.app_id),
            VersionSelector::All => write!(f, "{}:all", self.app_id),
            VersionSelector::Exact(v) => write!(f, "{}:{}", self.app_id, v),
        }
    }
}
