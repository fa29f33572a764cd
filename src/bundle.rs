//! Bundle URL resolution
//!
//! A resolved catalog row is returned to callers together with the URL the
//! bundle can be fetched from. Natively packaged applications live on the
//! deployment's storage host under a fixed path scheme parameterized by
//! platform and firmware; web applications are hosted externally and their
//! stored source URL is passed through verbatim.
//!
//! Which type tags count as "web" is deployment configuration, not
//! hard-coded here: the resolver is constructed with the tag set and tests
//! membership case-insensitively.

use std::collections::HashSet;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UrlError {
    #[error("missing mandatory field: {field}")]
    MissingField { field: &'static str },
}

/// The bits of a catalog row the resolver needs.
#[derive(Debug, Clone, Copy)]
pub struct BundleRef<'a> {
    pub app_id: &'a str,
    pub version: &'a str,
    pub app_type: &'a str,
    pub source_url: Option<&'a str>,
}

/// Builds retrieval URLs for resolved catalog rows.
#[derive(Debug, Clone)]
pub struct UrlResolver {
    protocol: String,
    bundle_host: String,
    web_types: HashSet<String>,
}

impl UrlResolver {
    pub fn new(
        protocol: impl Into<String>,
        bundle_host: impl Into<String>,
        web_types: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        let web_types = web_types
            .into_iter()
            .map(|t| t.into().to_ascii_lowercase())
            .collect();
        Self {
            protocol: protocol.into(),
            bundle_host: bundle_host.into(),
            web_types,
        }
    }

    /// Whether a type tag classifies as a web application.
    pub fn is_web_type(&self, tag: &str) -> bool {
        self.web_types.contains(&tag.to_ascii_lowercase())
    }

    /// Produce the retrieval URL for a resolved row.
    ///
    /// Web rows return their stored source URL unchanged; platform and
    /// firmware are ignored. Native rows require both and fail with a
    /// [`UrlError::MissingField`] naming whichever is absent or blank.
    pub fn resolve(
        &self,
        bundle: BundleRef<'_>,
        platform_name: Option<&str>,
        firmware_ver: Option<&str>,
    ) -> Result<String, UrlError> {
        if self.is_web_type(bundle.app_type) {
            let source_url = bundle
                .source_url
                .filter(|url| !url.trim().is_empty())
                .ok_or(UrlError::MissingField {
                    field: "sourceUrl",
                })?;
            return Ok(source_url.to_string());
        }

        let platform = required(platform_name, "platformName")?;
        let firmware = required(firmware_ver, "firmwareVer")?;

        Ok(format!(
            "{protocol}://{host}/{app_id}/{version}/{platform}/{firmware}/{app_id}_{version}_{platform}_{firmware}.tar.gz",
            protocol = self.protocol,
            host = self.bundle_host,
            app_id = bundle.app_id,
            version = bundle.version,
        ))
    }
}

fn required<'a>(value: Option<&'a str>, field: &'static str) -> Result<&'a str, UrlError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or(UrlError::MissingField { field })
}
