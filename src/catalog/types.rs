//! Common types for the catalog layer

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// An organization publishing applications. `code` is the business key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Maintainer {
    pub code: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Which read view is asking. Maintainers see every version they own;
/// set-top boxes only see versions marked visible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Perspective {
    Maintainer(String),
    Stb,
}

impl Perspective {
    pub fn maintainer(code: impl Into<String>) -> Self {
        Perspective::Maintainer(code.into())
    }
}

/// Derived latest-version markers, one per perspective. Recomputed by the
/// store after every mutation; never written directly by clients.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestFlags {
    pub maintainer: bool,
    pub stb: bool,
}

/// Per-language overrides for the displayable text fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalizedText {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformSpec {
    pub architecture: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dependency {
    pub id: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feature {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default)]
    pub required: bool,
}

/// Hardware requirements as free-form sizes (e.g. `"512M"`). The catalog
/// stores these verbatim; devices interpret them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HardwareSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ram: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dmips: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persistent: Option<String>,
}

/// Client-supplied state of one application version. Identity (maintainer,
/// appId, version) lives outside the payload and is immutable; everything
/// here may change on update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationPayload {
    pub name: String,
    /// Bundle type tag, e.g. `application/vnd.rdk-app.dac.native`. The
    /// vocabulary is owned by the deployment; the catalog only classifies
    /// tags as native or web through the configured web-type set.
    #[serde(rename = "type")]
    pub app_type: String,
    #[serde(default)]
    pub visible: bool,
    #[serde(default)]
    pub preferred: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<i64>,
    /// Keyed by language code; insertion order is preserved in JSON output.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub localizations: IndexMap<String, LocalizedText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<PlatformSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<Dependency>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<Feature>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hardware: Option<HardwareSpec>,
    /// Retrieval address for externally hosted web applications.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
}

/// One version as it appears in a details response's version list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionListing {
    pub version: String,
    pub visible: bool,
}

/// Full detail view of a resolved application version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationDetails {
    pub maintainer: Maintainer,
    pub app_id: String,
    pub version: String,
    pub latest: LatestFlags,
    #[serde(flatten)]
    pub payload: ApplicationPayload,
    /// Every version of the app visible to the requesting perspective,
    /// most recent first.
    pub versions: Vec<VersionListing>,
}

/// Compact row for list responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationSummary {
    pub maintainer_code: String,
    pub app_id: String,
    pub version: String,
    pub name: String,
    #[serde(rename = "type")]
    pub app_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub visible: bool,
    pub latest: LatestFlags,
}

/// Filters for version listing. All present filters must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilters {
    /// Substring match on the application name.
    pub name: Option<String>,
    /// Substring match on the description.
    pub description: Option<String>,
    /// Exact version match; lifts the latest-only restriction.
    pub version: Option<String>,
    /// Substring match on the type tag.
    pub app_type: Option<String>,
    /// Exact category match.
    pub category: Option<String>,
    pub platform_architecture: Option<String>,
    pub platform_variant: Option<String>,
    pub platform_os: Option<String>,
}

impl ListFilters {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// One page of results plus the total match count for pagination metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}
