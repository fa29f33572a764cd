use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default limit applied to list operations when the caller gives none
pub const DEFAULT_PAGE_LIMIT: u64 = 20;

/// Catalog configuration structure
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct CatalogConfig {
    pub bundles: BundleConfig,
}

/// Bundle URL policy: where natively packaged bundles are hosted and which
/// type tags classify an application as externally hosted web content.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct BundleConfig {
    pub protocol: String,
    pub host: String,
    pub web_app_types: Vec<String>,
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self {
            protocol: "http".to_string(),
            host: "localhost".to_string(),
            web_app_types: vec!["application/vnd.rdk-app.html5".to_string()],
        }
    }
}

impl CatalogConfig {
    /// Load configuration from a JSON file, or defaults when `path` is None.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => {
                let contents = std::fs::read_to_string(path)?;
                Ok(serde_json::from_str(&contents)?)
            }
            None => Ok(Self::default()),
        }
    }
}

/// Returns the path to the data directory for the catalog.
/// Uses $XDG_DATA_HOME/appstore-catalog if XDG_DATA_HOME is set,
/// otherwise falls back to ~/.local/share/appstore-catalog,
/// or ./appstore-catalog if neither is available.
pub fn data_dir() -> PathBuf {
    data_dir_with_env(std::env::var("XDG_DATA_HOME").ok(), dirs::home_dir())
}

/// Returns the path to the database file.
pub fn db_path() -> PathBuf {
    data_dir().join("catalog.db")
}

/// Returns the path to the log file.
pub fn log_path() -> PathBuf {
    data_dir().join("appstore-catalog.log")
}

fn data_dir_with_env(xdg_data_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let data_dir = xdg_data_home
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));

    data_dir.join("appstore-catalog")
}
