use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::scoring::ScoringMode;
use crate::version::{Platform, DEFAULT_BINARIES_URL};

/// Runtime settings for an [`Estimator`](crate::Estimator). The weight table is configured
/// separately through [`WeightConfig`](crate::WeightConfig).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimatorConfig {
    /// Release list URL. Derived from `binaries_url` and the host platform when unset.
    #[serde(default)]
    pub catalog_url: Option<String>,

    #[serde(default = "default_binaries_url")]
    pub binaries_url: String,

    /// Where native compiler builds are cached.
    #[serde(default = "default_solc_dir")]
    pub solc_dir: PathBuf,

    /// Directory imports are resolved against.
    #[serde(default = "default_import_root")]
    pub import_root: PathBuf,

    #[serde(default = "default_catalog_timeout_seconds")]
    pub catalog_timeout_seconds: u64,

    #[serde(default = "default_download_timeout_seconds")]
    pub download_timeout_seconds: u64,

    #[serde(default = "default_optimizer_runs")]
    pub optimizer_runs: u32,

    #[serde(default)]
    pub scoring: ScoringMode,
}

fn default_binaries_url() -> String {
    DEFAULT_BINARIES_URL.to_string()
}
fn default_solc_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(|home| PathBuf::from(home).join(".solaudit").join("solc"))
        .unwrap_or_else(|| PathBuf::from(".solaudit/solc"))
}
fn default_import_root() -> PathBuf {
    PathBuf::from(".")
}
fn default_catalog_timeout_seconds() -> u64 {
    30
}
fn default_download_timeout_seconds() -> u64 {
    300
}
fn default_optimizer_runs() -> u32 {
    200
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            catalog_url: None,
            binaries_url: default_binaries_url(),
            solc_dir: default_solc_dir(),
            import_root: default_import_root(),
            catalog_timeout_seconds: default_catalog_timeout_seconds(),
            download_timeout_seconds: default_download_timeout_seconds(),
            optimizer_runs: default_optimizer_runs(),
            scoring: ScoringMode::default(),
        }
    }
}

impl EstimatorConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("SOLAUDIT_CATALOG_URL") {
            config.catalog_url = Some(url);
        }

        if let Ok(url) = std::env::var("SOLAUDIT_BINARIES_URL") {
            config.binaries_url = url;
        }

        if let Ok(dir) = std::env::var("SOLAUDIT_SOLC_DIR") {
            config.solc_dir = PathBuf::from(dir);
        }

        if let Ok(timeout) = std::env::var("SOLAUDIT_CATALOG_TIMEOUT") {
            if let Ok(t) = timeout.parse::<u64>() {
                config.catalog_timeout_seconds = t;
            }
        }

        config
    }

    pub fn catalog_url(&self) -> String {
        self.catalog_url
            .clone()
            .unwrap_or_else(|| Platform::current().catalog_url(&self.binaries_url))
    }

    pub fn catalog_timeout(&self) -> Duration {
        Duration::from_secs(self.catalog_timeout_seconds)
    }

    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_seconds)
    }
}
