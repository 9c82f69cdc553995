use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{EstimateError, Result};

pub const DEFAULT_BINARIES_URL: &str = "https://binaries.soliditylang.org";

/// Host platforms the compiler mirror publishes native builds for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    LinuxAmd64,
    MacosAmd64,
    WindowsAmd64,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Self::MacosAmd64
        } else if cfg!(target_os = "windows") {
            Self::WindowsAmd64
        } else {
            Self::LinuxAmd64
        }
    }

    pub fn dir_name(&self) -> &'static str {
        match self {
            Self::LinuxAmd64 => "linux-amd64",
            Self::MacosAmd64 => "macosx-amd64",
            Self::WindowsAmd64 => "windows-amd64",
        }
    }

    /// File name of the native compiler for `version` on this platform, as the mirror
    /// lists it.
    pub fn binary_name(&self, version: &ResolvedVersion) -> String {
        let suffix = if *self == Self::WindowsAmd64 { ".exe" } else { "" };
        format!("solc-{}-{}{}", self.dir_name(), version.build(), suffix)
    }

    pub fn catalog_url(&self, binaries_url: &str) -> String {
        format!("{}/{}/list.json", binaries_url.trim_end_matches('/'), self.dir_name())
    }
}

const BUILD_PREFIXES: &[&str] = &[
    "soljson-",
    "solc-linux-amd64-",
    "solc-macosx-amd64-",
    "solc-windows-amd64-",
    "solc-emscripten-wasm32-",
];

const BUILD_SUFFIXES: &[&str] = &[".js", ".exe"];

/// Fully qualified compiler build, e.g. `v0.8.19+commit.7dd6d404`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ResolvedVersion {
    build: String,
}

impl ResolvedVersion {
    pub fn new(build: impl Into<String>) -> Self {
        Self {
            build: build.into(),
        }
    }

    /// Strips the mirror's platform prefix and file extension from a listed file name.
    pub fn from_build_filename(filename: &str) -> Self {
        let mut build = filename;
        if let Some(prefix) = BUILD_PREFIXES.iter().find(|p| build.starts_with(*p)) {
            build = &build[prefix.len()..];
        }
        if let Some(suffix) = BUILD_SUFFIXES.iter().find(|s| build.ends_with(*s)) {
            build = &build[..build.len() - suffix.len()];
        }
        Self::new(build)
    }

    pub fn build(&self) -> &str {
        &self.build
    }

    /// The build without its leading `v`, which is how `solc --version` prints it.
    pub fn long_version(&self) -> &str {
        self.build.trim_start_matches('v')
    }
}

impl fmt::Display for ResolvedVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.build)
    }
}

/// The release list document. Only `releases` is read.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VersionCatalog {
    #[serde(default)]
    pub releases: BTreeMap<String, String>,
}

impl VersionCatalog {
    pub fn lookup(&self, key: &str) -> Option<ResolvedVersion> {
        self.releases
            .get(key)
            .map(|filename| ResolvedVersion::from_build_filename(filename))
    }
}

#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch(&self) -> Result<VersionCatalog>;

    fn location(&self) -> &str;
}

pub struct HttpCatalog {
    client: reqwest::Client,
    url: String,
}

impl HttpCatalog {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let url = url.into();
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EstimateError::CatalogUnreachable {
                url: url.clone(),
                reason: e.to_string(),
            })?;
        Ok(Self { client, url })
    }

    fn unreachable(&self, reason: impl ToString) -> EstimateError {
        EstimateError::CatalogUnreachable {
            url: self.url.clone(),
            reason: reason.to_string(),
        }
    }
}

#[async_trait]
impl CatalogSource for HttpCatalog {
    async fn fetch(&self) -> Result<VersionCatalog> {
        debug!("Fetching release catalog from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| self.unreachable(e))?;

        let catalog: VersionCatalog = response.json().await.map_err(|e| self.unreachable(e))?;
        debug!("Catalog lists {} releases", catalog.releases.len());
        Ok(catalog)
    }

    fn location(&self) -> &str {
        &self.url
    }
}
