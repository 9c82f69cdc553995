use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info};

use super::standard_json::{CompilerInput, CompilerOutput};
use super::{Compiler, CompilerLoader};
use crate::error::{EstimateError, Result};
use crate::version::{Platform, ResolvedVersion};

/// Finds native `solc` builds in an install directory, downloading missing ones from the
/// binaries mirror.
pub struct SolcLoader {
    install_dir: PathBuf,
    binaries_url: String,
    platform: Platform,
    client: reqwest::Client,
}

impl SolcLoader {
    pub fn new(
        install_dir: impl Into<PathBuf>,
        binaries_url: impl Into<String>,
        download_timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(download_timeout)
            .build()
            .map_err(|e| EstimateError::CompilerLoadFailed {
                version: "<any>".to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            install_dir: install_dir.into(),
            binaries_url: binaries_url.into(),
            platform: Platform::current(),
            client,
        })
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn binary_path(&self, version: &ResolvedVersion) -> PathBuf {
        self.install_dir.join(self.platform.binary_name(version))
    }

    async fn download(&self, version: &ResolvedVersion, target: &Path) -> Result<()> {
        let url = format!(
            "{}/{}/{}",
            self.binaries_url.trim_end_matches('/'),
            self.platform.dir_name(),
            self.platform.binary_name(version)
        );
        info!("Downloading compiler {} from {}", version, url);

        let failed = |reason: String| EstimateError::CompilerLoadFailed {
            version: version.to_string(),
            reason,
        };

        let bytes = self
            .client
            .get(&url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| failed(e.to_string()))?
            .bytes()
            .await
            .map_err(|e| failed(e.to_string()))?;

        tokio::fs::create_dir_all(&self.install_dir)
            .await
            .map_err(|e| failed(e.to_string()))?;

        let dir = self.install_dir.clone();
        let destination = target.to_path_buf();
        let size = bytes.len();
        tokio::task::spawn_blocking(move || install(&dir, &destination, &bytes))
            .await
            .map_err(|e| failed(e.to_string()))?
            .map_err(|e| failed(e.to_string()))?;

        debug!("Installed {} ({} bytes)", target.display(), size);
        Ok(())
    }
}

#[async_trait]
impl CompilerLoader for SolcLoader {
    async fn load(&self, version: &ResolvedVersion) -> Result<Arc<dyn Compiler>> {
        let path = self.binary_path(version);
        if !path.exists() {
            self.download(version, &path).await?;
        }

        let binary = SolcBinary::new(path, version.clone());
        binary.verify().await?;
        Ok(Arc::new(binary))
    }
}

/// Writes into a uniquely named file inside `dir` and renames it over `target`, so
/// concurrent downloads of one build never share a partial file.
fn install(dir: &Path, target: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut staged = tempfile::Builder::new().prefix(".solc-").suffix(".part").tempfile_in(dir)?;
    staged.write_all(bytes)?;
    staged.as_file().sync_all()?;
    make_executable(staged.path())?;
    staged.persist(target).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(unix)]
fn make_executable(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

/// A native compiler driven through `--standard-json` on stdin/stdout.
pub struct SolcBinary {
    path: PathBuf,
    version: ResolvedVersion,
}

impl SolcBinary {
    pub fn new(path: impl Into<PathBuf>, version: ResolvedVersion) -> Self {
        Self {
            path: path.into(),
            version,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Checks the binary runs and reports the build it was loaded for.
    pub async fn verify(&self) -> Result<()> {
        let failed = |reason: String| EstimateError::CompilerLoadFailed {
            version: self.version.to_string(),
            reason,
        };

        let output = Command::new(&self.path)
            .arg("--version")
            .output()
            .await
            .map_err(|e| failed(format!("{}: {}", self.path.display(), e)))?;

        let reported = String::from_utf8_lossy(&output.stdout);
        if !output.status.success() {
            return Err(failed(format!("`--version` exited with {}", output.status)));
        }
        if !reported.contains(self.version.long_version()) {
            return Err(failed(format!(
                "binary reports `{}`, expected {}",
                reported.trim(),
                self.version.long_version()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl Compiler for SolcBinary {
    fn version(&self) -> &ResolvedVersion {
        &self.version
    }

    async fn compile(&self, input: &CompilerInput) -> Result<CompilerOutput> {
        let invocation = |reason: String| EstimateError::CompilerInvocationFailed { reason };

        let job = serde_json::to_vec(input).map_err(|e| invocation(e.to_string()))?;

        let mut child = Command::new(&self.path)
            .arg("--standard-json")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| invocation(format!("{}: {}", self.path.display(), e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(&job).await.map_err(|e| invocation(e.to_string()))?;
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| invocation(e.to_string()))?;

        serde_json::from_slice(&output.stdout).map_err(|e| {
            invocation(format!(
                "unreadable compiler result ({}); stderr: {}",
                e,
                String::from_utf8_lossy(&output.stderr).trim()
            ))
        })
    }
}
