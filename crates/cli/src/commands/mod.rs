//! Command implementations for the solaudit CLI
//!
//! `estimate` runs the whole pipeline and prints the time breakdown, `resolve` stops after
//! compiler version resolution, and `weights` prints the weight table so an overlay can be
//! checked without compiling anything.

pub mod estimate;
pub mod resolve;
pub mod weights;

use std::path::PathBuf;

use clap::Args;
use solaudit_estimator::EstimatorConfig;

/// Where compilers and the release catalog come from.
#[derive(Args, Debug, Clone, Default)]
pub struct RuntimeArgs {
    /// Release list URL (defaults to the platform list on the binaries mirror)
    #[arg(long)]
    pub catalog_url: Option<String>,

    /// Base URL of the compiler binaries mirror
    #[arg(long)]
    pub binaries_url: Option<String>,

    /// Directory holding downloaded compiler builds
    #[arg(long)]
    pub solc_dir: Option<PathBuf>,

    /// Directory import paths are resolved against
    #[arg(long)]
    pub import_root: Option<PathBuf>,

    /// Seconds to wait for the release catalog
    #[arg(long)]
    pub catalog_timeout: Option<u64>,
}

impl RuntimeArgs {
    /// Environment first, then flags.
    pub fn config(&self) -> EstimatorConfig {
        let mut config = EstimatorConfig::from_env();

        if let Some(url) = &self.catalog_url {
            config.catalog_url = Some(url.clone());
        }
        if let Some(url) = &self.binaries_url {
            config.binaries_url = url.clone();
        }
        if let Some(dir) = &self.solc_dir {
            config.solc_dir = dir.clone();
        }
        if let Some(root) = &self.import_root {
            config.import_root = root.clone();
        }
        if let Some(timeout) = self.catalog_timeout {
            config.catalog_timeout_seconds = timeout;
        }
        config
    }
}
