//! End-to-end estimation: read source, resolve the compiler, compile, score.
//!
//! Every stage short-circuits the rest on failure. The weight table is fixed when the
//! estimator is built and never changes afterwards.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info};

use crate::compiler::{CompilerBridge, CompilerLoader, SolcLoader, StructuralArtifact};
use crate::config::EstimatorConfig;
use crate::error::Result;
use crate::imports::{ImportCallback, ImportResolver};
use crate::scoring::{EstimateBreakdown, ScoringEngine, ScoringMode, SizeClass};
use crate::source::{SourceDocument, SourceSignals};
use crate::version::{
    extract_constraint, CatalogSource, HttpCatalog, ResolvedVersion, VersionConstraint,
    VersionResolver,
};
use crate::weights::WeightConfig;

/// Everything known about one estimate, for reporting.
#[derive(Debug, Clone, Serialize)]
pub struct Estimate {
    pub source: String,
    pub constraint: VersionConstraint,
    pub compiler: ResolvedVersion,
    pub size_class: SizeClass,
    pub signals: SourceSignals,
    pub artifact: StructuralArtifact,
    pub breakdown: EstimateBreakdown,
}

pub struct Estimator {
    resolver: Arc<VersionResolver>,
    bridge: CompilerBridge,
    imports: Arc<dyn ImportCallback>,
    weights: WeightConfig,
    mode: ScoringMode,
    optimizer_runs: u32,
}

impl Estimator {
    pub fn new(
        catalog: Arc<dyn CatalogSource>,
        loader: Arc<dyn CompilerLoader>,
        imports: Arc<dyn ImportCallback>,
        weights: WeightConfig,
    ) -> Self {
        Self {
            resolver: Arc::new(VersionResolver::new(catalog)),
            bridge: CompilerBridge::new(loader),
            imports,
            weights,
            mode: ScoringMode::default(),
            optimizer_runs: 200,
        }
    }

    /// Network catalog, native compiler and filesystem imports, as configured.
    pub fn from_config(config: &EstimatorConfig, weights: WeightConfig) -> Result<Self> {
        let catalog = HttpCatalog::new(config.catalog_url(), config.catalog_timeout())?;
        let loader = SolcLoader::new(
            &config.solc_dir,
            config.binaries_url.clone(),
            config.download_timeout(),
        )?;
        let imports = ImportResolver::new(&config.import_root);

        Ok(Self::new(Arc::new(catalog), Arc::new(loader), Arc::new(imports), weights)
            .with_mode(config.scoring)
            .with_optimizer_runs(config.optimizer_runs))
    }

    pub fn with_mode(mut self, mode: ScoringMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_optimizer_runs(mut self, runs: u32) -> Self {
        self.optimizer_runs = runs;
        self
    }

    /// Shares a resolver, and with it the version cache, across estimators.
    pub fn with_resolver(mut self, resolver: Arc<VersionResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn weights(&self) -> &WeightConfig {
        &self.weights
    }

    pub fn resolver(&self) -> &Arc<VersionResolver> {
        &self.resolver
    }

    pub async fn estimate_file(&self, path: impl AsRef<Path>) -> Result<Estimate> {
        let document = SourceDocument::read(path)?;
        self.estimate(&document).await
    }

    pub async fn estimate(&self, document: &SourceDocument) -> Result<Estimate> {
        let start = Instant::now();

        let (constraint, compiler) = self.resolve(document).await?;

        let artifact = self
            .bridge
            .compile(document, &compiler, self.optimizer_runs, self.imports.as_ref())
            .await?;
        debug!("Compiled {} unit(s): {:?}", artifact.len(), artifact.unit_names());

        let engine = ScoringEngine::new(&self.weights, self.mode);
        let signals = *document.signals();
        let breakdown = engine.score(&signals, &artifact);

        info!(
            "Estimated {} in {:.2}s: {}",
            document.unit_name(),
            start.elapsed().as_secs_f64(),
            breakdown
        );

        Ok(Estimate {
            source: document.unit_name().to_string(),
            constraint,
            compiler,
            size_class: engine.size_class(signals.line_count),
            signals,
            artifact,
            breakdown,
        })
    }

    /// Declared constraint and the build it resolves to, without compiling.
    pub async fn resolve(
        &self,
        document: &SourceDocument,
    ) -> Result<(VersionConstraint, ResolvedVersion)> {
        let constraint = extract_constraint(document.text())?;
        let compiler = self.resolver.resolve(&constraint).await?;
        debug!("Constraint {} resolved to {}", constraint, compiler);
        Ok((constraint, compiler))
    }
}
