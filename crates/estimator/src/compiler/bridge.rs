use std::sync::Arc;

use tracing::{debug, warn};

use super::artifact::StructuralArtifact;
use super::standard_json::{CompilerInput, Diagnostic, OptimizerSettings};
use super::CompilerLoader;
use crate::error::{EstimateError, Result};
use crate::imports::{collect_sources, ImportCallback};
use crate::source::SourceDocument;
use crate::version::ResolvedVersion;

pub struct CompilerBridge {
    loader: Arc<dyn CompilerLoader>,
}

impl CompilerBridge {
    pub fn new(loader: Arc<dyn CompilerLoader>) -> Self {
        Self { loader }
    }

    /// Loads the compiler for `version`, compiles `document` with every import it can
    /// reach, and returns the inventory of the document's own units.
    ///
    /// Imports that cannot be read become error diagnostics next to whatever the compiler
    /// reports. Any error-severity diagnostic fails the call with the complete list,
    /// warnings included.
    pub async fn compile(
        &self,
        document: &SourceDocument,
        version: &ResolvedVersion,
        optimizer_runs: u32,
        imports: &dyn ImportCallback,
    ) -> Result<StructuralArtifact> {
        let compiler = self.loader.load(version).await?;
        debug!("Loaded compiler {}", compiler.version());

        let source_set = collect_sources(document.unit_name(), document.text(), imports);
        debug!(
            "Compiling {} source unit(s), {} unresolved import(s)",
            source_set.sources.len(),
            source_set.failures.len()
        );

        let input = CompilerInput::new(source_set.sources, OptimizerSettings::from_runs(optimizer_runs));
        let mut output = compiler.compile(&input).await?;

        let mut diagnostics: Vec<Diagnostic> =
            source_set.failures.into_iter().map(Diagnostic::from).collect();
        diagnostics.append(&mut output.errors);

        if diagnostics.iter().any(Diagnostic::is_error) {
            return Err(EstimateError::CompileDiagnostics(diagnostics));
        }

        for diagnostic in &diagnostics {
            warn!("{}: {}", diagnostic.severity, diagnostic.message);
        }

        Ok(StructuralArtifact::from_output(&output, document.unit_name()))
    }
}
