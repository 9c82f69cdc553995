//! Compiler invocation
//!
//! The compiler is an external capability behind two traits: a [`CompilerLoader`] that
//! produces a [`Compiler`] for one exact build, and the compiler itself, which maps a
//! standard-JSON job to a standard-JSON result. [`CompilerBridge`] drives both and turns
//! the result into a [`StructuralArtifact`] or a diagnostics error.

pub mod artifact;
pub mod bridge;
pub mod solc;
pub mod standard_json;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::version::ResolvedVersion;

pub use artifact::{StructuralArtifact, UnitInventory};
pub use bridge::CompilerBridge;
pub use solc::{SolcBinary, SolcLoader};
pub use standard_json::{
    AbiEntry, AbiKind, CompilerInput, CompilerOutput, ContractOutput, Diagnostic,
    DiagnosticSeverity, OptimizerSettings,
};

#[async_trait]
pub trait Compiler: Send + Sync {
    fn version(&self) -> &ResolvedVersion;

    /// One request, one response. No retries, no partial results.
    async fn compile(&self, input: &CompilerInput) -> Result<CompilerOutput>;
}

#[async_trait]
pub trait CompilerLoader: Send + Sync {
    /// Fails with `CompilerLoadFailed` when no compiler for `version` can be produced.
    async fn load(&self, version: &ResolvedVersion) -> Result<Arc<dyn Compiler>>;
}
