//! Solaudit Estimator - Audit Time Estimation for Solidity
//!
//! Turns a Solidity source file into an estimate of the hours a manual security review
//! would take. The compiler declared by the file's pragma is resolved through the release
//! catalog, the file is compiled to obtain its contract inventory, and a weighted
//! heuristic over that inventory and the source text produces a base, complexity and
//! upgradeability breakdown.

pub mod compiler;
pub mod config;
pub mod error;
pub mod estimator;
pub mod imports;
pub mod mock;
pub mod scoring;
pub mod source;
pub mod version;
pub mod weights;

pub use compiler::{CompilerBridge, Diagnostic, DiagnosticSeverity, StructuralArtifact};
pub use config::EstimatorConfig;
pub use error::{EstimateError, Result};
pub use estimator::{Estimate, Estimator};
pub use imports::{ImportCallback, ImportResolver, ImportResult};
pub use scoring::{EstimateBreakdown, ImportCounting, ScoringEngine, ScoringMode, SignalAggregation};
pub use source::{SourceDocument, SourceSignals};
pub use version::{ResolvedVersion, VersionConstraint, VersionResolver};
pub use weights::{WeightConfig, WeightOverlay};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
