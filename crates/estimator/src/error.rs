use std::path::PathBuf;

use thiserror::Error;

use crate::compiler::Diagnostic;

/// Every way an estimate can stop short of a breakdown. All variants are terminal for the
/// invocation that produced them; nothing in this crate retries.
#[derive(Debug, Error)]
pub enum EstimateError {
    #[error("no `pragma solidity` declaration with a full version was found")]
    MissingVersionDeclaration,

    #[error("compiler version `{constraint}` is not listed in the release catalog")]
    VersionNotFound { constraint: String },

    #[error("release catalog at {url} is unreachable: {reason}")]
    CatalogUnreachable { url: String, reason: String },

    #[error("failed to load compiler {version}: {reason}")]
    CompilerLoadFailed { version: String, reason: String },

    #[error("compiler invocation failed: {reason}")]
    CompilerInvocationFailed { reason: String },

    #[error("compilation failed with {} diagnostic(s):\n{}", .0.len(), render_diagnostics(.0))]
    CompileDiagnostics(Vec<Diagnostic>),

    #[error("invalid weight configuration {}: {cause}", .path.display())]
    InvalidConfig { path: PathBuf, cause: String },

    #[error("cannot read {}: {source}", .path.display())]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl EstimateError {
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            Self::CompileDiagnostics(diagnostics) => diagnostics,
            _ => &[],
        }
    }
}

fn render_diagnostics(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(|d| format!("  [{}] {}", d.severity, d.display_message().trim_end()))
        .collect::<Vec<_>>()
        .join("\n")
}

pub type Result<T> = std::result::Result<T, EstimateError>;
