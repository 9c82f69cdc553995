//! Compiler job and result documents in the standard-JSON shape.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilerInput {
    pub language: String,
    pub sources: BTreeMap<String, SourceEntry>,
    pub settings: CompilerSettings,
}

impl CompilerInput {
    pub fn new(sources: BTreeMap<String, String>, optimizer: OptimizerSettings) -> Self {
        Self {
            language: "Solidity".to_string(),
            sources: sources
                .into_iter()
                .map(|(name, content)| (name, SourceEntry { content }))
                .collect(),
            settings: CompilerSettings {
                optimizer,
                output_selection: emit_everything(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceEntry {
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilerSettings {
    pub optimizer: OptimizerSettings,
    pub output_selection: BTreeMap<String, BTreeMap<String, Vec<String>>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OptimizerSettings {
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runs: Option<u32>,
}

impl OptimizerSettings {
    /// Zero runs disables the optimizer; any other count enables it with that many runs.
    pub fn from_runs(runs: u32) -> Self {
        if runs == 0 {
            Self {
                enabled: false,
                runs: None,
            }
        } else {
            Self {
                enabled: true,
                runs: Some(runs),
            }
        }
    }
}

fn emit_everything() -> BTreeMap<String, BTreeMap<String, Vec<String>>> {
    let mut per_unit = BTreeMap::new();
    per_unit.insert("*".to_string(), vec!["*".to_string()]);
    per_unit.insert(String::new(), vec!["*".to_string()]);

    let mut selection = BTreeMap::new();
    selection.insert("*".to_string(), per_unit);
    selection
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompilerOutput {
    #[serde(default)]
    pub errors: Vec<Diagnostic>,
    #[serde(default)]
    pub contracts: BTreeMap<String, BTreeMap<String, ContractOutput>>,
}

impl CompilerOutput {
    pub fn has_errors(&self) -> bool {
        self.errors.iter().any(Diagnostic::is_error)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContractOutput {
    #[serde(default)]
    pub abi: Vec<AbiEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbiEntry {
    #[serde(rename = "type", default)]
    pub kind: AbiKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl AbiEntry {
    pub fn function(name: &str) -> Self {
        Self {
            kind: AbiKind::Function,
            name: Some(name.to_string()),
        }
    }

    pub fn event(name: &str) -> Self {
        Self {
            kind: AbiKind::Event,
            name: Some(name.to_string()),
        }
    }
}

/// ABI entries without a `type` are functions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AbiKind {
    #[default]
    Function,
    Constructor,
    Fallback,
    Receive,
    Event,
    Error,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for DiagnosticSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Info => write!(f, "info"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub severity: DiagnosticSeverity,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_message: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_location: Option<SourceLocation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: String,
    pub start: i64,
    pub end: i64,
}

impl Diagnostic {
    pub fn new(severity: DiagnosticSeverity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            formatted_message: None,
            kind: None,
            source_location: None,
        }
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == DiagnosticSeverity::Error
    }

    /// The compiler's formatted rendering when present, otherwise the bare message.
    pub fn display_message(&self) -> &str {
        self.formatted_message.as_deref().unwrap_or(&self.message)
    }
}
