//! Source document and the lexical signals the scoring heuristic reads from it.
//!
//! Every detector here is a regular expression over raw text. None of them understands
//! Solidity: they match call syntax, keywords and statement prefixes wherever they occur,
//! comments and string literals included. Swapping a pattern for a real lexer only has to
//! preserve the counts documented on each pattern.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::error::{EstimateError, Result};
use crate::version::pragma::PRAGMA_RE;

/// Low-level call syntax on any receiver: `.call(`, `.call{value: x}(`, `.delegatecall(`,
/// `.staticcall(`, `.send(` and `.transfer(`. Each occurrence counts once.
static EXTERNAL_CALL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\.(?:call|delegatecall|staticcall|send|transfer)\s*[({]").unwrap()
});

/// An `import` keyword at the start of a line.
static IMPORT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^\s*import\b").unwrap());

/// The `assembly` keyword, with or without a dialect string or flags.
static ASSEMBLY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bassembly\b").unwrap());

/// Upgradeability markers: `delegatecall`, `proxy` or `initialize` anywhere, any case.
/// Matches inside identifiers too, so `MyProxy`, `PROXY_SLOT` and `Initializable` all
/// count as markers.
static UPGRADE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)delegatecall|proxy|initialize").unwrap());

/// Counts and flags extracted from a document. Computed once when the document is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SourceSignals {
    pub line_count: usize,
    pub external_calls: usize,
    pub imports: usize,
    pub has_assembly: bool,
    pub has_upgrade_markers: bool,
    pub has_version_declaration: bool,
}

impl SourceSignals {
    pub fn scan(text: &str) -> Self {
        Self {
            line_count: text.lines().count(),
            external_calls: EXTERNAL_CALL_RE.find_iter(text).count(),
            imports: IMPORT_RE.find_iter(text).count(),
            has_assembly: ASSEMBLY_RE.is_match(text),
            has_upgrade_markers: UPGRADE_RE.is_match(text),
            has_version_declaration: PRAGMA_RE.is_match(text),
        }
    }
}

/// A contract file read in full. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    unit_name: String,
    text: String,
    signals: SourceSignals,
}

impl SourceDocument {
    /// `unit_name` is the name the compiler sees for this file and the base that
    /// relative imports are resolved against.
    pub fn new(unit_name: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        let signals = SourceSignals::scan(&text);
        Self {
            unit_name: unit_name.into(),
            text,
            signals,
        }
    }

    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| EstimateError::SourceUnreadable {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(unit_name_for(path), text))
    }

    pub fn unit_name(&self) -> &str {
        &self.unit_name
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn signals(&self) -> &SourceSignals {
        &self.signals
    }

    pub fn line_count(&self) -> usize {
        self.signals.line_count
    }
}

/// Compiler unit names always use forward slashes, whatever the host separator.
fn unit_name_for(path: &Path) -> String {
    let relative: PathBuf = path
        .strip_prefix("./")
        .map(Path::to_path_buf)
        .unwrap_or_else(|_| path.to_path_buf());
    relative.to_string_lossy().replace('\\', "/")
}
