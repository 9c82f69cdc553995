//! Import resolution for compiler jobs
//!
//! Import paths are looked up through an [`ImportCallback`]. The filesystem resolver
//! rewrites one vendored package namespace (`@openzeppelin/`) to its install directory and
//! treats every other path as relative to a root directory. A path that cannot be read
//! comes back as [`ImportResult::Failed`]; it never aborts resolution of sibling imports.

use std::collections::{BTreeMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::compiler::{Diagnostic, DiagnosticSeverity};

pub const OPENZEPPELIN_PREFIX: &str = "@openzeppelin/";
pub const OPENZEPPELIN_BASE: &str = "node_modules/@openzeppelin/";

/// Quoted path of `import "x";`, `import "x" as X;`, `import {A} from "x";` and
/// `import * as X from "x";`.
static IMPORT_PATH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^\s*import\s+(?:[^;"']*?\bfrom\s+)?["']([^"']+)["']"#).unwrap()
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ImportResult {
    Found { contents: String },
    Failed { error: String },
}

pub trait ImportCallback: Send + Sync {
    fn resolve_import(&self, import_path: &str) -> ImportResult;
}

pub struct ImportResolver {
    root: PathBuf,
    aliases: Vec<(String, PathBuf)>,
}

impl ImportResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            aliases: vec![(OPENZEPPELIN_PREFIX.to_string(), PathBuf::from(OPENZEPPELIN_BASE))],
        }
    }

    pub fn with_alias(mut self, prefix: impl Into<String>, base: impl Into<PathBuf>) -> Self {
        self.aliases.push((prefix.into(), base.into()));
        self
    }

    /// Filesystem location for `import_path`, after alias rewriting. Absolute paths are
    /// used as given.
    pub fn locate(&self, import_path: &str) -> PathBuf {
        for (prefix, base) in &self.aliases {
            if let Some(rest) = import_path.strip_prefix(prefix.as_str()) {
                return self.root.join(base).join(rest);
            }
        }
        self.root.join(import_path)
    }
}

impl ImportCallback for ImportResolver {
    fn resolve_import(&self, import_path: &str) -> ImportResult {
        let location = self.locate(import_path);
        match std::fs::read_to_string(&location) {
            Ok(contents) => ImportResult::Found { contents },
            Err(e) => ImportResult::Failed {
                error: format!("{}: {}", location.display(), e),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportFailure {
    pub path: String,
    pub error: String,
}

impl From<ImportFailure> for Diagnostic {
    fn from(failure: ImportFailure) -> Self {
        Diagnostic::new(
            DiagnosticSeverity::Error,
            format!("Source \"{}\" not found: {}", failure.path, failure.error),
        )
        .with_kind("ParserError")
    }
}

/// Every source unit a compiler job needs, plus the imports that could not be read.
#[derive(Debug, Clone, Default)]
pub struct SourceSet {
    pub sources: BTreeMap<String, String>,
    pub failures: Vec<ImportFailure>,
}

/// Walks imports breadth-first from the main unit.
pub fn collect_sources(
    main_unit: &str,
    main_text: &str,
    imports: &dyn ImportCallback,
) -> SourceSet {
    let mut set = SourceSet::default();
    let mut seen: HashSet<String> = HashSet::from([main_unit.to_string()]);
    let mut queue: VecDeque<(String, String)> =
        VecDeque::from([(main_unit.to_string(), main_text.to_string())]);

    while let Some((unit, text)) = queue.pop_front() {
        for import in import_paths(&text) {
            let resolved = normalize_import(&unit, import);
            if !seen.insert(resolved.clone()) {
                continue;
            }

            match imports.resolve_import(&resolved) {
                ImportResult::Found { contents } => {
                    debug!("Resolved import {}", resolved);
                    queue.push_back((resolved, contents));
                }
                ImportResult::Failed { error } => {
                    debug!("Import {} failed: {}", resolved, error);
                    set.failures.push(ImportFailure {
                        path: resolved,
                        error,
                    });
                }
            }
        }
        set.sources.insert(unit, text);
    }

    set
}

pub fn import_paths(text: &str) -> Vec<&str> {
    IMPORT_PATH_RE
        .captures_iter(text)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect()
}

/// `./` and `../` paths are relative to the importing unit; anything else is already a
/// unit name. An absolute importer yields an absolute unit name.
pub fn normalize_import(importer: &str, import_path: &str) -> String {
    if !(import_path.starts_with("./") || import_path.starts_with("../")) {
        return import_path.to_string();
    }

    let base = Path::new(importer)
        .parent()
        .map(|p| p.to_string_lossy().replace('\\', "/"))
        .unwrap_or_default();
    let absolute = base.starts_with('/');

    let mut segments: Vec<&str> = base.split('/').filter(|s| !s.is_empty()).collect();
    for segment in import_path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    let joined = segments.join("/");
    if absolute {
        format!("/{}", joined)
    } else {
        joined
    }
}
