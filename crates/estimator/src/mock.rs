//! In-memory collaborators for tests and offline runs: a release catalog, a compiler and
//! an import table, each counting how often it is used.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::compiler::{
    AbiEntry, Compiler, CompilerInput, CompilerLoader, CompilerOutput, ContractOutput, Diagnostic,
};
use crate::error::{EstimateError, Result};
use crate::imports::{ImportCallback, ImportResult};
use crate::version::{CatalogSource, ResolvedVersion, VersionCatalog};

pub struct StaticCatalog {
    catalog: VersionCatalog,
    fetch_count: AtomicUsize,
    unreachable: bool,
    delay: Option<Duration>,
}

impl StaticCatalog {
    pub fn new(catalog: VersionCatalog) -> Self {
        Self {
            catalog,
            fetch_count: AtomicUsize::new(0),
            unreachable: false,
            delay: None,
        }
    }

    /// `(key, build file name)` pairs, as the mirror lists them.
    pub fn with_releases<'a>(releases: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let releases = releases
            .into_iter()
            .map(|(key, file)| (key.to_string(), file.to_string()))
            .collect();
        Self::new(VersionCatalog { releases })
    }

    pub fn unreachable() -> Self {
        let mut catalog = Self::new(VersionCatalog::default());
        catalog.unreachable = true;
        catalog
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetch_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogSource for StaticCatalog {
    async fn fetch(&self) -> Result<VersionCatalog> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.unreachable {
            return Err(EstimateError::CatalogUnreachable {
                url: self.location().to_string(),
                reason: "connection refused".to_string(),
            });
        }
        Ok(self.catalog.clone())
    }

    fn location(&self) -> &str {
        "memory://catalog"
    }
}

#[derive(Default)]
struct CompilerCounters {
    loads: AtomicUsize,
    compiles: AtomicUsize,
    last_input: Mutex<Option<CompilerInput>>,
}

/// Hands out compilers that answer every job with the same canned result.
#[derive(Default)]
pub struct MockCompilerLoader {
    output: CompilerOutput,
    counters: Arc<CompilerCounters>,
    fail_load: bool,
}

impl MockCompilerLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_unit(mut self, source: &str, unit: &str, abi: Vec<AbiEntry>) -> Self {
        self.output
            .contracts
            .entry(source.to_string())
            .or_insert_with(BTreeMap::new)
            .insert(unit.to_string(), ContractOutput { abi });
        self
    }

    /// A unit exposing `count` functions named `f0`, `f1`, ...
    pub fn with_functions(self, source: &str, unit: &str, count: usize) -> Self {
        let abi = (0..count).map(|i| AbiEntry::function(&format!("f{i}"))).collect();
        self.with_unit(source, unit, abi)
    }

    pub fn with_diagnostic(mut self, diagnostic: Diagnostic) -> Self {
        self.output.errors.push(diagnostic);
        self
    }

    pub fn failing_load(mut self) -> Self {
        self.fail_load = true;
        self
    }

    pub fn load_count(&self) -> usize {
        self.counters.loads.load(Ordering::SeqCst)
    }

    pub fn compile_count(&self) -> usize {
        self.counters.compiles.load(Ordering::SeqCst)
    }

    pub fn last_input(&self) -> Option<CompilerInput> {
        self.counters.last_input.lock().clone()
    }
}

#[async_trait]
impl CompilerLoader for MockCompilerLoader {
    async fn load(&self, version: &ResolvedVersion) -> Result<Arc<dyn Compiler>> {
        self.counters.loads.fetch_add(1, Ordering::SeqCst);

        if self.fail_load {
            return Err(EstimateError::CompilerLoadFailed {
                version: version.to_string(),
                reason: "mock loader configured to fail".to_string(),
            });
        }

        Ok(Arc::new(MockCompiler {
            version: version.clone(),
            output: self.output.clone(),
            counters: self.counters.clone(),
        }))
    }
}

struct MockCompiler {
    version: ResolvedVersion,
    output: CompilerOutput,
    counters: Arc<CompilerCounters>,
}

#[async_trait]
impl Compiler for MockCompiler {
    fn version(&self) -> &ResolvedVersion {
        &self.version
    }

    async fn compile(&self, input: &CompilerInput) -> Result<CompilerOutput> {
        self.counters.compiles.fetch_add(1, Ordering::SeqCst);
        *self.counters.last_input.lock() = Some(input.clone());
        Ok(self.output.clone())
    }
}

/// Import table keyed by resolved unit name.
#[derive(Default)]
pub struct MemoryImports {
    files: HashMap<String, String>,
    lookups: AtomicUsize,
}

impl MemoryImports {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: &str, contents: &str) -> Self {
        self.files.insert(path.to_string(), contents.to_string());
        self
    }

    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl ImportCallback for MemoryImports {
    fn resolve_import(&self, import_path: &str) -> ImportResult {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        match self.files.get(import_path) {
            Some(contents) => ImportResult::Found {
                contents: contents.clone(),
            },
            None => ImportResult::Failed {
                error: format!("{import_path}: not in memory import table"),
            },
        }
    }
}
