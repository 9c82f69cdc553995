use std::sync::Arc;

use solaudit_estimator::mock::{MemoryImports, MockCompilerLoader, StaticCatalog};
use solaudit_estimator::{
    Diagnostic, DiagnosticSeverity, EstimateError, Estimator, SourceDocument, WeightConfig,
};
use tempfile::TempDir;

const RELEASE: (&str, &str) = ("0.8.19", "solc-linux-amd64-v0.8.19+commit.7dd6d404");

/// A 50-line contract with a pragma and nothing else that costs time.
fn plain_document(extra: &str) -> String {
    let mut lines = vec![
        "// SPDX-License-Identifier: MIT".to_string(),
        "pragma solidity ^0.8.19;".to_string(),
        "contract Token {".to_string(),
        format!("    // {extra}"),
        "    uint256 public supply;".to_string(),
    ];
    while lines.len() < 49 {
        lines.push(String::new());
    }
    lines.push("}".to_string());
    lines.join("\n")
}

fn estimator(catalog: Arc<StaticCatalog>, loader: Arc<MockCompilerLoader>) -> Estimator {
    Estimator::new(catalog, loader, Arc::new(MemoryImports::new()), WeightConfig::default())
}

#[tokio::test]
async fn test_scenario_plain_contract() {
    let catalog = Arc::new(StaticCatalog::with_releases([RELEASE]));
    let loader = Arc::new(MockCompilerLoader::new().with_functions("Token.sol", "Token", 3));
    let estimator = estimator(catalog, loader);

    let document = SourceDocument::new("Token.sol", plain_document("nothing to see"));
    assert_eq!(document.line_count(), 50);

    let estimate = estimator.estimate(&document).await.unwrap();
    let weights = WeightConfig::default();

    assert_eq!(estimate.breakdown.base_time, weights.base_times.small);
    assert_eq!(
        estimate.breakdown.complexity_time,
        weights.complexity_factors.import_time_flat_rate
    );
    assert_eq!(estimate.breakdown.upgradeability_time, 0.0);
    assert_eq!(
        estimate.breakdown.total,
        weights.base_times.small + weights.complexity_factors.import_time_flat_rate
    );
}

#[tokio::test]
async fn test_scenario_delegatecall_adds_full_upgradeability() {
    let catalog = Arc::new(StaticCatalog::with_releases([RELEASE]));
    let loader = Arc::new(MockCompilerLoader::new().with_functions("Token.sol", "Token", 3));
    let estimator = estimator(catalog, loader);

    let plain = estimator
        .estimate(&SourceDocument::new("Token.sol", plain_document("nothing to see")))
        .await
        .unwrap();
    let marked = estimator
        .estimate(&SourceDocument::new("Token.sol", plain_document("uses delegatecall")))
        .await
        .unwrap();

    let upgrade = WeightConfig::default().complexity_factors.upgradeability.total();
    assert_eq!(marked.breakdown.total, plain.breakdown.total + upgrade);
}

#[tokio::test]
async fn test_scenario_unknown_version_never_compiles() {
    let catalog = Arc::new(StaticCatalog::with_releases([RELEASE]));
    let loader = Arc::new(MockCompilerLoader::new());
    let estimator = estimator(catalog.clone(), loader.clone());

    let document = SourceDocument::new("Old.sol", "pragma solidity ^0.4.99;\ncontract Old {}");
    let err = estimator.estimate(&document).await.unwrap_err();

    assert!(matches!(err, EstimateError::VersionNotFound { .. }));
    assert_eq!(catalog.fetch_count(), 1);
    assert_eq!(loader.load_count(), 0);
    assert_eq!(loader.compile_count(), 0);
}

#[tokio::test]
async fn test_repeated_estimates_fetch_catalog_once() {
    let catalog = Arc::new(StaticCatalog::with_releases([RELEASE]));
    let loader = Arc::new(MockCompilerLoader::new().with_functions("Token.sol", "Token", 1));
    let estimator = estimator(catalog.clone(), loader.clone());

    let document = SourceDocument::new("Token.sol", plain_document("again"));
    let first = estimator.estimate(&document).await.unwrap();
    let second = estimator.estimate(&document).await.unwrap();

    assert_eq!(first.compiler, second.compiler);
    assert_eq!(catalog.fetch_count(), 1);
    assert_eq!(loader.compile_count(), 2);
}

#[tokio::test]
async fn test_catalog_outage_is_reported() {
    let catalog = Arc::new(StaticCatalog::unreachable());
    let loader = Arc::new(MockCompilerLoader::new());
    let estimator = estimator(catalog, loader.clone());

    let err = estimator
        .estimate(&SourceDocument::new("Token.sol", plain_document("offline")))
        .await
        .unwrap_err();

    assert!(matches!(err, EstimateError::CatalogUnreachable { .. }));
    assert_eq!(loader.load_count(), 0);
}

#[tokio::test]
async fn test_compile_errors_abort_scoring() {
    let catalog = Arc::new(StaticCatalog::with_releases([RELEASE]));
    let loader = Arc::new(
        MockCompilerLoader::new()
            .with_functions("Token.sol", "Token", 1)
            .with_diagnostic(Diagnostic::new(DiagnosticSeverity::Error, "Expected ';' but got '}'"))
            .with_diagnostic(Diagnostic::new(DiagnosticSeverity::Error, "Undeclared identifier.")),
    );
    let estimator = estimator(catalog, loader);

    let err = estimator
        .estimate(&SourceDocument::new("Token.sol", plain_document("broken")))
        .await
        .unwrap_err();

    assert_eq!(err.diagnostics().len(), 2);
    let rendered = err.to_string();
    assert!(rendered.contains("Expected ';'"));
    assert!(rendered.contains("Undeclared identifier."));
}

#[tokio::test]
async fn test_estimate_file_and_imports_from_disk() {
    let dir = TempDir::new().unwrap();
    let vendored = dir.path().join("node_modules/@openzeppelin/contracts/access");
    std::fs::create_dir_all(&vendored).unwrap();
    std::fs::write(vendored.join("Ownable.sol"), "pragma solidity ^0.8.19;\ncontract Ownable {}").unwrap();

    let contract = dir.path().join("Vault.sol");
    std::fs::write(
        &contract,
        "pragma solidity ^0.8.19;\nimport \"@openzeppelin/contracts/access/Ownable.sol\";\ncontract Vault is Ownable {}\n",
    )
    .unwrap();

    let document = SourceDocument::read(&contract).unwrap();
    let loader = Arc::new(MockCompilerLoader::new().with_functions(document.unit_name(), "Vault", 2));
    let estimator = Estimator::new(
        Arc::new(StaticCatalog::with_releases([RELEASE])),
        loader.clone(),
        Arc::new(solaudit_estimator::ImportResolver::new(dir.path())),
        WeightConfig::default(),
    );

    let estimate = estimator.estimate_file(&contract).await.unwrap();
    assert_eq!(estimate.signals.imports, 1);

    let job = loader.last_input().unwrap();
    assert!(job
        .sources
        .contains_key("@openzeppelin/contracts/access/Ownable.sol"));
    assert_eq!(job.sources.len(), 2);
}

#[tokio::test]
async fn test_absolute_path_contract_with_relative_imports() {
    let dir = TempDir::new().unwrap();
    let lib = dir.path().join("lib");
    let contracts = dir.path().join("contracts");
    std::fs::create_dir_all(&lib).unwrap();
    std::fs::create_dir_all(&contracts).unwrap();
    std::fs::write(contracts.join("IVault.sol"), "pragma solidity ^0.8.19;\ninterface IVault {}").unwrap();
    std::fs::write(lib.join("Math.sol"), "pragma solidity ^0.8.19;\nlibrary Math {}").unwrap();

    let contract = contracts.join("Vault.sol");
    std::fs::write(
        &contract,
        "pragma solidity ^0.8.19;\nimport \"./IVault.sol\";\nimport \"../lib/Math.sol\";\ncontract Vault is IVault {}\n",
    )
    .unwrap();
    assert!(contract.is_absolute());

    let document = SourceDocument::read(&contract).unwrap();
    let loader = Arc::new(MockCompilerLoader::new().with_functions(document.unit_name(), "Vault", 1));
    let estimator = Estimator::new(
        Arc::new(StaticCatalog::with_releases([RELEASE])),
        loader.clone(),
        Arc::new(solaudit_estimator::ImportResolver::new(".")),
        WeightConfig::default(),
    );

    let estimate = estimator.estimate_file(&contract).await.unwrap();
    assert_eq!(estimate.artifact.len(), 1);

    let job = loader.last_input().unwrap();
    let interface = contracts.join("IVault.sol").to_string_lossy().replace('\\', "/");
    let math = lib.join("Math.sol").to_string_lossy().replace('\\', "/");
    assert!(job.sources.contains_key(&interface), "sources: {:?}", job.sources.keys());
    assert!(job.sources.contains_key(&math), "sources: {:?}", job.sources.keys());
    assert_eq!(job.sources.len(), 3);
}

#[tokio::test]
async fn test_unreadable_source_file() {
    let estimator = estimator(
        Arc::new(StaticCatalog::with_releases([RELEASE])),
        Arc::new(MockCompilerLoader::new()),
    );
    let err = estimator.estimate_file("/no/such/Contract.sol").await.unwrap_err();
    assert!(matches!(err, EstimateError::SourceUnreadable { .. }));
}
