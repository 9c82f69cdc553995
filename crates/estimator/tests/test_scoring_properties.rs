use solaudit_estimator::compiler::{StructuralArtifact, UnitInventory};
use solaudit_estimator::weights::WeightOverlay;
use solaudit_estimator::{
    ImportCounting, ScoringEngine, ScoringMode, SourceDocument, SourceSignals, WeightConfig,
};
use std::collections::BTreeMap;

fn document_with_lines(count: usize) -> String {
    let mut lines = vec!["pragma solidity ^0.8.19;".to_string()];
    lines.extend((1..count).map(|i| format!("// line {i}")));
    lines.join("\n")
}

fn single_unit(functions: usize) -> StructuralArtifact {
    StructuralArtifact::new(BTreeMap::from([(
        "Token".to_string(),
        UnitInventory {
            functions: (0..functions).map(|i| format!("f{i}")).collect(),
            events: Vec::new(),
        },
    )]))
}

#[test]
fn test_small_threshold_is_inclusive() {
    let weights = WeightConfig::default();
    let engine = ScoringEngine::new(&weights, ScoringMode::default());
    let small = weights.size_thresholds.small;

    let at = SourceDocument::new("T.sol", document_with_lines(small));
    let above = SourceDocument::new("T.sol", document_with_lines(small + 1));
    assert_eq!(at.line_count(), small);
    assert_eq!(above.line_count(), small + 1);

    let artifact = StructuralArtifact::default();
    assert_eq!(engine.score(at.signals(), &artifact).base_time, weights.base_times.small);
    assert_eq!(engine.score(above.signals(), &artifact).base_time, weights.base_times.medium);
}

#[test]
fn test_complexity_is_monotonic_in_external_calls() {
    let weights = WeightConfig::default();
    let engine = ScoringEngine::new(&weights, ScoringMode::default());
    let artifact = single_unit(3);

    let mut previous = f64::MIN;
    for calls in 0..10 {
        let body: String = (0..calls).map(|_| "target.call(data);\n").collect();
        let document = SourceDocument::new("T.sol", format!("pragma solidity 0.8.19;\n{body}"));
        assert_eq!(document.signals().external_calls, calls);

        let complexity = engine.score(document.signals(), &artifact).complexity_time;
        assert!(complexity >= previous, "{complexity} < {previous} at {calls} calls");
        previous = complexity;
    }
}

#[test]
fn test_import_mode_changes_only_import_contribution() {
    let weights = WeightConfig::default();
    let flat = ScoringEngine::new(&weights, ScoringMode::default());
    let per_import = ScoringEngine::new(
        &weights,
        ScoringMode {
            import_counting: ImportCounting::PerImport,
            ..ScoringMode::default()
        },
    );

    let document = SourceDocument::new(
        "T.sol",
        "pragma solidity 0.8.19;\nimport \"./A.sol\";\ncontract T { function f() external { a.call(\"\"); } }",
    );
    assert_eq!(document.signals().imports, 1);

    let artifact = single_unit(7);
    let a = flat.score(document.signals(), &artifact);
    let b = per_import.score(document.signals(), &artifact);

    let factors = &weights.complexity_factors;
    assert_ne!(factors.import_time_flat_rate, factors.import_time_per_import);
    assert_eq!(a.base_time, b.base_time);
    assert_eq!(a.upgradeability_time, b.upgradeability_time);
    assert_eq!(
        a.complexity_time - b.complexity_time,
        factors.import_time_flat_rate - factors.import_time_per_import
    );
}

#[test]
fn test_import_modes_coincide_when_weights_are_equal() {
    let overlay = WeightOverlay::from_json_str(
        r#"{ "complexityFactors": { "importTimeFlatRate": 0.5, "importTimePerImport": 0.5 } }"#,
    )
    .unwrap();
    let weights = WeightConfig::default().merged(&overlay).unwrap();

    let signals = SourceSignals {
        imports: 1,
        ..SourceDocument::new("T.sol", "").signals().to_owned()
    };
    let artifact = single_unit(0);

    let flat = ScoringEngine::new(&weights, ScoringMode::default()).score(&signals, &artifact);
    let per_import = ScoringEngine::new(
        &weights,
        ScoringMode {
            import_counting: ImportCounting::PerImport,
            ..ScoringMode::default()
        },
    )
    .score(&signals, &artifact);

    assert_eq!(flat, per_import);
}

#[test]
fn test_upgradeability_markers_do_not_stack() {
    let weights = WeightConfig::default();
    let engine = ScoringEngine::new(&weights, ScoringMode::default());
    let artifact = single_unit(0);
    let full = weights.complexity_factors.upgradeability.total();

    let plain = SourceDocument::new("T.sol", "contract Token {}");
    let one = SourceDocument::new("T.sol", "contract TokenProxy {}");
    let three = SourceDocument::new(
        "T.sol",
        "contract TokenProxy { function initialize() external { impl.delegatecall(\"\"); } }",
    );

    assert_eq!(engine.score(plain.signals(), &artifact).upgradeability_time, 0.0);
    assert_eq!(engine.score(one.signals(), &artifact).upgradeability_time, full);
    assert_eq!(engine.score(three.signals(), &artifact).upgradeability_time, full);
}

#[test]
fn test_overlay_changes_only_named_leaf() {
    let overlay = WeightOverlay::from_json_str(r#"{ "baseTimes": { "small": 9 } }"#).unwrap();
    let merged = WeightConfig::default().merged(&overlay).unwrap();
    let defaults = WeightConfig::default();

    assert_eq!(merged.base_times.small, 9.0);
    assert_eq!(merged.base_times.medium, defaults.base_times.medium);
    assert_eq!(merged.base_times.large, defaults.base_times.large);
}
