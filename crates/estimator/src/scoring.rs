//! Audit-time scoring
//!
//! A pure function of the document's lexical signals, the compiled unit inventory, the
//! weight table and the scoring mode. The result keeps base, complexity and
//! upgradeability hours separate so callers can show where the total comes from.
//!
//! Complexity is accumulated per contract unit. In the default
//! [`SignalAggregation::PerUnit`] mode the document-wide signals (external calls, import
//! cost, assembly) are added again for every unit, so a file with three contracts pays
//! for its external calls three times. This reproduces the historical estimates; pick
//! [`SignalAggregation::Once`] to count document-wide signals a single time.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::compiler::StructuralArtifact;
use crate::source::SourceSignals;
use crate::weights::WeightConfig;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImportCounting {
    /// One flat charge regardless of how many imports appear.
    #[default]
    FlatRate,
    /// A charge for every import statement.
    PerImport,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SignalAggregation {
    #[default]
    PerUnit,
    Once,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringMode {
    pub import_counting: ImportCounting,
    pub signal_aggregation: SignalAggregation,
}

/// Hours, all non-negative. `total` is always the sum of the three components.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EstimateBreakdown {
    pub base_time: f64,
    pub complexity_time: f64,
    pub upgradeability_time: f64,
    pub total: f64,
}

impl EstimateBreakdown {
    pub fn new(base_time: f64, complexity_time: f64, upgradeability_time: f64) -> Self {
        Self {
            base_time,
            complexity_time,
            upgradeability_time,
            total: base_time + complexity_time + upgradeability_time,
        }
    }
}

impl fmt::Display for EstimateBreakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "base {:.2}h + complexity {:.2}h + upgradeability {:.2}h = {:.2}h",
            self.base_time, self.complexity_time, self.upgradeability_time, self.total
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeClass {
    Small,
    Medium,
    Large,
}

pub struct ScoringEngine<'a> {
    weights: &'a WeightConfig,
    mode: ScoringMode,
}

impl<'a> ScoringEngine<'a> {
    pub fn new(weights: &'a WeightConfig, mode: ScoringMode) -> Self {
        Self { weights, mode }
    }

    pub fn score(&self, signals: &SourceSignals, artifact: &StructuralArtifact) -> EstimateBreakdown {
        EstimateBreakdown::new(
            self.base_time(signals.line_count),
            self.complexity_time(signals, artifact),
            self.upgradeability_time(signals),
        )
    }

    /// Thresholds are inclusive upper bounds.
    pub fn size_class(&self, line_count: usize) -> SizeClass {
        let thresholds = &self.weights.size_thresholds;
        if line_count <= thresholds.small {
            SizeClass::Small
        } else if line_count <= thresholds.medium {
            SizeClass::Medium
        } else {
            SizeClass::Large
        }
    }

    pub fn base_time(&self, line_count: usize) -> f64 {
        let times = &self.weights.base_times;
        match self.size_class(line_count) {
            SizeClass::Small => times.small,
            SizeClass::Medium => times.medium,
            SizeClass::Large => times.large,
        }
    }

    /// Zero for an artifact with no units, in either aggregation mode.
    pub fn complexity_time(&self, signals: &SourceSignals, artifact: &StructuralArtifact) -> f64 {
        let factors = &self.weights.complexity_factors;

        let function_time: f64 = artifact
            .units()
            .map(|(_, unit)| {
                let surplus = unit.function_count().saturating_sub(factors.base_function_count);
                factors.function_time * surplus as f64
            })
            .sum();

        let repetitions = match self.mode.signal_aggregation {
            SignalAggregation::PerUnit => artifact.len(),
            SignalAggregation::Once => artifact.len().min(1),
        };

        function_time + self.document_signal_time(signals) * repetitions as f64
    }

    /// External calls, import cost and assembly for the whole document, counted once.
    pub fn document_signal_time(&self, signals: &SourceSignals) -> f64 {
        let factors = &self.weights.complexity_factors;

        let external_calls = factors.external_call_time * signals.external_calls as f64;

        let imports = match self.mode.import_counting {
            ImportCounting::PerImport => factors.import_time_per_import * signals.imports as f64,
            ImportCounting::FlatRate => factors.import_time_flat_rate,
        };

        let assembly = if signals.has_assembly {
            factors.assembly_time
        } else {
            0.0
        };

        external_calls + imports + assembly
    }

    /// All five upgradeability weights when any marker is present, otherwise zero. The
    /// markers do not select individual factors.
    pub fn upgradeability_time(&self, signals: &SourceSignals) -> f64 {
        if signals.has_upgrade_markers {
            self.weights.complexity_factors.upgradeability.total()
        } else {
            0.0
        }
    }
}
