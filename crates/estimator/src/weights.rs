//! Weight table driving the scoring heuristic.
//!
//! Defaults are built in. An overlay document (JSON, or YAML for `.yaml`/`.yml` files)
//! may replace any subset of leaves; untouched leaves keep their defaults, including
//! siblings inside a partially supplied group. Unknown keys and out-of-range values are
//! rejected when the overlay is loaded.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{EstimateError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightConfig {
    pub size_thresholds: SizeThresholds,
    pub base_times: BaseTimes,
    pub complexity_factors: ComplexityFactors,
}

/// Inclusive upper line counts of the small and medium size classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeThresholds {
    pub small: usize,
    pub medium: usize,
}

/// Hours per size class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaseTimes {
    pub small: f64,
    pub medium: f64,
    pub large: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplexityFactors {
    /// Functions per unit that carry no extra cost.
    pub base_function_count: usize,
    pub function_time: f64,
    pub external_call_time: f64,
    pub import_time_flat_rate: f64,
    pub import_time_per_import: f64,
    pub assembly_time: f64,
    pub upgradeability: UpgradeabilityWeights,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeabilityWeights {
    pub proxy_pattern: f64,
    pub storage_layout: f64,
    pub admin_rights: f64,
    pub initialization: f64,
    pub inter_contract_consistency: f64,
}

impl UpgradeabilityWeights {
    pub fn total(&self) -> f64 {
        self.proxy_pattern
            + self.storage_layout
            + self.admin_rights
            + self.initialization
            + self.inter_contract_consistency
    }
}

impl Default for WeightConfig {
    fn default() -> Self {
        Self {
            size_thresholds: SizeThresholds {
                small: 100,
                medium: 500,
            },
            base_times: BaseTimes {
                small: 4.0,
                medium: 12.0,
                large: 32.0,
            },
            complexity_factors: ComplexityFactors {
                base_function_count: 5,
                function_time: 0.5,
                external_call_time: 1.5,
                import_time_flat_rate: 1.0,
                import_time_per_import: 0.5,
                assembly_time: 4.0,
                upgradeability: UpgradeabilityWeights {
                    proxy_pattern: 4.0,
                    storage_layout: 3.0,
                    admin_rights: 2.0,
                    initialization: 2.0,
                    inter_contract_consistency: 3.0,
                },
            },
        }
    }
}

impl WeightConfig {
    /// Defaults, with the overlay at `path` applied when one is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let overlay = WeightOverlay::from_file(path)?;
                Self::default()
                    .merged(&overlay)
                    .map_err(|cause| invalid(path, cause))
            }
            None => Ok(Self::default()),
        }
    }

    /// Applies every leaf present in `overlay`, then validates the result.
    pub fn merged(mut self, overlay: &WeightOverlay) -> std::result::Result<Self, String> {
        if let Some(t) = &overlay.size_thresholds {
            set(&mut self.size_thresholds.small, t.small);
            set(&mut self.size_thresholds.medium, t.medium);
        }
        if let Some(b) = &overlay.base_times {
            set(&mut self.base_times.small, b.small);
            set(&mut self.base_times.medium, b.medium);
            set(&mut self.base_times.large, b.large);
        }
        if let Some(c) = &overlay.complexity_factors {
            let factors = &mut self.complexity_factors;
            set(&mut factors.base_function_count, c.base_function_count);
            set(&mut factors.function_time, c.function_time);
            set(&mut factors.external_call_time, c.external_call_time);
            set(&mut factors.import_time_flat_rate, c.import_time_flat_rate);
            set(&mut factors.import_time_per_import, c.import_time_per_import);
            set(&mut factors.assembly_time, c.assembly_time);
            if let Some(u) = &c.upgradeability {
                let weights = &mut factors.upgradeability;
                set(&mut weights.proxy_pattern, u.proxy_pattern);
                set(&mut weights.storage_layout, u.storage_layout);
                set(&mut weights.admin_rights, u.admin_rights);
                set(&mut weights.initialization, u.initialization);
                set(&mut weights.inter_contract_consistency, u.inter_contract_consistency);
            }
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.size_thresholds.small >= self.size_thresholds.medium {
            return Err(format!(
                "sizeThresholds.small ({}) must be below sizeThresholds.medium ({})",
                self.size_thresholds.small, self.size_thresholds.medium
            ));
        }

        let factors = &self.complexity_factors;
        let upgrade = &factors.upgradeability;
        let weights = [
            ("baseTimes.small", self.base_times.small),
            ("baseTimes.medium", self.base_times.medium),
            ("baseTimes.large", self.base_times.large),
            ("complexityFactors.functionTime", factors.function_time),
            ("complexityFactors.externalCallTime", factors.external_call_time),
            ("complexityFactors.importTimeFlatRate", factors.import_time_flat_rate),
            ("complexityFactors.importTimePerImport", factors.import_time_per_import),
            ("complexityFactors.assemblyTime", factors.assembly_time),
            ("complexityFactors.upgradeability.proxyPattern", upgrade.proxy_pattern),
            ("complexityFactors.upgradeability.storageLayout", upgrade.storage_layout),
            ("complexityFactors.upgradeability.adminRights", upgrade.admin_rights),
            ("complexityFactors.upgradeability.initialization", upgrade.initialization),
            (
                "complexityFactors.upgradeability.interContractConsistency",
                upgrade.inter_contract_consistency,
            ),
        ];

        for (key, value) in weights {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{key} must be a non-negative number, got {value}"));
            }
        }
        Ok(())
    }

    pub fn to_yaml(&self) -> std::result::Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

fn set<T: Copy>(target: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *target = value;
    }
}

fn invalid(path: &Path, cause: impl ToString) -> EstimateError {
    EstimateError::InvalidConfig {
        path: path.to_path_buf(),
        cause: cause.to_string(),
    }
}

/// A partial weight table as read from an overlay file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct WeightOverlay {
    #[serde(default)]
    pub size_thresholds: Option<SizeThresholdsOverlay>,
    #[serde(default)]
    pub base_times: Option<BaseTimesOverlay>,
    #[serde(default)]
    pub complexity_factors: Option<ComplexityFactorsOverlay>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SizeThresholdsOverlay {
    pub small: Option<usize>,
    pub medium: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BaseTimesOverlay {
    pub small: Option<f64>,
    pub medium: Option<f64>,
    pub large: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ComplexityFactorsOverlay {
    pub base_function_count: Option<usize>,
    pub function_time: Option<f64>,
    pub external_call_time: Option<f64>,
    pub import_time_flat_rate: Option<f64>,
    pub import_time_per_import: Option<f64>,
    pub assembly_time: Option<f64>,
    pub upgradeability: Option<UpgradeabilityOverlay>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpgradeabilityOverlay {
    pub proxy_pattern: Option<f64>,
    pub storage_layout: Option<f64>,
    pub admin_rights: Option<f64>,
    pub initialization: Option<f64>,
    pub inter_contract_consistency: Option<f64>,
}

impl WeightOverlay {
    pub fn from_json_str(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str(content)
    }

    pub fn from_yaml_str(content: &str) -> std::result::Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    /// YAML for `.yaml`/`.yml` files, JSON for everything else.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| invalid(path, e))?;

        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );

        if is_yaml {
            Self::from_yaml_str(&content).map_err(|e| invalid(path, e))
        } else {
            Self::from_json_str(&content).map_err(|e| invalid(path, e))
        }
    }
}

pub const EXAMPLE_OVERLAY: &str = r#"{
  "sizeThresholds": { "small": 150 },
  "baseTimes": { "large": 40 },
  "complexityFactors": {
    "externalCallTime": 2,
    "upgradeability": { "proxyPattern": 6 }
  }
}
"#;
