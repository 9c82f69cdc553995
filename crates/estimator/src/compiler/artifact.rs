use std::collections::BTreeMap;

use serde::Serialize;

use super::standard_json::{AbiKind, CompilerOutput, ContractOutput};

/// Interface inventory of one contract, library or interface.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UnitInventory {
    pub functions: Vec<String>,
    pub events: Vec<String>,
}

impl UnitInventory {
    pub fn from_abi(contract: &ContractOutput) -> Self {
        let mut inventory = Self::default();
        for entry in &contract.abi {
            let name = entry.name.clone().unwrap_or_default();
            match entry.kind {
                AbiKind::Function => inventory.functions.push(name),
                AbiKind::Event => inventory.events.push(name),
                _ => {}
            }
        }
        inventory
    }

    pub fn function_count(&self) -> usize {
        self.functions.len()
    }
}

/// Units of the compiled main source, keyed by unit name. Read-only once built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StructuralArtifact {
    units: BTreeMap<String, UnitInventory>,
}

impl StructuralArtifact {
    pub fn new(units: BTreeMap<String, UnitInventory>) -> Self {
        Self { units }
    }

    /// Keeps only the contracts declared in `source_name`; imported units are compiled
    /// alongside but are not part of the estimate.
    pub fn from_output(output: &CompilerOutput, source_name: &str) -> Self {
        let units = output
            .contracts
            .get(source_name)
            .map(|contracts| {
                contracts
                    .iter()
                    .map(|(name, contract)| (name.clone(), UnitInventory::from_abi(contract)))
                    .collect()
            })
            .unwrap_or_default();
        Self { units }
    }

    pub fn units(&self) -> impl Iterator<Item = (&str, &UnitInventory)> {
        self.units.iter().map(|(name, unit)| (name.as_str(), unit))
    }

    pub fn unit(&self, name: &str) -> Option<&UnitInventory> {
        self.units.get(name)
    }

    pub fn unit_names(&self) -> Vec<String> {
        self.units.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::standard_json::AbiEntry;

    #[test]
    fn test_only_main_source_units_are_kept() {
        let mut output = CompilerOutput::default();
        output.contracts.insert(
            "Vault.sol".to_string(),
            BTreeMap::from([(
                "Vault".to_string(),
                ContractOutput {
                    abi: vec![
                        AbiEntry::function("deposit"),
                        AbiEntry::function("withdraw"),
                        AbiEntry::event("Deposited"),
                    ],
                },
            )]),
        );
        output.contracts.insert(
            "node_modules/@openzeppelin/contracts/token/ERC20/IERC20.sol".to_string(),
            BTreeMap::from([("IERC20".to_string(), ContractOutput::default())]),
        );

        let artifact = StructuralArtifact::from_output(&output, "Vault.sol");
        assert_eq!(artifact.unit_names(), vec!["Vault".to_string()]);

        let vault = artifact.unit("Vault").unwrap();
        assert_eq!(vault.function_count(), 2);
        assert_eq!(vault.events, vec!["Deposited".to_string()]);
    }

    #[test]
    fn test_missing_source_gives_empty_artifact() {
        let artifact = StructuralArtifact::from_output(&CompilerOutput::default(), "Nope.sol");
        assert!(artifact.is_empty());
    }
}
