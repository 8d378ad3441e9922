//! Reproduction operators: asexual mutation and sexual uniform crossover.
//!
//! Both strategies produce brand-new genomes; parents are never edited.
//! Asexual reproduction applies exactly one of four mutations chosen by a
//! configured probability distribution; sexual reproduction merges two
//! parents' genes by innovation number. On acyclic models both paths consult
//! the graph kernel's cycle test so no operator can ever produce a cyclic
//! child.

mod asexual;
mod builder;
mod sexual;
mod weights;

pub use asexual::{AsexualReproduction, MutationOp, OperatorDistribution};
pub use builder::GeneListBuilder;
pub use sexual::SexualReproduction;
pub use weights::{WeightMutation, WeightMutationScheme};

use serde::{Deserialize, Serialize};

use std::error::Error;
use std::fmt;

/// Probabilities of the four asexual mutation operators. Must sum to 1.
///
/// The serde aliases are the normalised (lowercased, underscore-free) key
/// forms the case-insensitive JSON configuration loader produces.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AsexualReproductionSettings {
    #[serde(alias = "connectionweightprobability")]
    pub connection_weight_probability: f64,
    #[serde(alias = "addnodeprobability")]
    pub add_node_probability: f64,
    #[serde(alias = "addconnectionprobability")]
    pub add_connection_probability: f64,
    #[serde(alias = "deleteconnectionprobability")]
    pub delete_connection_probability: f64,
}

impl AsexualReproductionSettings {
    /// Checks that each probability lies in `[0, 1]` and that they sum
    /// to 1.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let probabilities = [
            self.connection_weight_probability,
            self.add_node_probability,
            self.add_connection_probability,
            self.delete_connection_probability,
        ];
        if probabilities.iter().any(|p| !(0.0..=1.0).contains(p)) {
            return Err(SettingsError::ProbabilityOutOfRange);
        }
        if (probabilities.iter().sum::<f64>() - 1.0).abs() > 1e-6 {
            return Err(SettingsError::ProbabilitiesDoNotSumToOne);
        }
        Ok(())
    }
}

impl Default for AsexualReproductionSettings {
    fn default() -> AsexualReproductionSettings {
        AsexualReproductionSettings {
            connection_weight_probability: 0.94,
            add_node_probability: 0.01,
            add_connection_probability: 0.025,
            delete_connection_probability: 0.025,
        }
    }
}

/// Settings for uniform crossover.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SexualReproductionSettings {
    /// Chance that a gene present only on the secondary parent is copied
    /// into the child.
    #[serde(alias = "secondaryparentgeneprobability")]
    pub secondary_parent_gene_probability: f64,
}

impl SexualReproductionSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if (0.0..=1.0).contains(&self.secondary_parent_gene_probability) {
            Ok(())
        } else {
            Err(SettingsError::ProbabilityOutOfRange)
        }
    }
}

impl Default for SexualReproductionSettings {
    fn default() -> SexualReproductionSettings {
        SexualReproductionSettings {
            secondary_parent_gene_probability: 0.02,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SettingsError {
    ProbabilityOutOfRange,
    ProbabilitiesDoNotSumToOne,
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProbabilityOutOfRange => {
                write!(f, "reproduction probability outside the range [0, 1]")
            }
            Self::ProbabilitiesDoNotSumToOne => {
                write!(f, "asexual mutation probabilities must sum to 1")
            }
        }
    }
}

impl Error for SettingsError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_asexual_settings_are_valid() {
        assert!(AsexualReproductionSettings::default().validate().is_ok());
    }

    #[test]
    fn rejects_bad_probability_sum() {
        let settings = AsexualReproductionSettings {
            connection_weight_probability: 0.5,
            add_node_probability: 0.5,
            add_connection_probability: 0.5,
            delete_connection_probability: 0.0,
        };
        assert_eq!(
            settings.validate(),
            Err(SettingsError::ProbabilitiesDoNotSumToOne)
        );
    }

    #[test]
    fn rejects_out_of_range_probability() {
        let settings = SexualReproductionSettings {
            secondary_parent_gene_probability: 1.5,
        };
        assert_eq!(settings.validate(), Err(SettingsError::ProbabilityOutOfRange));
    }
}
