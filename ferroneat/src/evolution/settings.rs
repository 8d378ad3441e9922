use crate::reproduction::SettingsError;

use serde::{Deserialize, Serialize};

/// Settings of the generational algorithm itself.
///
/// All quantities expressing proportions must lie in `[0, 1]`, and the two
/// offspring proportions must sum to 1; [`validate`](EvolutionSettings::validate)
/// checks both.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionSettings {
    /// Target number of species for k-means clustering.
    #[serde(alias = "speciescount")]
    pub species_count: usize,
    /// Top proportion of each species preserved unchanged.
    #[serde(alias = "elitismproportion")]
    pub elitism_proportion: f64,
    /// Top proportion of each species eligible as parents.
    #[serde(alias = "selectionproportion")]
    pub selection_proportion: f64,
    /// Proportion of non-elite offspring produced asexually.
    #[serde(alias = "offspringasexualproportion")]
    pub offspring_asexual_proportion: f64,
    /// Proportion of non-elite offspring produced sexually.
    #[serde(alias = "offspringsexualproportion")]
    pub offspring_sexual_proportion: f64,
    /// Chance that a sexual pairing draws its second parent from another
    /// species.
    #[serde(alias = "interspeciesmatingproportion")]
    pub interspecies_mating_proportion: f64,
    /// Window length of the moving averages kept by the statistics
    /// tracker.
    #[serde(alias = "statisticsmovingaveragehistorylength")]
    pub statistics_moving_average_history_length: usize,
}

impl Default for EvolutionSettings {
    fn default() -> EvolutionSettings {
        EvolutionSettings {
            species_count: 10,
            elitism_proportion: 0.2,
            selection_proportion: 0.2,
            offspring_asexual_proportion: 0.5,
            offspring_sexual_proportion: 0.5,
            interspecies_mating_proportion: 0.01,
            statistics_moving_average_history_length: 100,
        }
    }
}

impl EvolutionSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        let proportions = [
            self.elitism_proportion,
            self.selection_proportion,
            self.offspring_asexual_proportion,
            self.offspring_sexual_proportion,
            self.interspecies_mating_proportion,
        ];
        if proportions.iter().any(|p| !(0.0..=1.0).contains(p)) {
            return Err(SettingsError::ProbabilityOutOfRange);
        }
        let offspring_sum = self.offspring_asexual_proportion + self.offspring_sexual_proportion;
        if (offspring_sum - 1.0).abs() > 1e-6 {
            return Err(SettingsError::ProbabilitiesDoNotSumToOne);
        }
        Ok(())
    }
}
