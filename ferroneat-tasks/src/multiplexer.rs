//! The binary 6-multiplexer task: two address bits select one of four data
//! bits.

use ferroneat::evaluation::{EvaluationScheme, Evaluator, FitnessInfo};
use ferroneat::experiments::{ConfigError, Experiment, ExperimentConfig, ExperimentFactory};
use ferroneat::networks::{Activation, BlackBox};

use std::cmp::Ordering;
use std::io;

const INPUT_COUNT: usize = 6;
const PATTERN_COUNT: usize = 1 << INPUT_COUNT;
const CORRECT_BONUS: f64 = 10.0;

/// The six-bit multiplexer.
///
/// Inputs are `[a1, a0, d0, d1, d2, d3]`; the correct output is the data
/// bit addressed by `a1 a0`. All 64 input patterns are evaluated. Scoring
/// follows the XOR scheme's shape: one point per correctly classified
/// pattern, partial credit otherwise, and a bonus of 10 for perfect
/// classification, so the stop threshold of 74 is exactly "all 64 right".
pub struct Binary6MuxScheme;

pub struct Binary6MuxEvaluator;

impl Evaluator for Binary6MuxEvaluator {
    fn evaluate(&mut self, phenome: &mut dyn BlackBox) -> FitnessInfo {
        let mut fitness = 0.0;
        let mut correct = 0;
        for pattern in 0..PATTERN_COUNT {
            phenome.reset();
            let buffer = phenome.inputs_mut();
            buffer[0] = 1.0;
            for bit in 0..INPUT_COUNT {
                buffer[1 + bit] = ((pattern >> bit) & 1) as f64;
            }

            let address = pattern & 0b11;
            let expected = ((pattern >> (2 + address)) & 1) as f64;
            phenome.activate();

            let output = phenome.outputs()[0];
            if (output > 0.5) == (expected > 0.5) {
                correct += 1;
                fitness += 1.0;
            } else {
                fitness += (1.0 - (output - expected).abs()).max(0.0);
            }
        }
        if correct == PATTERN_COUNT {
            fitness += CORRECT_BONUS;
        }
        FitnessInfo::with_aux(fitness, vec![correct as f64])
    }
}

impl EvaluationScheme for Binary6MuxScheme {
    type Evaluator = Binary6MuxEvaluator;

    fn input_count(&self) -> usize {
        INPUT_COUNT
    }

    fn output_count(&self) -> usize {
        1
    }

    fn is_deterministic(&self) -> bool {
        true
    }

    fn fitness_cmp(&self, a: &FitnessInfo, b: &FitnessInfo) -> Ordering {
        a.primary.total_cmp(&b.primary)
    }

    fn null_fitness(&self) -> FitnessInfo {
        FitnessInfo::new(0.0)
    }

    fn evaluators_have_state(&self) -> bool {
        false
    }

    fn create_evaluator(&self) -> Binary6MuxEvaluator {
        Binary6MuxEvaluator
    }

    fn test_for_stop_condition(&self, fitness: &FitnessInfo) -> bool {
        fitness.primary >= PATTERN_COUNT as f64 + CORRECT_BONUS
    }
}

/// Builds binary 6-multiplexer experiments: acyclic, population 500.
pub struct Binary6MuxExperimentFactory;

impl ExperimentFactory for Binary6MuxExperimentFactory {
    type Scheme = Binary6MuxScheme;

    fn id(&self) -> &str {
        "binary-6-mux"
    }

    fn create_experiment(
        &self,
        config: &mut dyn io::Read,
    ) -> Result<Experiment<Binary6MuxScheme>, ConfigError> {
        let base = Experiment::new(self.id(), Binary6MuxScheme)
            .population_size(500)
            .acyclic()
            .activation(Activation::Logistic)
            .weight_scale(5.0);
        ExperimentConfig::from_json_reader(config)?.apply(base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_bits_select_the_right_data_bit() {
        // Address bits 0b10 (= 2) with only d2 set: expected output 1.
        let pattern = 0b01_0010usize;
        let address = pattern & 0b11;
        assert_eq!(address, 2);
        assert_eq!((pattern >> (2 + address)) & 1, 1);

        // Same data bits under address 0: d0 is clear, expected output 0.
        let pattern = 0b01_0000usize;
        assert_eq!(pattern & 0b11, 0);
        assert_eq!((pattern >> 2) & 1, 0);
    }

    #[test]
    fn stop_threshold_is_perfect_classification() {
        let scheme = Binary6MuxScheme;
        assert!(!scheme.test_for_stop_condition(&FitnessInfo::new(64.0)));
        assert!(scheme.test_for_stop_condition(&FitnessInfo::new(74.0)));
    }

    #[test]
    fn factory_configures_scheme_arity() {
        let factory = Binary6MuxExperimentFactory;
        let experiment = factory.create_experiment(&mut "{}".as_bytes()).unwrap();
        assert_eq!(experiment.scheme.input_count(), 6);
        assert_eq!(experiment.population_size, 500);
    }
}
