//! The XOR function approximation task, the classic NEAT benchmark.

use ferroneat::evaluation::{EvaluationScheme, Evaluator, FitnessInfo};
use ferroneat::experiments::{ConfigError, Experiment, ExperimentConfig, ExperimentFactory};
use ferroneat::networks::{Activation, BlackBox};

use std::cmp::Ordering;
use std::io;

const CASES: [([f64; 2], f64); 4] = [
    ([0.0, 0.0], 0.0),
    ([0.0, 1.0], 1.0),
    ([1.0, 0.0], 1.0),
    ([1.0, 1.0], 0.0),
];

/// Bonus awarded once every truth-table row lands on the correct side of
/// 0.5; the stop condition can only be reached through it.
const CORRECT_BONUS: f64 = 10.0;

/// XOR over two binary inputs.
///
/// Each truth-table row scores 1 when the output is on the correct side of
/// 0.5, and partial credit proportional to closeness otherwise. A genome
/// classifying all four rows gains a further 10, so the stop threshold of
/// 10 is met exactly by the solutions the task is after.
pub struct XorScheme;

pub struct XorEvaluator;

impl Evaluator for XorEvaluator {
    fn evaluate(&mut self, phenome: &mut dyn BlackBox) -> FitnessInfo {
        let mut fitness = 0.0;
        let mut correct = 0;
        for (inputs, expected) in &CASES {
            phenome.reset();
            let buffer = phenome.inputs_mut();
            buffer[0] = 1.0;
            buffer[1..].copy_from_slice(inputs);
            phenome.activate();

            let output = phenome.outputs()[0];
            if (output > 0.5) == (*expected > 0.5) {
                correct += 1;
                fitness += 1.0;
            } else {
                fitness += (1.0 - (output - expected).abs()).max(0.0);
            }
        }
        if correct == CASES.len() {
            fitness += CORRECT_BONUS;
        }
        FitnessInfo::with_aux(fitness, vec![correct as f64])
    }
}

impl EvaluationScheme for XorScheme {
    type Evaluator = XorEvaluator;

    fn input_count(&self) -> usize {
        2
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

    fn create_evaluator(&self) -> XorEvaluator {
        XorEvaluator
    }

    fn test_for_stop_condition(&self, fitness: &FitnessInfo) -> bool {
        fitness.primary >= 10.0
    }
}

/// Builds XOR experiments: acyclic, steep-logistic outputs, population 150
/// unless the configuration says otherwise.
pub struct XorExperimentFactory;

impl ExperimentFactory for XorExperimentFactory {
    type Scheme = XorScheme;

    fn id(&self) -> &str {
        "xor"
    }

    fn create_experiment(
        &self,
        config: &mut dyn io::Read,
    ) -> Result<Experiment<XorScheme>, ConfigError> {
        let base = Experiment::new(self.id(), XorScheme)
            .population_size(150)
            .acyclic()
            .activation(Activation::Logistic)
            .weight_scale(5.0);
        ExperimentConfig::from_json_reader(config)?.apply(base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferroneat::genomics::{ConnectionGene, ConnectionGenes, Genome, Model};
    use ferroneat::networks::decode;

    #[test]
    fn truth_table_is_xor() {
        for (inputs, expected) in &CASES {
            let bit = |x: f64| x > 0.5;
            assert_eq!(bit(inputs[0]) ^ bit(inputs[1]), *expected > 0.5);
        }
    }

    #[test]
    fn unconnected_genome_scores_below_stop_threshold() {
        let scheme = XorScheme;
        let model = Model::acyclic(2, 1, Activation::Logistic, 5.0);
        // Bias-only connectivity: the output is constant, so at most half
        // the rows can sit on the correct side.
        let genes = ConnectionGenes::from_vec(vec![ConnectionGene {
            innovation: 0,
            source: 0,
            target: 3,
            weight: 1.0,
        }]);
        let genome = Genome::new(0, 0, genes);
        let mut phenome = decode(&genome, &model).unwrap();
        let fitness = scheme.create_evaluator().evaluate(&mut phenome);
        assert!(fitness.primary < 10.0);
        assert!(!scheme.test_for_stop_condition(&fitness));
    }

    #[test]
    fn stop_condition_requires_the_bonus() {
        let scheme = XorScheme;
        assert!(!scheme.test_for_stop_condition(&FitnessInfo::new(4.0)));
        assert!(scheme.test_for_stop_condition(&FitnessInfo::new(14.0)));
    }

    #[test]
    fn factory_defaults_are_overridable() {
        let factory = XorExperimentFactory;
        let experiment = factory
            .create_experiment(&mut r#"{"populationSize": 99}"#.as_bytes())
            .unwrap();
        assert_eq!(experiment.population_size, 99);
        assert!(experiment.is_acyclic);
        assert_eq!(experiment.scheme.input_count(), 2);
    }
}
