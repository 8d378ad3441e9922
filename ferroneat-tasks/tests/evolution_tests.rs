//! End-to-end evolution scenarios.

use ferroneat::evaluation::{EvaluationScheme, Evaluator};
use ferroneat::evolution::EvolutionAlgorithm;
use ferroneat::experiments::ExperimentFactory;
use ferroneat::networks::{decode, BlackBox};
use ferroneat_tasks::multiplexer::Binary6MuxExperimentFactory;
use ferroneat_tasks::xor::{XorExperimentFactory, XorScheme};

#[test]
fn xor_solves_within_500_generations() {
    let experiment = XorExperimentFactory
        .create_experiment(&mut r#"{"populationSize": 150}"#.as_bytes())
        .unwrap()
        .degree_of_parallelism(1);
    let mut ea = EvolutionAlgorithm::new(experiment, 42).unwrap();

    let outcome = ea.run_to_stop(500).unwrap();
    assert!(
        outcome.stop_condition_met,
        "no solution after {} generations (best {:?})",
        outcome.generation,
        outcome.best_fitness
    );

    // The champion must satisfy the truth table at > 0.5 / <= 0.5.
    let champion = ea.best_genome().unwrap();
    let mut phenome = decode(champion, ea.model()).unwrap();
    for (inputs, expected) in [
        ([0.0, 0.0], false),
        ([0.0, 1.0], true),
        ([1.0, 0.0], true),
        ([1.0, 1.0], false),
    ] {
        phenome.reset();
        let buffer = phenome.inputs_mut();
        buffer[0] = 1.0;
        buffer[1..].copy_from_slice(&inputs);
        phenome.activate();
        assert_eq!(
            phenome.outputs()[0] > 0.5,
            expected,
            "wrong answer for inputs {:?}",
            inputs
        );
    }
}

#[test]
#[ignore = "minutes-long: 500 genomes x 64 patterns per generation"]
fn binary_6_mux_reaches_perfect_classification() {
    let experiment = Binary6MuxExperimentFactory
        .create_experiment(&mut r#"{"populationSize": 500}"#.as_bytes())
        .unwrap();
    let mut ea = EvolutionAlgorithm::new(experiment, 1).unwrap();

    let outcome = ea.run_to_stop(2000).unwrap();
    assert!(outcome.stop_condition_met);

    let champion = ea.best_genome().unwrap();
    let mut phenome = decode(champion, ea.model()).unwrap();
    let fitness = ea
        .scheme()
        .create_evaluator()
        .evaluate(&mut phenome);
    // Perfect classification on all 64 patterns.
    assert_eq!(fitness.aux[0], 64.0);
}

#[test]
fn serial_runs_with_one_seed_are_bitwise_identical() {
    let trajectory = || {
        let experiment = XorExperimentFactory
            .create_experiment(&mut "{}".as_bytes())
            .unwrap()
            .degree_of_parallelism(1);
        let mut ea = EvolutionAlgorithm::new(experiment, 7).unwrap();
        for _ in 0..20 {
            if ea.perform_generation().unwrap().stop_condition_met {
                break;
            }
        }
        ea.logger()
            .iter()
            .map(|s| s.best_fitness.primary.to_bits())
            .collect::<Vec<_>>()
    };
    assert_eq!(trajectory(), trajectory());
}

#[test]
fn parallel_evaluation_preserves_the_fitness_trajectory() {
    let trajectory = |workers: usize| {
        let experiment = XorExperimentFactory
            .create_experiment(&mut "{}".as_bytes())
            .unwrap()
            .degree_of_parallelism(workers);
        let mut ea = EvolutionAlgorithm::new(experiment, 11).unwrap();
        for _ in 0..15 {
            if ea.perform_generation().unwrap().stop_condition_met {
                break;
            }
        }
        ea.logger()
            .iter()
            .map(|s| s.best_fitness.primary.to_bits())
            .collect::<Vec<_>>()
    };
    // Reproduction is single-threaded and the XOR evaluator deterministic,
    // so worker count cannot change the trajectory.
    assert_eq!(trajectory(1), trajectory(4));
}

#[test]
fn population_size_holds_across_generations() {
    let experiment = XorExperimentFactory
        .create_experiment(&mut r#"{"populationSize": 80}"#.as_bytes())
        .unwrap()
        .degree_of_parallelism(2);
    let mut ea = EvolutionAlgorithm::new(experiment, 3).unwrap();
    for _ in 0..10 {
        if ea.perform_generation().unwrap().stop_condition_met {
            break;
        }
        assert_eq!(ea.population().genomes().len(), 80);
    }
}

#[test]
fn acyclicity_holds_for_every_genome_ever_decoded() {
    let experiment = XorExperimentFactory
        .create_experiment(&mut r#"{"populationSize": 60}"#.as_bytes())
        .unwrap()
        .degree_of_parallelism(1);
    let mut ea = EvolutionAlgorithm::new(experiment, 23).unwrap();
    for _ in 0..10 {
        if ea.perform_generation().unwrap().stop_condition_met {
            break;
        }
        for genome in ea.population().genomes() {
            // decode panics (debug assertion) on a cyclic genome under an
            // acyclic model, and viable genomes must decode cleanly.
            let _ = decode(genome, ea.model());
        }
    }
}

#[test]
fn xor_scheme_contract_matches_the_model() {
    let scheme = XorScheme;
    assert_eq!(scheme.input_count(), 2);
    assert_eq!(scheme.output_count(), 1);
    assert!(scheme.is_deterministic());
    assert!(!scheme.evaluators_have_state());
    assert_eq!(scheme.null_fitness().primary, 0.0);
}
