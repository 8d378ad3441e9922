use ferroneat::evolution::{EvolutionAlgorithm, Stats};
use ferroneat::experiments::ExperimentFactory;
use ferroneat::networks::{decode, BlackBox};
use ferroneat_tasks::xor::XorExperimentFactory;

const CONFIG: &str = r#"{
    "id": "xor",
    "populationSize": 150,
    "initialInterconnectionsProportion": 1.0,
    "isAcyclic": true,
    "activationFnName": "logistic",
    "connectionWeightScale": 5.0,
    "degreeOfParallelism": -1,
    "evolutionAlgorithmSettings": {
        "speciesCount": 10,
        "elitismProportion": 0.2,
        "selectionProportion": 0.2,
        "offspringAsexualProportion": 0.5,
        "offspringSexualProportion": 0.5,
        "interspeciesMatingProportion": 0.01
    },
    "complexityRegulationStrategy": {
        "strategy": "relative",
        "complexityCeiling": 20.0,
        "minSimplificationGenerations": 10
    }
}"#;

const MAX_GENERATIONS: u32 = 500;

fn main() {
    let seed = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(42);

    let experiment = match XorExperimentFactory.create_experiment(&mut CONFIG.as_bytes()) {
        Ok(experiment) => experiment,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };
    let mut ea = match EvolutionAlgorithm::new(experiment, seed) {
        Ok(ea) => ea,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    let outcome = match ea.run_to_stop(MAX_GENERATIONS) {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };
    for stats in ea.logger().iter() {
        println!("{}", stats);
    }

    let best_trajectory = Stats::from(ea.logger().iter().map(|s| s.best_fitness.primary));
    println!("best-fitness trajectory: {:?}", best_trajectory);

    if !outcome.stop_condition_met {
        println!(
            "no solution within {} generations (seed {})",
            MAX_GENERATIONS, seed
        );
        return;
    }

    let champion = ea.best_genome().expect("solved population has a champion");
    println!(
        "solved in {} generations (seed {}); champion: {}",
        ea.generation(),
        seed,
        serde_json::to_string(champion).unwrap()
    );

    let mut phenome = decode(champion, ea.model()).expect("champion is viable");
    for (a, b) in [(0.0, 0.0), (0.0, 1.0), (1.0, 0.0), (1.0, 1.0)] {
        phenome.reset();
        let inputs = phenome.inputs_mut();
        inputs[0] = 1.0;
        inputs[1] = a;
        inputs[2] = b;
        phenome.activate();
        println!("{} XOR {} -> {:.4}", a, b, phenome.outputs()[0]);
    }
}
