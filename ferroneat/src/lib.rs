//! An implementation of NeuroEvolution of Augmenting Topologies (NEAT),
//! following the 2002 paper: <http://nn.cs.utexas.edu/keyword?stanley:ec02>
//!
//! The crate evolves neural networks of variable topology under a
//! user-supplied fitness function. Network structure (which nodes and
//! connections exist) and connection weights are searched jointly, with
//! genomes clustered into species by genetic k-means and offspring budgets
//! distributed across species each generation. Both strictly acyclic
//! (feed-forward) and cyclic (recurrent) networks are supported, and fitness
//! evaluation is spread over a thread pool.
//!
//! Task-specific evaluation schemes (XOR, multiplexers, ...) live in the
//! companion `ferroneat-tasks` crate; this crate supplies the core: the
//! directed graph kernel, the genome representation, the phenome decoder,
//! the reproduction operators, speciation, and the generational loop.
//!
//! # Example usage: evolving an XOR approximator
//! ```no_run
//! use ferroneat::evaluation::{EvaluationScheme, Evaluator, FitnessInfo};
//! use ferroneat::evolution::EvolutionAlgorithm;
//! use ferroneat::experiments::Experiment;
//! use ferroneat::networks::{Activation, BlackBox};
//! use std::cmp::Ordering;
//!
//! struct XorScheme;
//! struct XorEvaluator;
//!
//! impl Evaluator for XorEvaluator {
//!     fn evaluate(&mut self, phenome: &mut dyn BlackBox) -> FitnessInfo {
//!         let cases = [
//!             ([0.0, 0.0], 0.0),
//!             ([0.0, 1.0], 1.0),
//!             ([1.0, 0.0], 1.0),
//!             ([1.0, 1.0], 0.0),
//!         ];
//!         let mut fitness = 0.0;
//!         for (inputs, expected) in &cases {
//!             phenome.reset();
//!             let buf = phenome.inputs_mut();
//!             buf[0] = 1.0; // bias
//!             buf[1..].copy_from_slice(inputs);
//!             phenome.activate();
//!             fitness += 1.0 - (phenome.outputs()[0] - expected).abs();
//!         }
//!         FitnessInfo::new(fitness)
//!     }
//! }
//!
//! impl EvaluationScheme for XorScheme {
//!     type Evaluator = XorEvaluator;
//!
//!     fn input_count(&self) -> usize { 2 }
//!     fn output_count(&self) -> usize { 1 }
//!     fn is_deterministic(&self) -> bool { true }
//!     fn fitness_cmp(&self, a: &FitnessInfo, b: &FitnessInfo) -> Ordering {
//!         a.primary.total_cmp(&b.primary)
//!     }
//!     fn null_fitness(&self) -> FitnessInfo { FitnessInfo::new(0.0) }
//!     fn evaluators_have_state(&self) -> bool { false }
//!     fn create_evaluator(&self) -> XorEvaluator { XorEvaluator }
//!     fn test_for_stop_condition(&self, fitness: &FitnessInfo) -> bool {
//!         fitness.primary >= 3.9
//!     }
//! }
//!
//! let experiment = Experiment::new("xor", XorScheme)
//!     .population_size(150)
//!     .activation(Activation::LeakyRelu)
//!     .acyclic();
//!
//! let mut ea = EvolutionAlgorithm::new(experiment, 42).unwrap();
//! let outcome = ea.run_to_stop(500).unwrap();
//! println!("stopped at generation {}", outcome.generation);
//! ```

pub mod evaluation;
pub mod evolution;
pub mod experiments;
pub mod genomics;
pub mod graph;
pub mod networks;
pub mod reproduction;
pub mod rng;
pub mod speciation;

/// Identifier type used to designate historically identical structural
/// mutations for the purposes of gene alignment and genetic tracking.
/// Node ids share this type: inputs and outputs occupy a fixed low range,
/// and hidden-node ids are drawn from the same kind of process-wide
/// sequence as connection innovations.
pub type Innovation = usize;
