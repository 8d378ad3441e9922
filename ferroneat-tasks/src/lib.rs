//! Task evaluation schemes for the `ferroneat` NEAT runtime.
//!
//! Each task implements [`EvaluationScheme`](ferroneat::evaluation::EvaluationScheme)
//! plus an [`ExperimentFactory`](ferroneat::experiments::ExperimentFactory)
//! carrying sensible defaults, so a full experiment is one configuration
//! stream away:
//!
//! ```no_run
//! use ferroneat::evolution::EvolutionAlgorithm;
//! use ferroneat::experiments::ExperimentFactory;
//! use ferroneat_tasks::xor::XorExperimentFactory;
//!
//! let factory = XorExperimentFactory;
//! let experiment = factory
//!     .create_experiment(&mut r#"{"populationSize": 150}"#.as_bytes())
//!     .unwrap();
//! let mut ea = EvolutionAlgorithm::new(experiment, 42).unwrap();
//! let outcome = ea.run_to_stop(500).unwrap();
//! assert!(outcome.stop_condition_met);
//! ```

pub mod multiplexer;
pub mod xor;

pub use multiplexer::{Binary6MuxExperimentFactory, Binary6MuxScheme};
pub use xor::{XorExperimentFactory, XorScheme};
