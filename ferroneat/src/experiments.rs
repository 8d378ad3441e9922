//! Experiment descriptors and their JSON configuration.
//!
//! An [`Experiment`] bundles an evaluation scheme with every knob the
//! evolution loop needs: population size, topology class, activation
//! function, reproduction and speciation settings, complexity regulation,
//! and the worker count. Experiments can be assembled in code with the
//! builder-style setters, or loaded from a JSON stream whose field names
//! are matched case-insensitively.

mod config;

pub use config::{ConfigError, ExperimentConfig};

use crate::evaluation::EvaluationScheme;
use crate::evolution::{ComplexityRegulationSettings, EvolutionSettings};
use crate::genomics::Model;
use crate::networks::Activation;
use crate::reproduction::{AsexualReproductionSettings, SexualReproductionSettings};

use std::io;
use std::thread;

/// A fully specified experiment: an evaluation scheme plus run settings.
#[derive(Debug)]
pub struct Experiment<S> {
    /// Stable, human-readable identifier.
    pub id: String,
    pub scheme: S,
    pub population_size: usize,
    /// Probability that each (bias-or-input, output) pair is connected in
    /// an initial genome.
    pub initial_interconnections_proportion: f64,
    pub is_acyclic: bool,
    pub cycles_per_activation: usize,
    pub activation: Activation,
    pub connection_weight_scale: f64,
    pub evolution_settings: EvolutionSettings,
    pub asexual_settings: AsexualReproductionSettings,
    pub sexual_settings: SexualReproductionSettings,
    pub complexity_regulation: ComplexityRegulationSettings,
    /// Worker count for fitness evaluation, already resolved: configuration
    /// value −1 becomes the logical core count.
    pub degree_of_parallelism: usize,
    /// Accepted for configuration compatibility; the portable network and
    /// activation implementations are always used.
    pub enable_hardware_accelerated_neural_nets: bool,
    pub enable_hardware_accelerated_activation_functions: bool,
}

impl<S: EvaluationScheme> Experiment<S> {
    /// An experiment with stock settings: acyclic topology, population 150,
    /// fully interconnected initial genomes, LeakyReLU activation.
    pub fn new(id: &str, scheme: S) -> Experiment<S> {
        Experiment {
            id: id.to_string(),
            scheme,
            population_size: 150,
            initial_interconnections_proportion: 1.0,
            is_acyclic: true,
            cycles_per_activation: 1,
            activation: Activation::LeakyRelu,
            connection_weight_scale: 5.0,
            evolution_settings: EvolutionSettings::default(),
            asexual_settings: AsexualReproductionSettings::default(),
            sexual_settings: SexualReproductionSettings::default(),
            complexity_regulation: ComplexityRegulationSettings::default(),
            degree_of_parallelism: logical_core_count(),
            enable_hardware_accelerated_neural_nets: false,
            enable_hardware_accelerated_activation_functions: false,
        }
    }

    pub fn population_size(mut self, size: usize) -> Experiment<S> {
        self.population_size = size;
        self
    }

    pub fn initial_interconnections(mut self, proportion: f64) -> Experiment<S> {
        self.initial_interconnections_proportion = proportion;
        self
    }

    pub fn acyclic(mut self) -> Experiment<S> {
        self.is_acyclic = true;
        self
    }

    pub fn cyclic(mut self, cycles_per_activation: usize) -> Experiment<S> {
        self.is_acyclic = false;
        self.cycles_per_activation = cycles_per_activation;
        self
    }

    pub fn activation(mut self, activation: Activation) -> Experiment<S> {
        self.activation = activation;
        self
    }

    pub fn weight_scale(mut self, scale: f64) -> Experiment<S> {
        self.connection_weight_scale = scale;
        self
    }

    pub fn evolution_settings(mut self, settings: EvolutionSettings) -> Experiment<S> {
        self.evolution_settings = settings;
        self
    }

    pub fn asexual_settings(mut self, settings: AsexualReproductionSettings) -> Experiment<S> {
        self.asexual_settings = settings;
        self
    }

    pub fn sexual_settings(mut self, settings: SexualReproductionSettings) -> Experiment<S> {
        self.sexual_settings = settings;
        self
    }

    pub fn complexity_regulation(
        mut self,
        settings: ComplexityRegulationSettings,
    ) -> Experiment<S> {
        self.complexity_regulation = settings;
        self
    }

    pub fn degree_of_parallelism(mut self, workers: usize) -> Experiment<S> {
        self.degree_of_parallelism = workers.max(1);
        self
    }

    /// The population-wide model this experiment implies. Input and output
    /// counts come from the scheme; topology, activation and weight scale
    /// from the experiment.
    pub fn model(&self) -> Model {
        Model {
            input_count: self.scheme.input_count(),
            output_count: self.scheme.output_count(),
            is_acyclic: self.is_acyclic,
            cycles_per_activation: self.cycles_per_activation,
            activation: self.activation,
            weight_scale: self.connection_weight_scale,
        }
    }

    /// Fail-fast validation of every setting, run before the evolution
    /// algorithm is constructed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scheme.output_count() == 0 {
            return Err(ConfigError::InvalidCount("output_count"));
        }
        if self.population_size < 2 {
            return Err(ConfigError::InvalidCount("population_size"));
        }
        if !(0.0..=1.0).contains(&self.initial_interconnections_proportion) {
            return Err(ConfigError::InvalidProportion(
                "initial_interconnections_proportion",
            ));
        }
        if self.connection_weight_scale <= 0.0 {
            return Err(ConfigError::InvalidCount("connection_weight_scale"));
        }
        if !self.is_acyclic && self.cycles_per_activation == 0 {
            return Err(ConfigError::InvalidCount("cycles_per_activation"));
        }
        if self.evolution_settings.species_count == 0 {
            return Err(ConfigError::InvalidCount("species_count"));
        }
        self.evolution_settings
            .validate()
            .map_err(ConfigError::Settings)?;
        self.asexual_settings
            .validate()
            .map_err(ConfigError::Settings)?;
        self.sexual_settings
            .validate()
            .map_err(ConfigError::Settings)?;
        Ok(())
    }
}

/// Builders of experiments, usually one per task. The configuration stream
/// is JSON with case-insensitive field names; unrecognised fields are
/// ignored and missing fields take their defaults.
pub trait ExperimentFactory {
    type Scheme: EvaluationScheme;

    /// Stable identifier of the experiments this factory produces.
    fn id(&self) -> &str;

    fn create_experiment(
        &self,
        config: &mut dyn io::Read,
    ) -> Result<Experiment<Self::Scheme>, ConfigError>;
}

pub(crate) fn logical_core_count() -> usize {
    thread::available_parallelism().map_or(1, |n| n.get())
}
