use crate::evaluation::EvaluationScheme;
use crate::evolution::{ComplexityRegulationSettings, EvolutionSettings};
use crate::experiments::{logical_core_count, Experiment};
use crate::networks::Activation;
use crate::reproduction::{
    AsexualReproductionSettings, SettingsError, SexualReproductionSettings,
};

use serde::Deserialize;
use serde_json::Value;

use std::error::Error;
use std::fmt;
use std::io;

/// Errors raised while loading or validating experiment configuration.
/// Configuration errors abort experiment construction; nothing is partially
/// applied.
#[derive(Debug)]
pub enum ConfigError {
    Io(io::Error),
    Json(serde_json::Error),
    UnknownActivation(String),
    InvalidProportion(&'static str),
    InvalidCount(&'static str),
    /// `degree_of_parallelism` must be −1 (logical core count) or ≥ 1.
    InvalidParallelism(i64),
    Settings(SettingsError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "configuration i/o error: {}", e),
            Self::Json(e) => write!(f, "configuration is not valid JSON: {}", e),
            Self::UnknownActivation(name) => {
                write!(f, "unknown activation function name {:?}", name)
            }
            Self::InvalidProportion(field) => {
                write!(f, "{} must lie in the range [0, 1]", field)
            }
            Self::InvalidCount(field) => write!(f, "{} is out of range", field),
            Self::InvalidParallelism(value) => write!(
                f,
                "degree_of_parallelism must be -1 or >= 1, got {}",
                value
            ),
            Self::Settings(e) => write!(f, "{}", e),
        }
    }
}

impl Error for ConfigError {}

impl From<io::Error> for ConfigError {
    fn from(e: io::Error) -> ConfigError {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> ConfigError {
        ConfigError::Json(e)
    }
}

/// The JSON shape of an experiment configuration.
///
/// Field names are matched case-insensitively (and underscore-insensitively)
/// by normalising the document's keys before deserialisation; unrecognised
/// fields are ignored and missing fields leave the experiment's defaults in
/// place.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    pub id: Option<String>,
    #[serde(rename = "populationsize")]
    pub population_size: Option<usize>,
    #[serde(rename = "initialinterconnectionsproportion")]
    pub initial_interconnections_proportion: Option<f64>,
    #[serde(rename = "isacyclic")]
    pub is_acyclic: Option<bool>,
    #[serde(rename = "cyclesperactivation")]
    pub cycles_per_activation: Option<usize>,
    #[serde(rename = "activationfnname")]
    pub activation_fn_name: Option<String>,
    #[serde(rename = "connectionweightscale")]
    pub connection_weight_scale: Option<f64>,
    #[serde(rename = "degreeofparallelism")]
    pub degree_of_parallelism: Option<i64>,
    #[serde(rename = "enablehardwareacceleratedneuralnets")]
    pub enable_hardware_accelerated_neural_nets: Option<bool>,
    #[serde(rename = "enablehardwareacceleratedactivationfunctions")]
    pub enable_hardware_accelerated_activation_functions: Option<bool>,
    #[serde(rename = "evolutionalgorithmsettings")]
    pub evolution_algorithm_settings: Option<EvolutionSettings>,
    #[serde(rename = "reproductionasexualsettings")]
    pub reproduction_asexual_settings: Option<AsexualReproductionSettings>,
    #[serde(rename = "reproductionsexualsettings")]
    pub reproduction_sexual_settings: Option<SexualReproductionSettings>,
    #[serde(rename = "complexityregulationstrategy")]
    pub complexity_regulation_strategy: Option<ComplexityRegulationSettings>,
}

impl ExperimentConfig {
    pub fn from_json_reader(reader: impl io::Read) -> Result<ExperimentConfig, ConfigError> {
        let mut value: Value = serde_json::from_reader(reader)?;
        normalize_keys(&mut value);
        Ok(serde_json::from_value(value)?)
    }

    pub fn from_json_str(json: &str) -> Result<ExperimentConfig, ConfigError> {
        ExperimentConfig::from_json_reader(json.as_bytes())
    }

    /// Applies every present field onto `experiment`, then validates the
    /// result.
    pub fn apply<S: EvaluationScheme>(
        self,
        mut experiment: Experiment<S>,
    ) -> Result<Experiment<S>, ConfigError> {
        if let Some(id) = self.id {
            experiment.id = id;
        }
        if let Some(size) = self.population_size {
            experiment.population_size = size;
        }
        if let Some(proportion) = self.initial_interconnections_proportion {
            experiment.initial_interconnections_proportion = proportion;
        }
        if let Some(acyclic) = self.is_acyclic {
            experiment.is_acyclic = acyclic;
        }
        if let Some(cycles) = self.cycles_per_activation {
            experiment.cycles_per_activation = cycles;
        }
        if let Some(name) = self.activation_fn_name {
            experiment.activation = Activation::from_name(&name)
                .ok_or(ConfigError::UnknownActivation(name))?;
        }
        if let Some(scale) = self.connection_weight_scale {
            experiment.connection_weight_scale = scale;
        }
        if let Some(parallelism) = self.degree_of_parallelism {
            experiment.degree_of_parallelism = resolve_parallelism(parallelism)?;
        }
        if let Some(enable) = self.enable_hardware_accelerated_neural_nets {
            experiment.enable_hardware_accelerated_neural_nets = enable;
        }
        if let Some(enable) = self.enable_hardware_accelerated_activation_functions {
            experiment.enable_hardware_accelerated_activation_functions = enable;
        }
        if let Some(settings) = self.evolution_algorithm_settings {
            experiment.evolution_settings = settings;
        }
        if let Some(settings) = self.reproduction_asexual_settings {
            experiment.asexual_settings = settings;
        }
        if let Some(settings) = self.reproduction_sexual_settings {
            experiment.sexual_settings = settings;
        }
        if let Some(settings) = self.complexity_regulation_strategy {
            experiment.complexity_regulation = settings;
        }
        experiment.validate()?;
        Ok(experiment)
    }
}

/// Resolves the configured worker count: −1 means the logical core count;
/// any other value below 1 is an error.
fn resolve_parallelism(configured: i64) -> Result<usize, ConfigError> {
    match configured {
        -1 => Ok(logical_core_count()),
        n if n >= 1 => Ok(n as usize),
        n => Err(ConfigError::InvalidParallelism(n)),
    }
}

/// Lowercases every object key and strips underscores, recursively, so
/// `PopulationSize`, `population_size` and `populationsize` all match.
fn normalize_keys(value: &mut Value) {
    match value {
        Value::Object(map) => {
            let entries: Vec<(String, Value)> = std::mem::take(map)
                .into_iter()
                .map(|(key, mut inner)| {
                    normalize_keys(&mut inner);
                    let normalized: String = key
                        .chars()
                        .filter(|c| *c != '_')
                        .map(|c| c.to_ascii_lowercase())
                        .collect();
                    (normalized, inner)
                })
                .collect();
            map.extend(entries);
        }
        Value::Array(values) => {
            for inner in values {
                normalize_keys(inner);
            }
        }
        _ => {}
    }
}
