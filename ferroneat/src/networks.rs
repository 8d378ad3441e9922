//! Phenomes: the executable networks produced by decoding genomes.
//!
//! A decoded phenome is a [`BlackBox`]: fixed-size input and output buffers
//! plus an `activate` step. Acyclic models decode to a layered feed-forward
//! network computed in a single pass; cyclic models decode to a
//! double-buffered recurrent network stepped a fixed number of times per
//! activation. Decoding a genome with no input-to-output path yields `None`,
//! and the evolution loop assigns such non-viable genomes the scheme's null
//! fitness.

mod acyclic;
mod cyclic;

pub use acyclic::AcyclicNetwork;
pub use cyclic::CyclicNetwork;

use crate::genomics::{Genome, Model};
use crate::graph::{AcyclicGraph, DirectedGraph};

use serde::{Deserialize, Serialize};

/// The scalar function applied at every non-input node. Uniform across a
/// run; chosen by name in the experiment configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Activation {
    /// `x` for positive inputs, `0.01 x` otherwise.
    LeakyRelu,
    Relu,
    /// Steepened logistic `1 / (1 + e^(-4.9 x))`, the classic NEAT sigmoid.
    Logistic,
    Tanh,
}

impl Activation {
    pub fn apply(self, x: f64) -> f64 {
        match self {
            Activation::LeakyRelu => {
                if x > 0.0 {
                    x
                } else {
                    0.01 * x
                }
            }
            Activation::Relu => x.max(0.0),
            Activation::Logistic => 1.0 / (1.0 + (-4.9 * x).exp()),
            Activation::Tanh => x.tanh(),
        }
    }

    /// Looks an activation function up by its configuration name,
    /// case-insensitively.
    ///
    /// # Examples
    /// ```
    /// use ferroneat::networks::Activation;
    ///
    /// assert_eq!(Activation::from_name("LeakyReLU"), Some(Activation::LeakyRelu));
    /// assert_eq!(Activation::from_name("nonesuch"), None);
    /// ```
    pub fn from_name(name: &str) -> Option<Activation> {
        match name.to_ascii_lowercase().as_str() {
            "leakyrelu" => Some(Activation::LeakyRelu),
            "relu" => Some(Activation::Relu),
            "logistic" => Some(Activation::Logistic),
            "tanh" => Some(Activation::Tanh),
            _ => None,
        }
    }
}

/// A decoded phenome.
///
/// The input buffer has `input_count + 1` slots; slot 0 is the bias, which
/// callers set to 1.0. Buffer memory belongs to the phenome and is released
/// when it is dropped, so an evaluator holding one only for the duration of
/// an `evaluate` call cannot leak it.
pub trait BlackBox {
    /// Input buffer length, including the bias slot.
    fn input_count(&self) -> usize;

    fn output_count(&self) -> usize;

    /// The writable input buffer. Slot 0 is the bias.
    fn inputs_mut(&mut self) -> &mut [f64];

    /// The output values computed by the latest [`activate`](BlackBox::activate).
    fn outputs(&self) -> &[f64];

    /// Propagates the current inputs through the network.
    fn activate(&mut self);

    /// Clears all internal node state. Evaluators call this between
    /// independent trials.
    fn reset(&mut self);
}

/// A phenome of either topology class. The set is closed (a model is
/// either acyclic or cyclic), so a tagged variant avoids boxing in the
/// evaluation hot path.
#[derive(Clone, Debug)]
pub enum Phenome {
    Acyclic(AcyclicNetwork),
    Cyclic(CyclicNetwork),
}

impl BlackBox for Phenome {
    fn input_count(&self) -> usize {
        match self {
            Phenome::Acyclic(n) => n.input_count(),
            Phenome::Cyclic(n) => n.input_count(),
        }
    }

    fn output_count(&self) -> usize {
        match self {
            Phenome::Acyclic(n) => n.output_count(),
            Phenome::Cyclic(n) => n.output_count(),
        }
    }

    fn inputs_mut(&mut self) -> &mut [f64] {
        match self {
            Phenome::Acyclic(n) => n.inputs_mut(),
            Phenome::Cyclic(n) => n.inputs_mut(),
        }
    }

    fn outputs(&self) -> &[f64] {
        match self {
            Phenome::Acyclic(n) => n.outputs(),
            Phenome::Cyclic(n) => n.outputs(),
        }
    }

    fn activate(&mut self) {
        match self {
            Phenome::Acyclic(n) => n.activate(),
            Phenome::Cyclic(n) => n.activate(),
        }
    }

    fn reset(&mut self) {
        match self {
            Phenome::Acyclic(n) => n.reset(),
            Phenome::Cyclic(n) => n.reset(),
        }
    }
}

/// Compiles a genome into a phenome under the given model.
///
/// Returns `None` for non-viable genomes: those whose network has no path
/// from any input (bias included) to any output.
///
/// # Examples
/// ```
/// use ferroneat::genomics::{ConnectionGene, ConnectionGenes, Genome, Model};
/// use ferroneat::networks::{decode, Activation, BlackBox};
///
/// let model = Model::acyclic(1, 1, Activation::Relu, 5.0);
/// let genes = ConnectionGenes::from_vec(vec![
///     // Input node 1 -> output node 2.
///     ConnectionGene { innovation: 1, source: 1, target: 2, weight: 2.0 },
/// ]);
/// let genome = Genome::new(0, 0, genes);
///
/// let mut phenome = decode(&genome, &model).unwrap();
/// phenome.inputs_mut()[0] = 1.0; // bias
/// phenome.inputs_mut()[1] = 1.5;
/// phenome.activate();
/// assert_eq!(phenome.outputs()[0], 3.0);
///
/// // An empty genome has no input-to-output path.
/// let empty = Genome::new(1, 0, ConnectionGenes::default());
/// assert!(decode(&empty, &model).is_none());
/// ```
pub fn decode(genome: &Genome, model: &Model) -> Option<Phenome> {
    let graph = DirectedGraph::new(
        genome.genes().connection_triples(),
        model.total_input_count(),
        model.output_count,
    );
    if !graph.has_input_output_path() {
        return None;
    }
    Some(if model.is_acyclic {
        Phenome::Acyclic(AcyclicNetwork::new(AcyclicGraph::new(graph), model.activation))
    } else {
        Phenome::Cyclic(CyclicNetwork::new(
            graph,
            model.activation,
            model.cycles_per_activation,
        ))
    })
}
