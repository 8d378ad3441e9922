use crate::networks::Activation;
use crate::Innovation;

use serde::{Deserialize, Serialize};

use std::ops::Range;

/// Population-wide constants fixed for the lifetime of a run.
///
/// Every genome in a population shares one model; the decoder, the
/// reproduction operators and the compatibility check for loaded
/// populations all consult it. `input_count` and `output_count` are the
/// counts the evaluation scheme declares; the bias node is additional, so
/// a phenome's input buffer has `input_count + 1` slots with the bias at
/// index 0.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub input_count: usize,
    pub output_count: usize,
    pub is_acyclic: bool,
    /// Activation steps per [`activate`](crate::networks::BlackBox::activate)
    /// call on cyclic networks; unused for acyclic models.
    pub cycles_per_activation: usize,
    pub activation: Activation,
    /// Connection weights are clamped to `±weight_scale` everywhere.
    pub weight_scale: f64,
}

impl Model {
    /// An acyclic (feed-forward) model.
    pub fn acyclic(
        input_count: usize,
        output_count: usize,
        activation: Activation,
        weight_scale: f64,
    ) -> Model {
        assert!(output_count >= 1, "model requires at least one output");
        Model {
            input_count,
            output_count,
            is_acyclic: true,
            cycles_per_activation: 1,
            activation,
            weight_scale,
        }
    }

    /// A cyclic (recurrent) model activated `cycles_per_activation` times
    /// per step.
    pub fn cyclic(
        input_count: usize,
        output_count: usize,
        cycles_per_activation: usize,
        activation: Activation,
        weight_scale: f64,
    ) -> Model {
        assert!(output_count >= 1, "model requires at least one output");
        assert!(cycles_per_activation >= 1, "at least one cycle per activation");
        Model {
            input_count,
            output_count,
            is_acyclic: false,
            cycles_per_activation,
            activation,
            weight_scale,
        }
    }

    /// Input-side node count including the bias node.
    pub fn total_input_count(&self) -> usize {
        self.input_count + 1
    }

    /// Count of the always-present nodes: bias, inputs and outputs.
    /// Hidden-node ids start here.
    pub fn fixed_node_count(&self) -> usize {
        self.total_input_count() + self.output_count
    }

    /// The id range of the output nodes.
    pub fn output_ids(&self) -> Range<Innovation> {
        self.total_input_count()..self.fixed_node_count()
    }
}
