use crate::graph::AcyclicGraph;
use crate::networks::{Activation, BlackBox};

/// A feed-forward network over a depth-ordered acyclic graph.
///
/// Because the underlying graph's connection array is grouped by source
/// layer, a single pass suffices: each layer's connections are accumulated
/// into their targets' pre-activation registers, then the next layer's
/// nodes are activated. One multiply-add per connection, one activation per
/// non-input node.
#[derive(Clone, Debug)]
pub struct AcyclicNetwork {
    graph: AcyclicGraph,
    activation: Activation,
    inputs: Box<[f64]>,
    outputs: Box<[f64]>,
    /// Per-node value register: pre-activation sum while a node's layer is
    /// pending, activation level afterwards.
    values: Box<[f64]>,
}

impl AcyclicNetwork {
    pub fn new(graph: AcyclicGraph, activation: Activation) -> AcyclicNetwork {
        AcyclicNetwork {
            inputs: vec![0.0; graph.input_count()].into(),
            outputs: vec![0.0; graph.output_count()].into(),
            values: vec![0.0; graph.node_count()].into(),
            graph,
            activation,
        }
    }
}

impl BlackBox for AcyclicNetwork {
    fn input_count(&self) -> usize {
        self.graph.input_count()
    }

    fn output_count(&self) -> usize {
        self.graph.output_count()
    }

    fn inputs_mut(&mut self) -> &mut [f64] {
        &mut self.inputs
    }

    fn outputs(&self) -> &[f64] {
        &self.outputs
    }

    fn activate(&mut self) {
        let input_count = self.graph.input_count();
        self.values[..input_count].copy_from_slice(&self.inputs);
        for value in &mut self.values[input_count..] {
            *value = 0.0;
        }

        let graph = self.graph.graph();
        let layers = self.graph.layer_info();
        let mut connection = 0;
        for layer in 0..layers.len().saturating_sub(1) {
            while connection < layers[layer].end_connection_idx {
                let source = graph.source_ids()[connection];
                let target = graph.target_ids()[connection];
                self.values[target] += graph.weights()[connection] * self.values[source];
                connection += 1;
            }
            for node in layers[layer].end_node_idx..layers[layer + 1].end_node_idx {
                self.values[node] = self.activation.apply(self.values[node]);
            }
        }

        for (slot, &node) in self.outputs.iter_mut().zip(self.graph.output_node_idx()) {
            *slot = self.values[node];
        }
    }

    fn reset(&mut self) {
        self.values.fill(0.0);
        self.outputs.fill(0.0);
    }
}
