use crate::graph::DirectedGraph;
use crate::networks::{Activation, BlackBox};

use std::mem;

/// A recurrent network over an arbitrary directed graph.
///
/// Node values are double-buffered: each activation step computes every
/// node's next value from the *previous* step's values, so signal
/// propagation is synchronous and independent of connection order. One
/// [`activate`](BlackBox::activate) call runs `cycles_per_activation`
/// steps.
#[derive(Clone, Debug)]
pub struct CyclicNetwork {
    graph: DirectedGraph,
    activation: Activation,
    cycles_per_activation: usize,
    inputs: Box<[f64]>,
    outputs: Box<[f64]>,
    current: Box<[f64]>,
    next: Box<[f64]>,
}

impl CyclicNetwork {
    pub fn new(
        graph: DirectedGraph,
        activation: Activation,
        cycles_per_activation: usize,
    ) -> CyclicNetwork {
        CyclicNetwork {
            inputs: vec![0.0; graph.input_count()].into(),
            outputs: vec![0.0; graph.output_count()].into(),
            current: vec![0.0; graph.node_count()].into(),
            next: vec![0.0; graph.node_count()].into(),
            graph,
            activation,
            cycles_per_activation,
        }
    }
}

impl BlackBox for CyclicNetwork {
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
        for _ in 0..self.cycles_per_activation {
            self.current[..input_count].copy_from_slice(&self.inputs);

            self.next.fill(0.0);
            for c in 0..self.graph.connection_count() {
                let source = self.graph.source_ids()[c];
                let target = self.graph.target_ids()[c];
                self.next[target] += self.graph.weights()[c] * self.current[source];
            }
            for node in input_count..self.graph.node_count() {
                self.next[node] = self.activation.apply(self.next[node]);
            }
            mem::swap(&mut self.current, &mut self.next);
        }

        // Input and output ids are untouched by hidden-id compaction, so
        // the outputs sit contiguously after the inputs.
        let output_range = input_count..input_count + self.graph.output_count();
        self.outputs.copy_from_slice(&self.current[output_range]);
    }

    fn reset(&mut self) {
        self.current.fill(0.0);
        self.next.fill(0.0);
        self.outputs.fill(0.0);
    }
}
