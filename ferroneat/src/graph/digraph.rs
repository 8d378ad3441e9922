use crate::Innovation;

use ahash::RandomState;

use std::collections::HashMap;
use std::ops::Range;

/// A directed graph in compact connection-array form.
///
/// Connections are held in three parallel arrays (`source_ids`, `target_ids`,
/// `weights`) sorted by `(source, target)`, so a node's out-edges occupy a
/// contiguous range. Input nodes occupy ids `0..input_count`, output nodes
/// `input_count..input_count + output_count`, and hidden-node ids (which may
/// be arbitrarily sparse in the genome) are compacted onto
/// `input_count + output_count..node_count` in ascending order of their
/// original id.
#[derive(Clone, Debug, PartialEq)]
pub struct DirectedGraph {
    input_count: usize,
    output_count: usize,
    node_count: usize,
    source_ids: Box<[usize]>,
    target_ids: Box<[usize]>,
    weights: Box<[f64]>,
    /// `first_connection_by_source[n]..first_connection_by_source[n + 1]`
    /// is the out-edge range of node `n`.
    first_connection_by_source: Box<[usize]>,
    /// Original (pre-compaction) hidden node ids, ascending.
    hidden_ids: Box<[Innovation]>,
}

impl DirectedGraph {
    /// Builds a graph from `(source, target, weight)` triples.
    ///
    /// # Examples
    /// ```
    /// use ferroneat::graph::DirectedGraph;
    ///
    /// let graph = DirectedGraph::new([(0, 3, 1.0), (1, 3, -1.0), (2, 4, 0.5)], 3, 2);
    ///
    /// assert_eq!(graph.node_count(), 5);
    /// assert_eq!(graph.connection_count(), 3);
    /// assert_eq!(graph.outgoing(0), 0..1);
    /// ```
    pub fn new(
        connections: impl IntoIterator<Item = (Innovation, Innovation, f64)>,
        input_count: usize,
        output_count: usize,
    ) -> DirectedGraph {
        let fixed_count = input_count + output_count;
        let mut conns: Vec<(Innovation, Innovation, f64)> = connections.into_iter().collect();

        let mut hidden_ids: Vec<Innovation> = conns
            .iter()
            .flat_map(|&(s, t, _)| [s, t])
            .filter(|&id| id >= fixed_count)
            .collect();
        hidden_ids.sort_unstable();
        hidden_ids.dedup();

        let compaction: HashMap<Innovation, usize, RandomState> = hidden_ids
            .iter()
            .enumerate()
            .map(|(i, &id)| (id, fixed_count + i))
            .collect();
        let compact = |id: Innovation| -> usize {
            if id < fixed_count {
                id
            } else {
                compaction[&id]
            }
        };

        for conn in &mut conns {
            conn.0 = compact(conn.0);
            conn.1 = compact(conn.1);
        }
        conns.sort_unstable_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));

        let node_count = fixed_count + hidden_ids.len();
        let mut first_connection_by_source = vec![0; node_count + 1];
        for &(s, _, _) in &conns {
            first_connection_by_source[s + 1] += 1;
        }
        for n in 0..node_count {
            first_connection_by_source[n + 1] += first_connection_by_source[n];
        }

        let mut source_ids = Vec::with_capacity(conns.len());
        let mut target_ids = Vec::with_capacity(conns.len());
        let mut weights = Vec::with_capacity(conns.len());
        for (s, t, w) in conns {
            source_ids.push(s);
            target_ids.push(t);
            weights.push(w);
        }

        DirectedGraph {
            input_count,
            output_count,
            node_count,
            source_ids: source_ids.into(),
            target_ids: target_ids.into(),
            weights: weights.into(),
            first_connection_by_source: first_connection_by_source.into(),
            hidden_ids: hidden_ids.into(),
        }
    }

    pub fn input_count(&self) -> usize {
        self.input_count
    }

    pub fn output_count(&self) -> usize {
        self.output_count
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    pub fn hidden_count(&self) -> usize {
        self.hidden_ids.len()
    }

    pub fn connection_count(&self) -> usize {
        self.source_ids.len()
    }

    pub fn source_ids(&self) -> &[usize] {
        &self.source_ids
    }

    pub fn target_ids(&self) -> &[usize] {
        &self.target_ids
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Returns the connection-array range of `node`'s out-edges.
    pub fn outgoing(&self, node: usize) -> Range<usize> {
        self.first_connection_by_source[node]..self.first_connection_by_source[node + 1]
    }

    /// Maps an original node id to its compacted id, or `None` if the id is
    /// neither fixed (input/output) nor present in any connection.
    pub fn compacted_id(&self, id: Innovation) -> Option<usize> {
        let fixed_count = self.input_count + self.output_count;
        if id < fixed_count {
            Some(id)
        } else {
            self.hidden_ids
                .binary_search(&id)
                .ok()
                .map(|i| fixed_count + i)
        }
    }

    /// Tests whether at least one output node is reachable from at least one
    /// input node. Genomes whose graphs fail this test are non-viable and
    /// cannot be decoded into a phenome.
    pub fn has_input_output_path(&self) -> bool {
        let output_range = self.input_count..self.input_count + self.output_count;
        let mut visited = vec![false; self.node_count];
        let mut stack: Vec<usize> = (0..self.input_count).collect();
        for n in 0..self.input_count {
            visited[n] = true;
        }
        while let Some(node) = stack.pop() {
            for c in self.outgoing(node) {
                let target = self.target_ids[c];
                if output_range.contains(&target) {
                    return true;
                }
                if !visited[target] {
                    visited[target] = true;
                    stack.push(target);
                }
            }
        }
        false
    }
}
