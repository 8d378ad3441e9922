use crate::graph::{CycleCheck, DirectedGraph};

/// Node/connection prefix for one depth layer: layer `k` spans node indices
/// `[layer_info[k - 1].end_node_idx, layer_info[k].end_node_idx)`, and the
/// connections whose source lies in layer `k` span the analogous
/// `end_connection_idx` range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayerInfo {
    pub end_node_idx: usize,
    pub end_connection_idx: usize,
}

/// A directed acyclic graph whose node ids have been remapped into depth
/// order.
///
/// Every node is assigned a depth: inputs sit at depth 0 and every other
/// node one past its deepest incoming source. Ids are then reassigned so
/// that nodes are contiguous and ordered by `(depth, original id)`, which
/// makes the connection array (re-sorted by source) a topological order:
/// every edge goes from a lower depth to a strictly higher depth. A phenome
/// can therefore compute all node values in a single pass over
/// [`layer_info`](AcyclicGraph::layer_info).
///
/// Because the remap can move output nodes anywhere past their depth peers,
/// their post-remap positions are recorded in
/// [`output_node_idx`](AcyclicGraph::output_node_idx).
#[derive(Clone, Debug)]
pub struct AcyclicGraph {
    graph: DirectedGraph,
    layer_info: Box<[LayerInfo]>,
    output_node_idx: Box<[usize]>,
}

impl AcyclicGraph {
    /// Builds the depth-ordered form of `graph`.
    ///
    /// The input must already be acyclic; callers are expected to guarantee
    /// this by construction, and a debug assertion enforces it.
    ///
    /// # Examples
    /// ```
    /// use ferroneat::graph::{AcyclicGraph, DirectedGraph};
    ///
    /// let graph = DirectedGraph::new(
    ///     [(0, 3, 1.0), (1, 3, 1.0), (2, 3, 1.0), (2, 4, 1.0)],
    ///     3,
    ///     2,
    /// );
    /// let acyclic = AcyclicGraph::new(graph);
    ///
    /// assert_eq!(acyclic.node_count(), 5);
    /// assert_eq!(acyclic.layer_count(), 2);
    /// ```
    pub fn new(graph: DirectedGraph) -> AcyclicGraph {
        debug_assert!(
            !CycleCheck::new().is_cyclic(&graph),
            "acyclic graph builder invoked on a cyclic graph"
        );

        let node_count = graph.node_count();
        let depths = Self::assign_depths(&graph);

        // Contiguous ids ordered by (depth, original id). Inputs keep their
        // ids: they are the depth-0 nodes with the lowest original ids.
        let mut by_depth: Vec<usize> = (0..node_count).collect();
        by_depth.sort_unstable_by_key(|&n| (depths[n], n));
        let mut remap = vec![0; node_count];
        for (new_id, &old_id) in by_depth.iter().enumerate() {
            remap[old_id] = new_id;
        }

        let remapped = DirectedGraph::new(
            (0..graph.connection_count()).map(|c| {
                (
                    remap[graph.source_ids()[c]],
                    remap[graph.target_ids()[c]],
                    graph.weights()[c],
                )
            }),
            graph.input_count(),
            graph.output_count(),
        );

        let layer_count = depths.iter().copied().max().unwrap_or(0) + 1;
        let mut layer_info = vec![
            LayerInfo {
                end_node_idx: 0,
                end_connection_idx: 0,
            };
            layer_count
        ];
        for &d in &depths {
            layer_info[d].end_node_idx += 1;
        }
        for c in 0..remapped.connection_count() {
            let source_depth = depths[by_depth[remapped.source_ids()[c]]];
            layer_info[source_depth].end_connection_idx += 1;
        }
        for k in 1..layer_count {
            layer_info[k].end_node_idx += layer_info[k - 1].end_node_idx;
            layer_info[k].end_connection_idx += layer_info[k - 1].end_connection_idx;
        }

        let output_node_idx = (0..graph.output_count())
            .map(|o| remap[graph.input_count() + o])
            .collect();

        AcyclicGraph {
            graph: remapped,
            layer_info: layer_info.into(),
            output_node_idx,
        }
    }

    /// Longest-path-from-inputs depth for every node, computed by repeated
    /// relaxation over the connection list until a fixpoint. Terminates in
    /// at most `node_count` passes on an acyclic graph.
    fn assign_depths(graph: &DirectedGraph) -> Vec<usize> {
        let mut depths = vec![0; graph.node_count()];
        loop {
            let mut changed = false;
            for c in 0..graph.connection_count() {
                let source_depth = depths[graph.source_ids()[c]];
                let target = graph.target_ids()[c];
                if depths[target] < source_depth + 1 {
                    depths[target] = source_depth + 1;
                    changed = true;
                }
            }
            if !changed {
                return depths;
            }
        }
    }

    /// The remapped graph; every edge goes from a lower-depth node to a
    /// strictly higher-depth node.
    pub fn graph(&self) -> &DirectedGraph {
        &self.graph
    }

    pub fn layer_info(&self) -> &[LayerInfo] {
        &self.layer_info
    }

    pub fn layer_count(&self) -> usize {
        self.layer_info.len()
    }

    /// Post-remap node index of each output, in output order.
    pub fn output_node_idx(&self) -> &[usize] {
        &self.output_node_idx
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn input_count(&self) -> usize {
        self.graph.input_count()
    }

    pub fn output_count(&self) -> usize {
        self.graph.output_count()
    }

    pub fn connection_count(&self) -> usize {
        self.graph.connection_count()
    }
}
