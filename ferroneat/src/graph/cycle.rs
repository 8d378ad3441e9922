use crate::graph::DirectedGraph;

/// A bitmap sized to the next power of two at or above the node count,
/// cleared wholesale between traversals.
#[derive(Clone, Debug, Default)]
struct Bitmap {
    words: Vec<u64>,
}

impl Bitmap {
    fn reset(&mut self, bit_count: usize) {
        let words = bit_count.next_power_of_two().div_ceil(64).max(1);
        self.words.clear();
        self.words.resize(words, 0);
    }

    fn set(&mut self, bit: usize) {
        self.words[bit / 64] |= 1 << (bit % 64);
    }

    fn unset(&mut self, bit: usize) {
        self.words[bit / 64] &= !(1 << (bit % 64));
    }

    fn test(&self, bit: usize) -> bool {
        self.words[bit / 64] & (1 << (bit % 64)) != 0
    }
}

/// Depth-first cycle testing over a [`DirectedGraph`].
///
/// The traversal stack and bitmaps are owned by the instance and reused
/// across calls, so a single instance can serve an arbitrary number of tests
/// without reallocation. Instances are not meant to be shared: callers that
/// test from several threads allocate one instance per thread (the `&mut`
/// receivers make any other arrangement fail to compile).
#[derive(Clone, Debug, Default)]
pub struct CycleCheck {
    /// DFS frames; each frame carries a cursor into the connection array.
    stack: Vec<(usize, usize)>,
    ancestors: Bitmap,
    visited: Bitmap,
}

impl CycleCheck {
    pub fn new() -> CycleCheck {
        CycleCheck::default()
    }

    /// Tests whether the graph contains any cycle, returning on the first
    /// one found.
    ///
    /// # Examples
    /// ```
    /// use ferroneat::graph::{CycleCheck, DirectedGraph};
    ///
    /// let mut check = CycleCheck::new();
    ///
    /// let dag = DirectedGraph::new([(0, 2, 1.0), (2, 1, 1.0)], 1, 1);
    /// assert!(!check.is_cyclic(&dag));
    ///
    /// let looped = DirectedGraph::new([(0, 2, 1.0), (2, 3, 1.0), (3, 2, 1.0)], 1, 1);
    /// assert!(check.is_cyclic(&looped));
    /// ```
    pub fn is_cyclic(&mut self, graph: &DirectedGraph) -> bool {
        self.ancestors.reset(graph.node_count());
        self.visited.reset(graph.node_count());
        self.stack.clear();

        for start in 0..graph.node_count() {
            if self.visited.test(start) {
                continue;
            }
            if self.dfs_from(graph, start) {
                return true;
            }
        }
        false
    }

    /// DFS from `start`, marking nodes on the current path in `ancestors`
    /// and fully explored nodes in `visited`. An edge into an ancestor is a
    /// cycle.
    fn dfs_from(&mut self, graph: &DirectedGraph, start: usize) -> bool {
        self.ancestors.set(start);
        self.stack.push((start, graph.outgoing(start).start));

        while let Some((node, cursor)) = self.stack.last_mut() {
            let node = *node;
            if *cursor == graph.outgoing(node).end {
                self.ancestors.unset(node);
                self.visited.set(node);
                self.stack.pop();
                continue;
            }
            let target = graph.target_ids()[*cursor];
            *cursor += 1;

            if self.ancestors.test(target) {
                self.stack.clear();
                return true;
            }
            if !self.visited.test(target) {
                self.ancestors.set(target);
                self.stack.push((target, graph.outgoing(target).start));
            }
        }
        false
    }

    /// Tests whether adding the edge `(source, target)` to an acyclic graph
    /// would close a cycle. Node ids are in the graph's compacted space.
    ///
    /// A self-loop is cyclic by definition; otherwise the edge closes a
    /// cycle exactly when `source` is reachable from `target` along the
    /// existing connections.
    pub fn creates_cycle(&mut self, graph: &DirectedGraph, source: usize, target: usize) -> bool {
        if source == target {
            return true;
        }
        self.path_exists(graph, target, source)
    }

    fn path_exists(&mut self, graph: &DirectedGraph, from: usize, to: usize) -> bool {
        self.visited.reset(graph.node_count());
        self.visited.set(from);
        self.stack.clear();
        self.stack.push((from, graph.outgoing(from).start));

        while let Some((node, cursor)) = self.stack.last_mut() {
            let node = *node;
            if *cursor == graph.outgoing(node).end {
                self.stack.pop();
                continue;
            }
            let target = graph.target_ids()[*cursor];
            *cursor += 1;

            if target == to {
                self.stack.clear();
                return true;
            }
            if !self.visited.test(target) {
                self.visited.set(target);
                self.stack.push((target, graph.outgoing(target).start));
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diamond() -> DirectedGraph {
        // 0 -> 3 -> 2, 0 -> 4 -> 2, with node 1 a second (unused) input.
        DirectedGraph::new(
            [(0, 3, 1.0), (0, 4, 1.0), (3, 2, 1.0), (4, 2, 1.0)],
            2,
            1,
        )
    }

    #[test]
    fn acyclic_graph_passes() {
        assert!(!CycleCheck::new().is_cyclic(&diamond()));
    }

    #[test]
    fn detects_two_node_cycle() {
        let graph = DirectedGraph::new([(0, 3, 1.0), (3, 4, 1.0), (4, 3, 1.0), (3, 2, 1.0)], 2, 1);
        assert!(CycleCheck::new().is_cyclic(&graph));
    }

    #[test]
    fn detects_cycle_unreachable_from_inputs() {
        // The cycle 5 -> 6 -> 5 has no incoming path from any input.
        let graph = DirectedGraph::new([(0, 2, 1.0), (5, 6, 1.0), (6, 5, 1.0)], 2, 1);
        assert!(CycleCheck::new().is_cyclic(&graph));
    }

    #[test]
    fn self_loop_rejected_immediately() {
        let graph = diamond();
        assert!(CycleCheck::new().creates_cycle(&graph, 3, 3));
    }

    #[test]
    fn proposed_back_edge_rejected() {
        let graph = diamond();
        let mut check = CycleCheck::new();
        // 2 is downstream of 3, so (2, 3) would close a cycle...
        assert!(check.creates_cycle(&graph, 2, 3));
        // ...but (3, 4) merely adds a cross edge.
        assert!(!check.creates_cycle(&graph, 3, 4));
    }

    #[test]
    fn instance_reusable_across_results() {
        let mut check = CycleCheck::new();
        let graph = diamond();
        for _ in 0..3 {
            assert!(check.creates_cycle(&graph, 2, 0));
            assert!(!check.creates_cycle(&graph, 1, 2));
        }
    }
}
