use crate::genomics::{ConnectionGene, ConnectionGenes, Model};
use crate::graph::{CycleCheck, DirectedGraph};
use crate::Innovation;

use ahash::RandomState;

use std::collections::HashSet;

/// Accumulates proposed genes for a crossover child, one at a time.
///
/// The builder tracks the set of `(source, target)` pairs already present so
/// duplicates are rejected (the same endpoints can carry different
/// innovation numbers when they were created in different generations) and,
/// on acyclic models, enough topology to run the proposed-edge cycle test.
///
/// The primary parent's complete topology is registered up front via
/// [`begin`](GeneListBuilder::begin). Primary genes are always mutually
/// consistent, so only secondary-parent genes are subjected to the duplicate
/// and cycle tests, and a secondary gene can never be admitted that a
/// later-merged primary gene would conflict with.
///
/// One builder is cleared and reused across calls to amortise allocation.
#[derive(Debug, Default)]
pub struct GeneListBuilder {
    genes: Vec<ConnectionGene>,
    pairs: HashSet<(Innovation, Innovation), RandomState>,
    /// All registered `(source, target)` pairs, backing the cycle test.
    topology: Vec<(Innovation, Innovation)>,
    check: CycleCheck,
    check_cycles: bool,
    input_count: usize,
    output_count: usize,
}

impl GeneListBuilder {
    pub fn new() -> GeneListBuilder {
        GeneListBuilder::default()
    }

    /// Starts a new child, pre-registering the primary parent's topology.
    pub fn begin(&mut self, model: &Model, primary: &ConnectionGenes) {
        self.genes.clear();
        self.pairs.clear();
        self.topology.clear();
        self.check_cycles = model.is_acyclic;
        self.input_count = model.total_input_count();
        self.output_count = model.output_count;
        for gene in primary {
            self.pairs.insert((gene.source, gene.target));
            self.topology.push((gene.source, gene.target));
        }
    }

    /// Admits a gene whose endpoints come from the primary parent. No
    /// checks are needed: the pair was registered by
    /// [`begin`](GeneListBuilder::begin).
    pub fn add_primary(&mut self, gene: ConnectionGene) {
        debug_assert!(self.pairs.contains(&(gene.source, gene.target)));
        self.genes.push(gene);
    }

    /// Offers a gene present only on the secondary parent. Returns whether
    /// it was admitted: duplicated endpoints are rejected, as is any gene
    /// that would close a cycle on an acyclic model.
    pub fn try_add_secondary(&mut self, gene: ConnectionGene) -> bool {
        let pair = (gene.source, gene.target);
        if self.pairs.contains(&pair) {
            return false;
        }
        if self.check_cycles && self.creates_cycle(gene.source, gene.target) {
            return false;
        }
        self.pairs.insert(pair);
        self.topology.push(pair);
        self.genes.push(gene);
        true
    }

    /// Finishes the child: the accumulated genes, sorted by innovation
    /// number.
    pub fn finish(&mut self) -> ConnectionGenes {
        ConnectionGenes::from_vec(std::mem::take(&mut self.genes))
    }

    fn creates_cycle(&mut self, source: Innovation, target: Innovation) -> bool {
        let graph = DirectedGraph::new(
            self.topology.iter().map(|&(s, t)| (s, t, 0.0)),
            self.input_count,
            self.output_count,
        );
        match (graph.compacted_id(source), graph.compacted_id(target)) {
            (Some(s), Some(t)) => self.check.creates_cycle(&graph, s, t),
            // An endpoint absent from the accumulated topology cannot lie
            // on any existing path.
            _ => false,
        }
    }
}
