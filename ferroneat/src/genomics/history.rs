use crate::genomics::Model;
use crate::Innovation;

use ahash::RandomState;

use std::collections::hash_map::{Entry, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// The process-wide id sequences a population draws from.
///
/// Connection innovations and node ids live in separate sequences, seeded
/// past the ranges the initial population reserves: innovation numbers for
/// all possible (bias-or-input, output) initial genes, and node ids for the
/// fixed bias/input/output nodes. Each sequence is an atomic counter, so
/// correctness only depends on single-run monotonicity.
#[derive(Debug)]
pub struct IdSequences {
    connection_innovation: AtomicUsize,
    node_id: AtomicUsize,
    genome_id: AtomicUsize,
}

impl IdSequences {
    pub fn for_model(model: &Model) -> IdSequences {
        IdSequences {
            connection_innovation: AtomicUsize::new(
                model.total_input_count() * model.output_count,
            ),
            node_id: AtomicUsize::new(model.fixed_node_count()),
            genome_id: AtomicUsize::new(0),
        }
    }

    pub fn next_connection_innovation(&self) -> Innovation {
        self.connection_innovation.fetch_add(1, Ordering::Relaxed)
    }

    pub fn next_node_id(&self) -> Innovation {
        self.node_id.fetch_add(1, Ordering::Relaxed)
    }

    pub fn next_genome_id(&self) -> usize {
        self.genome_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Moves every sequence past the ids used by a loaded population, so
    /// freshly minted ids never collide with persisted ones.
    pub fn advance_beyond(&self, genomes: &[crate::genomics::Genome]) {
        for genome in genomes {
            self.genome_id
                .fetch_max(genome.id() + 1, Ordering::Relaxed);
            for gene in genome.genes().iter() {
                self.connection_innovation
                    .fetch_max(gene.innovation + 1, Ordering::Relaxed);
                self.node_id
                    .fetch_max(gene.source.max(gene.target) + 1, Ordering::Relaxed);
            }
        }
    }
}

/// The ids minted for one add-node split: the new hidden node and the two
/// connections that replace the split one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SplitIds {
    pub node_id: Innovation,
    pub input_connection: Innovation,
    pub output_connection: Innovation,
}

/// Per-generation record of structural innovations, so that identical
/// mutations arising in different genomes of the same generation receive
/// identical ids.
///
/// Added connections are keyed by their `(source, target)` endpoints;
/// add-node splits are keyed by the endpoints of the split connection. The
/// maps are lock-protected so implementations that parallelise reproduction
/// still observe one id per key; the cache is cleared at the start of every
/// generation.
#[derive(Debug, Default)]
pub struct InnovationCache {
    connections: Mutex<HashMap<(Innovation, Innovation), Innovation, RandomState>>,
    splits: Mutex<HashMap<(Innovation, Innovation), SplitIds, RandomState>>,
}

impl InnovationCache {
    pub fn new() -> InnovationCache {
        InnovationCache::default()
    }

    /// Forgets the previous generation's innovations.
    pub fn clear(&self) {
        self.connections.lock().unwrap().clear();
        self.splits.lock().unwrap().clear();
    }

    /// Returns the innovation number for an added `(source, target)`
    /// connection, allocating from `ids` the first time the pair is seen
    /// this generation.
    pub fn connection_innovation(
        &self,
        source: Innovation,
        target: Innovation,
        ids: &IdSequences,
    ) -> Innovation {
        match self.connections.lock().unwrap().entry((source, target)) {
            Entry::Occupied(entry) => *entry.get(),
            Entry::Vacant(entry) => *entry.insert(ids.next_connection_innovation()),
        }
    }

    /// Returns the id triple for splitting the connection
    /// `(source, target)`, allocating all three ids the first time the
    /// split is seen this generation.
    pub fn split_ids(
        &self,
        source: Innovation,
        target: Innovation,
        ids: &IdSequences,
    ) -> SplitIds {
        match self.splits.lock().unwrap().entry((source, target)) {
            Entry::Occupied(entry) => *entry.get(),
            Entry::Vacant(entry) => *entry.insert(SplitIds {
                node_id: ids.next_node_id(),
                input_connection: ids.next_connection_innovation(),
                output_connection: ids.next_connection_innovation(),
            }),
        }
    }

    /// Allocates a split id triple without touching the cache. Used when
    /// the cached triple for a pair refers to a node the mutating genome
    /// already contains, which would otherwise duplicate ids within one
    /// genome.
    pub fn fresh_split_ids(&self, ids: &IdSequences) -> SplitIds {
        SplitIds {
            node_id: ids.next_node_id(),
            input_connection: ids.next_connection_innovation(),
            output_connection: ids.next_connection_innovation(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::networks::Activation;

    fn sequences() -> IdSequences {
        IdSequences::for_model(&Model::acyclic(2, 1, Activation::LeakyRelu, 1.0))
    }

    #[test]
    fn sequences_start_past_reserved_ranges() {
        let ids = sequences();
        // 3 input-side nodes x 1 output = 3 reserved innovations; 4 fixed nodes.
        assert_eq!(ids.next_connection_innovation(), 3);
        assert_eq!(ids.next_node_id(), 4);
        assert_eq!(ids.next_genome_id(), 0);
    }

    #[test]
    fn identical_connection_mutations_share_an_id() {
        let ids = sequences();
        let cache = InnovationCache::new();
        let a = cache.connection_innovation(1, 3, &ids);
        let b = cache.connection_innovation(1, 3, &ids);
        let c = cache.connection_innovation(3, 1, &ids);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn identical_splits_share_ids() {
        let ids = sequences();
        let cache = InnovationCache::new();
        let first = cache.split_ids(0, 3, &ids);
        let again = cache.split_ids(0, 3, &ids);
        assert_eq!(first, again);
        assert_ne!(first.input_connection, first.output_connection);
    }

    #[test]
    fn clear_starts_a_new_generation() {
        let ids = sequences();
        let cache = InnovationCache::new();
        let before = cache.connection_innovation(1, 3, &ids);
        cache.clear();
        let after = cache.connection_innovation(1, 3, &ids);
        assert_ne!(before, after);
    }
}
