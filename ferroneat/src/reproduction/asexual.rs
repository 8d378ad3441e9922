use crate::genomics::{
    ConnectionGene, ConnectionGenes, Genome, IdSequences, InnovationCache, Model,
};
use crate::graph::{CycleCheck, DirectedGraph};
use crate::reproduction::{AsexualReproductionSettings, WeightMutationScheme};
use crate::Innovation;

use rand::distributions::WeightedIndex;
use rand::prelude::{Distribution, Rng, SliceRandom};

/// Attempts made by add-connection before the mutation is abandoned.
const ADD_CONNECTION_ATTEMPTS: usize = 5;

/// The four asexual mutation operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MutationOp {
    ConnectionWeights,
    AddNode,
    AddConnection,
    DeleteConnection,
}

/// A probability distribution over [`MutationOp`]s.
///
/// Complexity regulation swaps between two of these: the configured
/// distribution while complexifying, and a reweighted one while simplifying
/// in which add-node is forbidden and its probability mass moves onto
/// delete-connection.
#[derive(Clone, Debug)]
pub struct OperatorDistribution {
    index: WeightedIndex<f64>,
}

const OPS: [MutationOp; 4] = [
    MutationOp::ConnectionWeights,
    MutationOp::AddNode,
    MutationOp::AddConnection,
    MutationOp::DeleteConnection,
];

impl OperatorDistribution {
    /// The distribution exactly as configured.
    pub fn complexifying(settings: &AsexualReproductionSettings) -> OperatorDistribution {
        OperatorDistribution {
            index: WeightedIndex::new([
                settings.connection_weight_probability,
                settings.add_node_probability,
                settings.add_connection_probability,
                settings.delete_connection_probability,
            ])
            .expect("validated settings always form a distribution"),
        }
    }

    /// The simplify-mode reweighting: no structural growth through
    /// add-node; deletions favoured instead.
    pub fn simplifying(settings: &AsexualReproductionSettings) -> OperatorDistribution {
        OperatorDistribution {
            index: WeightedIndex::new([
                settings.connection_weight_probability,
                0.0,
                settings.add_connection_probability,
                settings.delete_connection_probability + settings.add_node_probability,
            ])
            .expect("validated settings always form a distribution"),
        }
    }

    pub fn sample(&self, rng: &mut impl Rng) -> MutationOp {
        OPS[self.index.sample(rng)]
    }
}

/// Asexual reproduction: one mutation per child.
///
/// The operators are best-effort. When add-connection exhausts its retry
/// budget, or a structural operator has nothing to act on (an empty gene
/// array), the mutation is abandoned and the child is an unmutated copy of
/// the parent under a fresh genome id.
#[derive(Debug)]
pub struct AsexualReproduction {
    weight_scheme: WeightMutationScheme,
    cycle_check: CycleCheck,
}

impl AsexualReproduction {
    pub fn new(weight_scheme: WeightMutationScheme) -> AsexualReproduction {
        AsexualReproduction {
            weight_scheme,
            cycle_check: CycleCheck::new(),
        }
    }

    /// Produces one child from `parent`, applying a mutation drawn from
    /// `operators`.
    #[allow(clippy::too_many_arguments)]
    pub fn create_child(
        &mut self,
        parent: &Genome,
        operators: &OperatorDistribution,
        model: &Model,
        ids: &IdSequences,
        cache: &InnovationCache,
        generation: u32,
        rng: &mut impl Rng,
    ) -> Genome {
        let genes = match operators.sample(rng) {
            MutationOp::ConnectionWeights => self.mutate_weights(parent, model, rng),
            MutationOp::AddNode => self.add_node(parent, ids, cache, rng),
            MutationOp::AddConnection => self.add_connection(parent, model, ids, cache, rng),
            MutationOp::DeleteConnection => self.delete_connection(parent, rng),
        };
        Genome::new(ids.next_genome_id(), generation, genes)
    }

    fn mutate_weights(
        &mut self,
        parent: &Genome,
        model: &Model,
        rng: &mut impl Rng,
    ) -> ConnectionGenes {
        let mut genes = parent.genes().as_slice().to_vec();
        self.weight_scheme.mutate(&mut genes, model.weight_scale, rng);
        ConnectionGenes::from_sorted_vec(genes)
    }

    /// Splits a random connection `(s, t, w)` into `(s, h, 1.0)` and
    /// `(h, t, w)` around a new hidden node `h`. The id triple comes from
    /// the per-generation cache, so simultaneous splits of the same
    /// connection in different genomes agree; a fresh triple is allocated
    /// instead when the cached node already exists in this genome.
    fn add_node(
        &mut self,
        parent: &Genome,
        ids: &IdSequences,
        cache: &InnovationCache,
        rng: &mut impl Rng,
    ) -> ConnectionGenes {
        let parent_genes = parent.genes().as_slice();
        let split = match parent_genes.choose(rng) {
            Some(gene) => *gene,
            None => return parent.genes().clone(),
        };

        let mut split_ids = cache.split_ids(split.source, split.target, ids);
        let node_exists = parent_genes
            .iter()
            .any(|g| g.source == split_ids.node_id || g.target == split_ids.node_id);
        if node_exists {
            split_ids = cache.fresh_split_ids(ids);
        }

        let mut genes: Vec<ConnectionGene> = parent_genes
            .iter()
            .filter(|g| g.innovation != split.innovation)
            .copied()
            .collect();
        genes.push(ConnectionGene {
            innovation: split_ids.input_connection,
            source: split.source,
            target: split_ids.node_id,
            weight: 1.0,
        });
        genes.push(ConnectionGene {
            innovation: split_ids.output_connection,
            source: split_ids.node_id,
            target: split.target,
            weight: split.weight,
        });
        ConnectionGenes::from_vec(genes)
    }

    /// Adds a connection between a random ordered node pair. Pairs that
    /// already exist, target the bias/input range, or (on acyclic models)
    /// would close a cycle are re-drawn up to the attempt bound.
    fn add_connection(
        &mut self,
        parent: &Genome,
        model: &Model,
        ids: &IdSequences,
        cache: &InnovationCache,
        rng: &mut impl Rng,
    ) -> ConnectionGenes {
        let nodes = parent.node_ids(model);
        let graph = model.is_acyclic.then(|| {
            DirectedGraph::new(
                parent.genes().connection_triples(),
                model.total_input_count(),
                model.output_count,
            )
        });

        if nodes.last().map_or(true, |&id| id < model.total_input_count()) {
            // No legal targets: the node set is bias/input only.
            return parent.genes().clone();
        }
        for _ in 0..ADD_CONNECTION_ATTEMPTS {
            let (source, target) = match self.sample_pair(&nodes, model, rng) {
                Some(pair) => pair,
                None => continue, // drew source == target
            };
            if parent.genes().contains_endpoints(source, target) {
                continue;
            }
            if let Some(graph) = &graph {
                // compacted_id is total for this genome's node set.
                let s = graph.compacted_id(source).unwrap();
                let t = graph.compacted_id(target).unwrap();
                if self.cycle_check.creates_cycle(graph, s, t) {
                    continue;
                }
            }

            let mut genes = parent.genes().as_slice().to_vec();
            genes.push(ConnectionGene {
                innovation: cache.connection_innovation(source, target, ids),
                source,
                target,
                weight: rng.gen_range(-model.weight_scale..=model.weight_scale),
            });
            return ConnectionGenes::from_vec(genes);
        }
        parent.genes().clone()
    }

    /// Draws an ordered `(source, target)` pair: the source may be any
    /// node, the target any node past the bias/input range. Returns `None`
    /// when the draw lands on `source == target`.
    fn sample_pair(
        &self,
        nodes: &[Innovation],
        model: &Model,
        rng: &mut impl Rng,
    ) -> Option<(Innovation, Innovation)> {
        let first_target = nodes.partition_point(|&id| id < model.total_input_count());
        let source = *nodes.choose(rng)?;
        let target = nodes[rng.gen_range(first_target..nodes.len())];
        (source != target).then_some((source, target))
    }

    fn delete_connection(&mut self, parent: &Genome, rng: &mut impl Rng) -> ConnectionGenes {
        let parent_genes = parent.genes().as_slice();
        if parent_genes.is_empty() {
            return parent.genes().clone();
        }
        let victim = rng.gen_range(0..parent_genes.len());
        let mut genes = parent_genes.to_vec();
        genes.remove(victim);
        ConnectionGenes::from_sorted_vec(genes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::networks::Activation;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn model() -> Model {
        Model::acyclic(2, 1, Activation::LeakyRelu, 5.0)
    }

    fn parent(model: &Model) -> Genome {
        // Bias 0 and inputs 1-2 fully connected to output 3.
        let genes = ConnectionGenes::from_vec(
            (0..3)
                .map(|source| ConnectionGene {
                    innovation: source,
                    source,
                    target: 3,
                    weight: 1.0,
                })
                .collect(),
        );
        Genome::new(0, 0, genes)
    }

    fn fixture() -> (Model, Genome, IdSequences, InnovationCache, ChaCha8Rng) {
        let model = model();
        let parent = parent(&model);
        let ids = IdSequences::for_model(&model);
        (model, parent, ids, InnovationCache::new(), ChaCha8Rng::seed_from_u64(99))
    }

    fn only(op: MutationOp) -> OperatorDistribution {
        let settings = AsexualReproductionSettings {
            connection_weight_probability: (op == MutationOp::ConnectionWeights) as u8 as f64,
            add_node_probability: (op == MutationOp::AddNode) as u8 as f64,
            add_connection_probability: (op == MutationOp::AddConnection) as u8 as f64,
            delete_connection_probability: (op == MutationOp::DeleteConnection) as u8 as f64,
        };
        OperatorDistribution::complexifying(&settings)
    }

    #[test]
    fn weight_mutation_preserves_structure() {
        let (model, parent, ids, cache, mut rng) = fixture();
        let mut asexual = AsexualReproduction::new(WeightMutationScheme::default_scheme());
        let child = asexual.create_child(
            &parent,
            &only(MutationOp::ConnectionWeights),
            &model,
            &ids,
            &cache,
            1,
            &mut rng,
        );

        assert_eq!(child.genes().len(), parent.genes().len());
        assert_ne!(child.id(), parent.id());
        assert_eq!(child.birth_generation(), 1);
        for (a, b) in parent.genes().iter().zip(child.genes().iter()) {
            assert_eq!(a.innovation, b.innovation);
        }
    }

    #[test]
    fn add_node_splits_a_connection() {
        let (model, parent, ids, cache, mut rng) = fixture();
        let mut asexual = AsexualReproduction::new(WeightMutationScheme::default_scheme());
        let child = asexual.create_child(
            &parent,
            &only(MutationOp::AddNode),
            &model,
            &ids,
            &cache,
            1,
            &mut rng,
        );

        assert_eq!(child.genes().len(), parent.genes().len() + 1);
        // Exactly one new hidden node, bridged by a 1.0-weighted input arc.
        let hidden: Vec<_> = child
            .node_ids(&model)
            .into_iter()
            .filter(|&id| id >= model.fixed_node_count())
            .collect();
        assert_eq!(hidden.len(), 1);
        let incoming: Vec<_> = child
            .genes()
            .iter()
            .filter(|g| g.target == hidden[0])
            .collect();
        assert_eq!(incoming.len(), 1);
        assert_eq!(incoming[0].weight, 1.0);
    }

    #[test]
    fn simultaneous_splits_share_innovations() {
        let (model, parent, ids, cache, mut rng) = fixture();
        let mut asexual = AsexualReproduction::new(WeightMutationScheme::default_scheme());
        let ops = only(MutationOp::AddNode);
        let a = asexual.create_child(&parent, &ops, &model, &ids, &cache, 1, &mut rng);
        let mut rng2 = ChaCha8Rng::seed_from_u64(99);
        let b = asexual.create_child(&parent, &ops, &model, &ids, &cache, 1, &mut rng2);

        // Same split drawn from the same seed: identical gene arrays.
        assert_eq!(a.genes(), b.genes());
    }

    #[test]
    fn add_connection_respects_acyclicity() {
        let (model, parent, ids, cache, mut rng) = fixture();
        let mut asexual = AsexualReproduction::new(WeightMutationScheme::default_scheme());
        let ops = only(MutationOp::AddConnection);
        for _ in 0..30 {
            let child = asexual.create_child(&parent, &ops, &model, &ids, &cache, 1, &mut rng);
            let graph = DirectedGraph::new(
                child.genes().connection_triples(),
                model.total_input_count(),
                model.output_count,
            );
            assert!(!CycleCheck::new().is_cyclic(&graph));
            // No duplicate endpoint pairs either.
            for gene in child.genes().iter() {
                assert_eq!(
                    child
                        .genes()
                        .iter()
                        .filter(|g| (g.source, g.target) == (gene.source, gene.target))
                        .count(),
                    1
                );
            }
        }
    }

    #[test]
    fn fully_connected_parent_yields_unmutated_copy() {
        // One input-side node and one output, already connected: every
        // candidate pair is a duplicate, so add-connection gives up.
        let model = Model::acyclic(0, 1, Activation::LeakyRelu, 5.0);
        let genes = ConnectionGenes::from_vec(vec![ConnectionGene {
            innovation: 0,
            source: 0,
            target: 1,
            weight: 1.0,
        }]);
        let parent = Genome::new(0, 0, genes);
        let ids = IdSequences::for_model(&model);
        let cache = InnovationCache::new();
        let mut rng = ChaCha8Rng::seed_from_u64(4);

        let mut asexual = AsexualReproduction::new(WeightMutationScheme::default_scheme());
        let child = asexual.create_child(
            &parent,
            &only(MutationOp::AddConnection),
            &model,
            &ids,
            &cache,
            1,
            &mut rng,
        );
        assert_eq!(child.genes(), parent.genes());
        assert_ne!(child.id(), parent.id());
    }

    #[test]
    fn delete_connection_removes_one_gene() {
        let (model, parent, ids, cache, mut rng) = fixture();
        let mut asexual = AsexualReproduction::new(WeightMutationScheme::default_scheme());
        let child = asexual.create_child(
            &parent,
            &only(MutationOp::DeleteConnection),
            &model,
            &ids,
            &cache,
            1,
            &mut rng,
        );
        assert_eq!(child.genes().len(), parent.genes().len() - 1);
    }

    #[test]
    fn simplifying_distribution_never_adds_nodes() {
        let settings = AsexualReproductionSettings::default();
        let ops = OperatorDistribution::simplifying(&settings);
        let mut rng = ChaCha8Rng::seed_from_u64(12);
        for _ in 0..500 {
            assert_ne!(ops.sample(&mut rng), MutationOp::AddNode);
        }
    }
}
