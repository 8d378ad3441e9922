//! Genomes are the focus of evolution in NEAT.
//!
//! A genome is an ordered list of connection genes plus the run-wide
//! [`Model`] constants; together they identify a unique network. Node ids are
//! implicit: the bias and input nodes occupy the lowest ids, output nodes the
//! next contiguous range, and hidden nodes are whatever other ids appear as a
//! gene endpoint. Genomes are immutable once created: the reproduction
//! operators produce new genomes rather than editing existing ones.

mod genes;
mod genome;
mod history;
mod model;

pub use genes::{ConnectionGene, ConnectionGenes};
pub use genome::Genome;
pub use history::{IdSequences, InnovationCache, SplitIds};
pub use model::Model;

use crate::Innovation;

use rand::Rng;

/// Creates the initial population: each genome connects every
/// (bias-or-input, output) pair with probability
/// `interconnect_proportion`, weights drawn uniformly from
/// `±model.weight_scale`.
///
/// Initial genes are given the deterministic innovation number
/// `o + s × output_count`, where `s` is the source node id and `o` the
/// output's index, so identical initial connections align across genomes
/// without consulting the innovation cache. [`IdSequences::for_model`]
/// reserves this id range.
pub fn create_initial_population(
    model: &Model,
    ids: &IdSequences,
    population_size: usize,
    interconnect_proportion: f64,
    rng: &mut impl Rng,
) -> Vec<Genome> {
    (0..population_size)
        .map(|_| {
            let mut genes = Vec::new();
            for source in 0..model.total_input_count() {
                for output_idx in 0..model.output_count {
                    if rng.gen::<f64>() < interconnect_proportion {
                        genes.push(ConnectionGene {
                            innovation: output_idx + source * model.output_count,
                            source,
                            target: model.total_input_count() + output_idx,
                            weight: rng.gen_range(-model.weight_scale..=model.weight_scale),
                        });
                    }
                }
            }
            Genome::new(ids.next_genome_id(), 0, ConnectionGenes::from_vec(genes))
        })
        .collect()
}

/// Sorted list of every node id referenced by a gene array, including the
/// fixed bias/input/output ids that exist regardless of connectivity.
pub(crate) fn node_ids_of(genes: &ConnectionGenes, model: &Model) -> Vec<Innovation> {
    let fixed = model.fixed_node_count();
    let mut ids: Vec<Innovation> = (0..fixed).collect();
    let mut hidden: Vec<Innovation> = genes
        .iter()
        .flat_map(|g| [g.source, g.target])
        .filter(|&id| id >= fixed)
        .collect();
    hidden.sort_unstable();
    hidden.dedup();
    ids.extend(hidden);
    ids
}
