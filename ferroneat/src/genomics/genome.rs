use crate::evaluation::FitnessInfo;
use crate::genomics::{ConnectionGenes, Model};
use crate::Innovation;

use serde::{Deserialize, Serialize};

use std::fmt;

/// A heritable description of a network: an id, the generation it was born
/// in, and its connection genes.
///
/// Genomes are immutable apart from their fitness slot, which the evolution
/// loop fills in during evaluation. The hidden-node set is not stored; it
/// is derived from the gene endpoints on decode.
#[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
pub struct Genome {
    id: usize,
    birth_generation: u32,
    genes: ConnectionGenes,
    fitness: Option<FitnessInfo>,
}

impl Genome {
    pub fn new(id: usize, birth_generation: u32, genes: ConnectionGenes) -> Genome {
        Genome {
            id,
            birth_generation,
            genes,
            fitness: None,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn birth_generation(&self) -> u32 {
        self.birth_generation
    }

    pub fn genes(&self) -> &ConnectionGenes {
        &self.genes
    }

    /// A scalar proxy for genome size: the connection count.
    pub fn complexity(&self) -> f64 {
        self.genes.len() as f64
    }

    /// The fitness assigned by the latest evaluation, if any.
    pub fn fitness(&self) -> Option<&FitnessInfo> {
        self.fitness.as_ref()
    }

    pub fn set_fitness(&mut self, fitness: FitnessInfo) {
        self.fitness = Some(fitness);
    }

    /// Primary fitness, or 0 if the genome has not been evaluated.
    /// Offspring quota allocation and parent selection read this.
    pub fn primary_fitness(&self) -> f64 {
        self.fitness.as_ref().map_or(0.0, |f| f.primary)
    }

    /// Sorted ids of every node the genome's network contains: the model's
    /// fixed bias/input/output nodes plus the hidden ids appearing as gene
    /// endpoints.
    pub fn node_ids(&self, model: &Model) -> Vec<Innovation> {
        super::node_ids_of(&self.genes, model)
    }
}

impl fmt::Display for Genome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Genome {}@g{} [", self.id, self.birth_generation)?;
        for (i, gene) in self.genes.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", gene)?;
        }
        write!(f, "]")
    }
}
