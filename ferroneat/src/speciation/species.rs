use crate::genomics::Genome;
use crate::Innovation;

use serde::{Deserialize, Serialize};

/// Sparse connection-gene vector: `(innovation, weight)` pairs sorted by
/// innovation number. Species centroids live in this space.
pub type GeneVector = Vec<(Innovation, f64)>;

/// A cluster of genetically similar genomes.
///
/// Members are indices into the population's genome list, so species are
/// rebuilt cheaply each generation as k-means shuffles membership around.
/// The centroid is the coordinate-wise mean of the members' gene vectors,
/// with a gene missing from a member contributing zero.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Species {
    id: usize,
    centroid: GeneVector,
    members: Vec<usize>,
}

impl Species {
    pub fn new(id: usize, centroid: GeneVector, members: Vec<usize>) -> Species {
        Species {
            id,
            centroid,
            members,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn centroid(&self) -> &GeneVector {
        &self.centroid
    }

    pub fn members(&self) -> &[usize] {
        &self.members
    }

    pub(crate) fn members_mut(&mut self) -> &mut Vec<usize> {
        &mut self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Recomputes the centroid from the current members.
    ///
    /// The mean is taken over the union of the members' innovation numbers,
    /// dividing by the member count, so a member lacking a gene contributes
    /// an implicit zero at that coordinate.
    pub fn recompute_centroid(&mut self, genomes: &[Genome]) {
        self.centroid.clear();
        if self.members.is_empty() {
            return;
        }
        let mut sums: GeneVector = self
            .members
            .iter()
            .flat_map(|&m| genomes[m].genes().iter().map(|g| (g.innovation, g.weight)))
            .collect();
        sums.sort_unstable_by_key(|&(innovation, _)| innovation);

        let count = self.members.len() as f64;
        for (innovation, weight) in sums {
            match self.centroid.last_mut() {
                Some((last, sum)) if *last == innovation => *sum += weight,
                _ => self.centroid.push((innovation, weight)),
            }
        }
        for (_, sum) in &mut self.centroid {
            *sum /= count;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genomics::{ConnectionGene, ConnectionGenes};

    fn genome(id: usize, entries: &[(usize, f64)]) -> Genome {
        Genome::new(
            id,
            0,
            ConnectionGenes::from_vec(
                entries
                    .iter()
                    .map(|&(innovation, weight)| ConnectionGene {
                        innovation,
                        source: 0,
                        target: 1,
                        weight,
                    })
                    .collect(),
            ),
        )
    }

    #[test]
    fn centroid_is_coordinate_wise_mean() {
        let genomes = vec![
            genome(0, &[(0, 1.0), (1, 2.0)]),
            genome(1, &[(0, 3.0), (2, 4.0)]),
        ];
        let mut species = Species::new(0, GeneVector::new(), vec![0, 1]);
        species.recompute_centroid(&genomes);

        // Missing genes contribute implicit zeros: gene 1 and gene 2 are
        // each present in only one member.
        assert_eq!(species.centroid(), &vec![(0, 2.0), (1, 1.0), (2, 2.0)]);
    }

    #[test]
    fn empty_species_centroid_is_empty() {
        let mut species = Species::new(0, vec![(0, 1.0)], vec![]);
        species.recompute_centroid(&[]);
        assert!(species.centroid().is_empty());
    }
}
