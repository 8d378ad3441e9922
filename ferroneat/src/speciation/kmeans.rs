use crate::genomics::Genome;
use crate::speciation::{DistanceMetric, GeneVector, Species};

use rand::distributions::WeightedIndex;
use rand::prelude::{Distribution, Rng, SliceRandom};

/// Genetic k-means speciation.
///
/// `speciate_all` builds a species set from scratch (k-means++ seeding,
/// once per run); `speciate_add` folds new offspring into an existing set.
/// Both finish with the iteration loop: each pass queues every genome's
/// move to its nearest centroid, applies the queued moves, and recomputes
/// centroids only for species whose membership changed, stopping after
/// `max_iterations` passes or the first pass with zero moves. Any species
/// left empty is repaired by transferring the most populous species'
/// furthest-from-centroid member.
#[derive(Debug)]
pub struct KMeansSpeciation {
    metric: Box<dyn DistanceMetric>,
    max_iterations: usize,
}

impl KMeansSpeciation {
    pub fn new(metric: Box<dyn DistanceMetric>, max_iterations: usize) -> KMeansSpeciation {
        KMeansSpeciation {
            metric,
            max_iterations,
        }
    }

    pub fn metric(&self) -> &dyn DistanceMetric {
        &*self.metric
    }

    /// Clusters `genomes` into at most `species_count` species.
    ///
    /// Seeds are chosen by k-means++: the first uniformly at random, each
    /// subsequent one from a candidate subset of size
    /// `min(remaining, round(10·log₁₀ remaining))` with probability
    /// proportional to its squared distance to the nearest seed already
    /// chosen.
    pub fn speciate_all(
        &self,
        genomes: &[Genome],
        species_count: usize,
        rng: &mut impl Rng,
    ) -> Vec<Species> {
        let k = species_count.min(genomes.len()).max(1);
        let mut remaining: Vec<usize> = (0..genomes.len()).collect();
        let mut seeds: Vec<usize> = Vec::with_capacity(k);

        let first = rng.gen_range(0..remaining.len());
        seeds.push(remaining.swap_remove(first));

        while seeds.len() < k {
            let candidate_count = remaining
                .len()
                .min((10.0 * (remaining.len() as f64).log10()).round() as usize)
                .max(1);
            let mut candidates = rand::seq::index::sample(rng, remaining.len(), candidate_count)
                .into_vec();
            candidates.sort_unstable();

            let squared_distances: Vec<f64> = candidates
                .iter()
                .map(|&c| {
                    seeds
                        .iter()
                        .map(|&s| {
                            self.metric
                                .genome_to_genome(genomes[remaining[c]].genes(), genomes[s].genes())
                        })
                        .fold(f64::INFINITY, f64::min)
                        .powi(2)
                })
                .collect();

            let chosen = match WeightedIndex::new(&squared_distances) {
                Ok(index) => candidates[index.sample(rng)],
                // All candidates coincide with existing seeds; any will do.
                Err(_) => *candidates.choose(rng).unwrap(),
            };
            seeds.push(remaining.swap_remove(chosen));
        }

        let mut species: Vec<Species> = seeds
            .iter()
            .enumerate()
            .map(|(id, &seed)| {
                let centroid: GeneVector = genomes[seed]
                    .genes()
                    .iter()
                    .map(|g| (g.innovation, g.weight))
                    .collect();
                Species::new(id, centroid, vec![seed])
            })
            .collect();

        remaining.sort_unstable();
        for genome_idx in remaining {
            let nearest = self.nearest_species(&genomes[genome_idx], &species);
            species[nearest].members_mut().push(genome_idx);
        }
        for s in &mut species {
            s.recompute_centroid(genomes);
        }

        self.iterate(genomes, &mut species);
        species
    }

    /// Folds `new_members` (indices into `genomes`) into an existing
    /// species set, then re-runs the iteration loop.
    pub fn speciate_add(&self, genomes: &[Genome], species: &mut [Species], new_members: &[usize]) {
        for &genome_idx in new_members {
            let nearest = self.nearest_species(&genomes[genome_idx], species);
            species[nearest].members_mut().push(genome_idx);
        }
        for s in species.iter_mut() {
            s.recompute_centroid(genomes);
        }
        self.iterate(genomes, species);
    }

    /// The k-means reallocation loop.
    pub fn iterate(&self, genomes: &[Genome], species: &mut [Species]) {
        let mut assignment = vec![0usize; genomes.len()];
        for (s_idx, s) in species.iter().enumerate() {
            for &m in s.members() {
                assignment[m] = s_idx;
            }
        }

        for _ in 0..self.max_iterations {
            let mut moves = 0;
            let mut changed = vec![false; species.len()];

            for (genome_idx, current) in assignment.iter_mut().enumerate() {
                let nearest = self.nearest_species(&genomes[genome_idx], species);
                if nearest != *current {
                    changed[*current] = true;
                    changed[nearest] = true;
                    *current = nearest;
                    moves += 1;
                }
            }
            if moves == 0 {
                break;
            }

            for s in species.iter_mut() {
                s.members_mut().clear();
            }
            for (genome_idx, &s_idx) in assignment.iter().enumerate() {
                species[s_idx].members_mut().push(genome_idx);
            }
            for (s_idx, s) in species.iter_mut().enumerate() {
                if changed[s_idx] {
                    s.recompute_centroid(genomes);
                }
            }
        }

        self.repair_empty(genomes, species);
    }

    /// Refills each empty species with the most populous species' member
    /// furthest from its centroid.
    fn repair_empty(&self, genomes: &[Genome], species: &mut [Species]) {
        for empty_idx in 0..species.len() {
            if !species[empty_idx].is_empty() {
                continue;
            }
            let donor_idx = (0..species.len())
                .max_by_key(|&s| species[s].len())
                .unwrap();
            if species[donor_idx].len() <= 1 {
                continue;
            }

            let donor = &species[donor_idx];
            let furthest = donor
                .members()
                .iter()
                .enumerate()
                .map(|(i, &m)| {
                    (
                        i,
                        self.metric
                            .genome_to_centroid(genomes[m].genes(), donor.centroid()),
                    )
                })
                .max_by(|a, b| a.1.total_cmp(&b.1))
                .map(|(i, _)| i)
                .unwrap();

            let genome_idx = species[donor_idx].members_mut().swap_remove(furthest);
            species[empty_idx].members_mut().push(genome_idx);
            species[donor_idx].recompute_centroid(genomes);
            species[empty_idx].recompute_centroid(genomes);
        }
    }

    fn nearest_species(&self, genome: &Genome, species: &[Species]) -> usize {
        let mut best = 0;
        let mut best_distance = f64::INFINITY;
        for (idx, s) in species.iter().enumerate() {
            let d = self.metric.genome_to_centroid(genome.genes(), s.centroid());
            if d < best_distance {
                best = idx;
                best_distance = d;
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genomics::{ConnectionGene, ConnectionGenes};
    use crate::speciation::ManhattanMetric;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn genome(id: usize, weights: &[f64]) -> Genome {
        Genome::new(
            id,
            0,
            ConnectionGenes::from_vec(
                weights
                    .iter()
                    .enumerate()
                    .map(|(innovation, &weight)| ConnectionGene {
                        innovation,
                        source: 0,
                        target: 1,
                        weight,
                    })
                    .collect(),
            ),
        )
    }

    fn speciation() -> KMeansSpeciation {
        KMeansSpeciation::new(Box::new(ManhattanMetric::default()), 10)
    }

    /// Two tight clusters far apart in weight space.
    fn clustered_genomes() -> Vec<Genome> {
        let mut genomes = Vec::new();
        for i in 0..6 {
            genomes.push(genome(i, &[10.0 + i as f64 * 0.01, 10.0]));
        }
        for i in 6..12 {
            genomes.push(genome(i, &[-10.0 - i as f64 * 0.01, -10.0]));
        }
        genomes
    }

    #[test]
    fn separates_obvious_clusters() {
        let genomes = clustered_genomes();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let species = speciation().speciate_all(&genomes, 2, &mut rng);

        assert_eq!(species.len(), 2);
        for s in &species {
            assert_eq!(s.len(), 6);
            let positive = s.members().iter().all(|&m| m < 6);
            let negative = s.members().iter().all(|&m| m >= 6);
            assert!(positive || negative, "cluster mixes the two groups");
        }
    }

    #[test]
    fn every_genome_lands_in_exactly_one_species() {
        let genomes = clustered_genomes();
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let species = speciation().speciate_all(&genomes, 4, &mut rng);

        let mut seen = vec![0usize; genomes.len()];
        for s in &species {
            for &m in s.members() {
                seen[m] += 1;
            }
        }
        assert!(seen.iter().all(|&n| n == 1));
    }

    #[test]
    fn converged_iteration_changes_nothing() {
        let genomes = clustered_genomes();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let speciation = speciation();
        let mut species = speciation.speciate_all(&genomes, 2, &mut rng);

        let members_before: Vec<Vec<usize>> =
            species.iter().map(|s| s.members().to_vec()).collect();
        let centroids_before: Vec<GeneVector> =
            species.iter().map(|s| s.centroid().clone()).collect();

        speciation.iterate(&genomes, &mut species);

        for (i, s) in species.iter().enumerate() {
            assert_eq!(s.members(), &members_before[i][..]);
            assert_eq!(s.centroid(), &centroids_before[i]);
        }
    }

    #[test]
    fn speciate_add_assigns_offspring_to_nearest_cluster() {
        let mut genomes = clustered_genomes();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let speciation = speciation();
        let mut species = speciation.speciate_all(&genomes, 2, &mut rng);

        genomes.push(genome(100, &[10.5, 10.0]));
        let new_idx = genomes.len() - 1;
        speciation.speciate_add(&genomes, &mut species, &[new_idx]);

        let home = species.iter().find(|s| s.members().contains(&new_idx)).unwrap();
        // It joins the positive cluster.
        assert!(home.members().iter().all(|&m| m == new_idx || m < 6));
    }

    #[test]
    fn empty_species_repair_moves_exactly_one_genome() {
        let genomes = clustered_genomes();
        let speciation = speciation();
        // Start with everything crammed into species 0 and species 1 empty,
        // with centroids forced so that iteration keeps membership put.
        let mut species = vec![
            Species::new(0, vec![(0, 0.0), (1, 0.0)], (0..genomes.len()).collect()),
            Species::new(1, vec![(0, 1000.0), (1, 1000.0)], vec![]),
        ];
        species[0].recompute_centroid(&genomes);

        speciation.iterate(&genomes, &mut species);

        assert!(!species[1].is_empty());
        assert_eq!(
            species[0].len() + species[1].len(),
            genomes.len(),
            "repair must only transfer membership"
        );
    }

    #[test]
    fn centroids_match_member_means_after_speciation() {
        let genomes = clustered_genomes();
        let mut rng = ChaCha8Rng::seed_from_u64(13);
        let species = speciation().speciate_all(&genomes, 3, &mut rng);

        for s in &species {
            let mut expected = s.clone();
            expected.recompute_centroid(&genomes);
            for ((ia, wa), (ib, wb)) in s.centroid().iter().zip(expected.centroid()) {
                assert_eq!(ia, ib);
                assert!((wa - wb).abs() < 1e-12);
            }
        }
    }
}
