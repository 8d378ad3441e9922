use crate::genomics::ConnectionGene;

use rand::distributions::WeightedIndex;
use rand::prelude::{Distribution, Rng};
use rand_distr::Normal;

/// One way of perturbing a gene array's weights.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WeightMutation {
    /// Adds Gaussian noise with the given standard deviation to a random
    /// subset of the genes, each selected with probability `proportion`.
    JiggleSubset { proportion: f64, sigma: f64 },
    /// Adds Gaussian noise to every gene.
    JiggleAll { sigma: f64 },
    /// Re-draws a random subset's weights uniformly from the full weight
    /// range.
    ResetSubset { proportion: f64 },
}

/// A probability distribution over [`WeightMutation`]s. Each invocation
/// picks one mutation and applies it, clamping every touched weight to
/// `±weight_scale`.
#[derive(Clone, Debug)]
pub struct WeightMutationScheme {
    mutations: Vec<WeightMutation>,
    index: WeightedIndex<f64>,
}

impl WeightMutationScheme {
    /// Builds a scheme from `(probability, mutation)` pairs.
    ///
    /// # Panics
    /// Panics if the probabilities are all zero or any is negative.
    pub fn new(entries: Vec<(f64, WeightMutation)>) -> WeightMutationScheme {
        let index = WeightedIndex::new(entries.iter().map(|(p, _)| *p))
            .expect("weight mutation scheme requires positive probabilities");
        WeightMutationScheme {
            mutations: entries.into_iter().map(|(_, m)| m).collect(),
            index,
        }
    }

    /// The stock scheme: mostly small jiggles of half the genes, with
    /// occasional whole-genome jiggles and subset resets.
    pub fn default_scheme() -> WeightMutationScheme {
        WeightMutationScheme::new(vec![
            (
                0.6,
                WeightMutation::JiggleSubset {
                    proportion: 0.5,
                    sigma: 0.5,
                },
            ),
            (0.2, WeightMutation::JiggleAll { sigma: 0.25 }),
            (0.2, WeightMutation::ResetSubset { proportion: 0.3 }),
        ])
    }

    /// Applies one sampled mutation to `genes`.
    pub fn mutate(&self, genes: &mut [ConnectionGene], weight_scale: f64, rng: &mut impl Rng) {
        if genes.is_empty() {
            return;
        }
        match self.mutations[self.index.sample(rng)] {
            WeightMutation::JiggleSubset { proportion, sigma } => {
                let noise = Normal::new(0.0, sigma).unwrap();
                for i in random_subset(genes.len(), proportion, rng) {
                    jiggle(&mut genes[i], noise.sample(rng), weight_scale);
                }
            }
            WeightMutation::JiggleAll { sigma } => {
                let noise = Normal::new(0.0, sigma).unwrap();
                for gene in genes.iter_mut() {
                    jiggle(gene, noise.sample(rng), weight_scale);
                }
            }
            WeightMutation::ResetSubset { proportion } => {
                for i in random_subset(genes.len(), proportion, rng) {
                    genes[i].weight = rng.gen_range(-weight_scale..=weight_scale);
                }
            }
        }
    }
}

fn jiggle(gene: &mut ConnectionGene, delta: f64, weight_scale: f64) {
    gene.weight = (gene.weight + delta).clamp(-weight_scale, weight_scale);
}

/// Indices of a random subset, each element selected independently with
/// probability `proportion`. Never empty for a non-empty input: falls back
/// to a single random index so the sampled mutation always does something.
fn random_subset(len: usize, proportion: f64, rng: &mut impl Rng) -> Vec<usize> {
    let mut selected: Vec<usize> = (0..len).filter(|_| rng.gen::<f64>() < proportion).collect();
    if selected.is_empty() {
        selected.push(rng.gen_range(0..len));
    }
    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn genes(weights: &[f64]) -> Vec<ConnectionGene> {
        weights
            .iter()
            .enumerate()
            .map(|(i, &weight)| ConnectionGene {
                innovation: i,
                source: 0,
                target: i + 1,
                weight,
            })
            .collect()
    }

    #[test]
    fn weights_stay_within_scale() {
        let scheme = WeightMutationScheme::new(vec![(1.0, WeightMutation::JiggleAll { sigma: 10.0 })]);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..50 {
            let mut g = genes(&[4.9, -4.9, 0.0]);
            scheme.mutate(&mut g, 5.0, &mut rng);
            assert!(g.iter().all(|gene| gene.weight.abs() <= 5.0));
        }
    }

    #[test]
    fn jiggle_all_touches_every_gene() {
        let scheme = WeightMutationScheme::new(vec![(1.0, WeightMutation::JiggleAll { sigma: 1.0 })]);
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut g = genes(&[0.0; 8]);
        scheme.mutate(&mut g, 5.0, &mut rng);
        assert!(g.iter().all(|gene| gene.weight != 0.0));
    }

    #[test]
    fn subset_mutation_always_touches_at_least_one_gene() {
        let scheme = WeightMutationScheme::new(vec![(
            1.0,
            WeightMutation::ResetSubset { proportion: 0.0 },
        )]);
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut touched = 0;
        for _ in 0..20 {
            let mut g = genes(&[0.0, 0.0]);
            scheme.mutate(&mut g, 5.0, &mut rng);
            touched += g.iter().filter(|gene| gene.weight != 0.0).count();
        }
        assert!(touched >= 1);
    }

    #[test]
    fn structure_is_never_modified() {
        let scheme = WeightMutationScheme::default_scheme();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let original = genes(&[1.0, -2.0, 3.0]);
        let mut mutated = original.clone();
        scheme.mutate(&mut mutated, 5.0, &mut rng);
        for (before, after) in original.iter().zip(&mutated) {
            assert_eq!(before.innovation, after.innovation);
            assert_eq!(before.source, after.source);
            assert_eq!(before.target, after.target);
        }
    }
}
