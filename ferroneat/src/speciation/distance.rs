use crate::genomics::ConnectionGenes;
use crate::speciation::GeneVector;
use crate::Innovation;

use std::fmt;

/// A distance over innovation-aligned gene vectors.
///
/// Implementations see genomes and centroids through the same lens: sparse
/// `(innovation, weight)` sequences sorted by innovation number. The metric
/// is an open extension point; the evolution loop only requires it to be a
/// metric in the loose clustering sense (non-negative, zero on identical
/// vectors).
pub trait DistanceMetric: fmt::Debug + Send + Sync {
    fn genome_to_centroid(&self, genes: &ConnectionGenes, centroid: &GeneVector) -> f64;

    fn genome_to_genome(&self, a: &ConnectionGenes, b: &ConnectionGenes) -> f64;
}

/// Manhattan distance over the union of innovation numbers, with a missing
/// gene treated as weight zero.
///
/// Three coefficients weight the contribution classes: `matching` scales
/// `|w₁ − w₂|` for genes present on both sides, `disjoint` scales the
/// absolute weight of an unmatched gene inside the other side's innovation
/// range, and `excess` the same beyond it. The default is `(1, 1, 1)`,
/// plain Manhattan distance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ManhattanMetric {
    pub matching_coef: f64,
    pub disjoint_coef: f64,
    pub excess_coef: f64,
}

impl Default for ManhattanMetric {
    fn default() -> ManhattanMetric {
        ManhattanMetric {
            matching_coef: 1.0,
            disjoint_coef: 1.0,
            excess_coef: 1.0,
        }
    }
}

impl ManhattanMetric {
    /// Merge-walks two sorted `(innovation, weight)` sequences.
    fn walk(
        &self,
        a: impl ExactSizeIterator<Item = (Innovation, f64)> + Clone,
        b: impl ExactSizeIterator<Item = (Innovation, f64)> + Clone,
    ) -> f64 {
        let a_max = a.clone().last().map(|(id, _)| id);
        let b_max = b.clone().last().map(|(id, _)| id);
        let unmatched = |weight: f64, id: Innovation, other_max: Option<Innovation>| {
            let coef = match other_max {
                Some(max) if id <= max => self.disjoint_coef,
                _ => self.excess_coef,
            };
            coef * weight.abs()
        };

        let mut a = a.peekable();
        let mut b = b.peekable();
        let mut total = 0.0;
        loop {
            match (a.peek().copied(), b.peek().copied()) {
                (Some((ia, wa)), Some((ib, wb))) if ia == ib => {
                    total += self.matching_coef * (wa - wb).abs();
                    a.next();
                    b.next();
                }
                (Some((ia, wa)), Some((ib, _))) if ia < ib => {
                    total += unmatched(wa, ia, b_max);
                    a.next();
                }
                (Some(_), Some((ib, wb))) => {
                    total += unmatched(wb, ib, a_max);
                    b.next();
                }
                (Some((ia, wa)), None) => {
                    total += unmatched(wa, ia, b_max);
                    a.next();
                }
                (None, Some((ib, wb))) => {
                    total += unmatched(wb, ib, a_max);
                    b.next();
                }
                (None, None) => return total,
            }
        }
    }
}

impl DistanceMetric for ManhattanMetric {
    fn genome_to_centroid(&self, genes: &ConnectionGenes, centroid: &GeneVector) -> f64 {
        self.walk(
            genes.iter().map(|g| (g.innovation, g.weight)),
            centroid.iter().copied(),
        )
    }

    fn genome_to_genome(&self, a: &ConnectionGenes, b: &ConnectionGenes) -> f64 {
        self.walk(
            a.iter().map(|g| (g.innovation, g.weight)),
            b.iter().map(|g| (g.innovation, g.weight)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::genomics::ConnectionGene;

    fn genes(entries: &[(usize, f64)]) -> ConnectionGenes {
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
        )
    }

    #[test]
    fn identical_vectors_are_at_distance_zero() {
        let metric = ManhattanMetric::default();
        let a = genes(&[(0, 1.0), (3, -2.0)]);
        assert_eq!(metric.genome_to_genome(&a, &a), 0.0);
    }

    #[test]
    fn matching_genes_contribute_weight_difference() {
        let metric = ManhattanMetric::default();
        let a = genes(&[(0, 1.0), (1, 2.0)]);
        let b = genes(&[(0, -1.0), (1, 2.5)]);
        assert_eq!(metric.genome_to_genome(&a, &b), 2.0 + 0.5);
    }

    #[test]
    fn missing_genes_count_their_full_weight() {
        let metric = ManhattanMetric::default();
        let a = genes(&[(0, 1.0), (2, 3.0)]);
        let b = genes(&[(0, 1.0)]);
        assert_eq!(metric.genome_to_genome(&a, &b), 3.0);
        assert_eq!(metric.genome_to_genome(&b, &a), 3.0);
    }

    #[test]
    fn disjoint_and_excess_coefficients_split_unmatched_genes() {
        let metric = ManhattanMetric {
            matching_coef: 0.0,
            disjoint_coef: 10.0,
            excess_coef: 100.0,
        };
        // Gene 1 is disjoint (inside b's range); gene 9 is excess.
        let a = genes(&[(0, 1.0), (1, 1.0), (9, 1.0)]);
        let b = genes(&[(0, 1.0), (4, 1.0)]);
        // b's gene 4 is disjoint relative to a (a's max is 9).
        assert_eq!(metric.genome_to_genome(&a, &b), 10.0 + 100.0 + 10.0);
    }

    #[test]
    fn centroid_distance_matches_genome_distance() {
        let metric = ManhattanMetric::default();
        let a = genes(&[(0, 1.0), (5, -1.0)]);
        let centroid: GeneVector = vec![(0, 0.5), (5, -1.0), (6, 2.0)];
        assert_eq!(metric.genome_to_centroid(&a, &centroid), 0.5 + 2.0);
    }
}
