use crate::Innovation;

use serde::{Deserialize, Serialize};

use std::fmt;

/// A connection gene: one weighted edge of the network a genome describes.
///
/// Genes with the same `(source, target)` endpoints created in the same
/// generation share an innovation number anywhere in the population, which
/// is what lets crossover align homologous structure.
#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
pub struct ConnectionGene {
    pub innovation: Innovation,
    pub source: Innovation,
    pub target: Innovation,
    pub weight: f64,
}

impl fmt::Display for ConnectionGene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}->{}, {:.3}]",
            self.innovation, self.source, self.target, self.weight
        )
    }
}

/// A genome's connection genes, strictly sorted by ascending innovation
/// number with no duplicates.
///
/// The sort invariant is what makes the merge-style gene alignment of
/// crossover and the speciation distance metric linear-time, so it is
/// enforced on construction.
#[derive(Clone, PartialEq, Debug, Default, Serialize, Deserialize)]
pub struct ConnectionGenes(Vec<ConnectionGene>);

impl ConnectionGenes {
    /// Builds a gene array from an arbitrarily-ordered vector.
    ///
    /// # Panics
    /// Panics if two genes share an innovation number.
    ///
    /// # Examples
    /// ```
    /// use ferroneat::genomics::{ConnectionGene, ConnectionGenes};
    ///
    /// let genes = ConnectionGenes::from_vec(vec![
    ///     ConnectionGene { innovation: 7, source: 0, target: 2, weight: 0.5 },
    ///     ConnectionGene { innovation: 2, source: 1, target: 2, weight: -1.0 },
    /// ]);
    ///
    /// let ids: Vec<_> = genes.iter().map(|g| g.innovation).collect();
    /// assert_eq!(ids, vec![2, 7]);
    /// ```
    pub fn from_vec(mut genes: Vec<ConnectionGene>) -> ConnectionGenes {
        genes.sort_unstable_by_key(|g| g.innovation);
        assert!(
            genes.windows(2).all(|w| w[0].innovation < w[1].innovation),
            "duplicate innovation number in gene array"
        );
        ConnectionGenes(genes)
    }

    /// Wraps a vector already sorted by ascending innovation number.
    /// The invariant is only debug-checked; use [`from_vec`] when in doubt.
    ///
    /// [`from_vec`]: ConnectionGenes::from_vec
    pub fn from_sorted_vec(genes: Vec<ConnectionGene>) -> ConnectionGenes {
        debug_assert!(
            genes.windows(2).all(|w| w[0].innovation < w[1].innovation),
            "gene array not strictly sorted by innovation number"
        );
        ConnectionGenes(genes)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &ConnectionGene> + Clone {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[ConnectionGene] {
        &self.0
    }

    /// Looks a gene up by innovation number.
    pub fn get(&self, innovation: Innovation) -> Option<&ConnectionGene> {
        self.0
            .binary_search_by_key(&innovation, |g| g.innovation)
            .ok()
            .map(|i| &self.0[i])
    }

    /// Tests whether any gene connects `source` to `target`. Linear scan;
    /// endpoint pairs are not indexed.
    pub fn contains_endpoints(&self, source: Innovation, target: Innovation) -> bool {
        self.0.iter().any(|g| g.source == source && g.target == target)
    }

    /// The gene triples in `(source, target, weight)` form, as consumed by
    /// the graph builders.
    pub fn connection_triples(
        &self,
    ) -> impl Iterator<Item = (Innovation, Innovation, f64)> + '_ {
        self.0.iter().map(|g| (g.source, g.target, g.weight))
    }
}

impl<'a> IntoIterator for &'a ConnectionGenes {
    type Item = &'a ConnectionGene;
    type IntoIter = std::slice::Iter<'a, ConnectionGene>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
