//! Speciation clusters genomes by genetic k-means.
//!
//! A species is a centroid over connection-gene vectors plus the indices of
//! its member genomes. The first generation is seeded by k-means++; later
//! generations assign new offspring to the nearest centroid and re-run the
//! k-means iteration. Distances are computed by a pluggable
//! [`DistanceMetric`]; the provided [`ManhattanMetric`] sums weight
//! differences over the union of innovation numbers, with missing genes
//! contributing their full weight.

mod distance;
mod kmeans;
mod species;

pub use distance::{DistanceMetric, ManhattanMetric};
pub use kmeans::KMeansSpeciation;
pub use species::{GeneVector, Species};
