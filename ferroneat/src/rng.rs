//! Seedable randomness plumbing.
//!
//! Every stochastic component draws from a `ChaCha8Rng` ultimately seeded by
//! the run's master seed, which is what makes serial runs bitwise
//! reproducible. Independent concerns (reproduction, speciation seeding) are
//! given forked generators so one consuming more or fewer draws cannot shift
//! the other's stream.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Forks an independent generator off a master source.
pub fn fork(master: &mut impl Rng) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(master.gen())
}
