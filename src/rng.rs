//! # RandomNumberGenerator
//!
//! The `RandomNumberGenerator` struct wraps the `rand` crate's `StdRng` and is
//! the only source of randomness handed to operators. It implements
//! [`rand::RngCore`], so every `rand::Rng` convenience method is available on it.
//!
//! ## Example
//!
//! ```rust
//! use genalps::rng::RandomNumberGenerator;
//! use rand::Rng;
//!
//! let mut rng = RandomNumberGenerator::from_seed(42);
//! let gene: f64 = rng.gen_range(-1.0..1.0);
//! assert!((-1.0..1.0).contains(&gene));
//! ```
//!
//! ## Deterministic forking
//!
//! Batch operators that fan work out over rayon never share a generator.
//! Instead the phase generator is forked once, and every element of the
//! batch receives its own child derived from the fork seed and the element's
//! index:
//!
//! ```rust
//! use genalps::rng::RandomNumberGenerator;
//! use rand::RngCore;
//!
//! let mut a = RandomNumberGenerator::from_seed(7);
//! let mut b = RandomNumberGenerator::from_seed(7);
//!
//! let (fork_a, fork_b) = (a.fork(), b.fork());
//! assert_eq!(fork_a.child(3).next_u64(), fork_b.child(3).next_u64());
//! ```

use rand::{rngs::StdRng, RngCore, SeedableRng};

const GOLDEN_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;

/// A wrapper around `StdRng` that can be forked deterministically.
#[derive(Clone, Debug)]
pub struct RandomNumberGenerator {
    rng: StdRng,
}

impl RandomNumberGenerator {
    /// Creates a new `RandomNumberGenerator` instance seeded from the system entropy.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Creates a new `RandomNumberGenerator` instance with a specific seed.
    ///
    /// Two generators created from the same seed produce the same sequence,
    /// which is what makes whole algorithm runs reproducible.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Draws one value from this generator and turns it into a [`ForkSeed`].
    ///
    /// Each call advances the parent, so consecutive forks are independent.
    pub fn fork(&mut self) -> ForkSeed {
        ForkSeed {
            base: self.rng.next_u64(),
        }
    }
}

impl Default for RandomNumberGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl RngCore for RandomNumberGenerator {
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.rng.try_fill_bytes(dest)
    }
}

/// Seed material drawn from a parent generator.
///
/// `child(i)` depends only on the seed and `i`, never on the order in which
/// children are requested or on the thread requesting them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ForkSeed {
    base: u64,
}

impl ForkSeed {
    /// Derives the generator for the element at `index`.
    pub fn child(&self, index: usize) -> RandomNumberGenerator {
        let stream = (index as u64).wrapping_add(1).wrapping_mul(GOLDEN_GAMMA);
        RandomNumberGenerator::from_seed(splitmix64(self.base ^ stream))
    }
}

fn splitmix64(mut z: u64) -> u64 {
    z = z.wrapping_add(GOLDEN_GAMMA);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
