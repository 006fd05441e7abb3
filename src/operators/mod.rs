//! # Operators
//!
//! Operator capabilities are small traits, one per role an operator can
//! play in an evolutionary step. Every trait is generic over the genotype
//! `G`, the search space `S` and the problem `P`, and every call receives
//! the run's [`RandomNumberGenerator`] plus the space and problem as
//! context.
//!
//! Batch contracts are positional: the i-th output of [`Crossover::cross`]
//! derives from the i-th parent pair, and the i-th output of
//! [`Mutator::mutate`] from the i-th input. Selectors return indices and
//! replacers return [`Survivor`]s, never copies. These contracts are what
//! allow wrappers (see [`crate::alps::lifting`]) to carry metadata through
//! an operator without inspecting genotypes.
//!
//! Operators written for one individual at a time implement the `Single*`
//! traits and become batch operators through [`Broadcast`]. Operators that
//! need neither the space nor the problem implement the `ContextFree*`
//! traits and are adapted with [`ContextFree`].
//!
//! ```rust
//! use genalps::operators::{Broadcast, ContextFree, ContextFreeMutator, Mutator};
//! use genalps::problem::Unconstrained;
//! use genalps::rng::RandomNumberGenerator;
//! use rand::Rng;
//!
//! #[derive(Clone)]
//! struct Jitter;
//!
//! impl ContextFreeMutator<f64> for Jitter {
//!     fn perturb(&self, genotype: f64, rng: &mut RandomNumberGenerator) -> f64 {
//!         genotype + rng.gen_range(-0.1..0.1)
//!     }
//! }
//!
//! let mutator = Broadcast::context_free(Jitter);
//! let mut rng = RandomNumberGenerator::from_seed(1);
//! let input = vec![1.0, 2.0];
//! let mutated =
//!     Mutator::<f64, Unconstrained, ()>::mutate(&mutator, input, &mut rng, &Unconstrained, &())
//!         .unwrap();
//! assert_eq!(mutated.len(), 2);
//! ```

pub mod adapters;
pub mod basic;
pub mod multi;

pub use adapters::{
    Broadcast, ContextFree, ContextFreeCreator, ContextFreeCrossover, ContextFreeMutator,
    SingleCreator, SingleCrossover, SingleMutator,
};
pub use basic::{FirstParentCrossover, NoChangeMutator};
pub use multi::{MultiCrossover, MultiMutator, PipelineMutator};

use crate::error::Result;
use crate::objective::ObjectiveVector;
use crate::population::{Population, Survivor};
use crate::rng::RandomNumberGenerator;

/// Produces new genotypes from nothing.
pub trait Creator<G, S: ?Sized, P: ?Sized>: Send + Sync {
    /// Returns exactly `count` genotypes.
    fn create(
        &self,
        count: usize,
        rng: &mut RandomNumberGenerator,
        space: &S,
        problem: &P,
    ) -> Result<Vec<G>>;
}

/// Recombines parent pairs into offspring.
pub trait Crossover<G, S: ?Sized, P: ?Sized>: Send + Sync {
    /// Returns one offspring per pair, in the order of `parents`.
    fn cross(
        &self,
        parents: Vec<(G, G)>,
        rng: &mut RandomNumberGenerator,
        space: &S,
        problem: &P,
    ) -> Result<Vec<G>>;
}

/// Perturbs genotypes.
pub trait Mutator<G, S: ?Sized, P: ?Sized>: Send + Sync {
    /// Returns one genotype per input, in input order.
    fn mutate(
        &self,
        genotypes: Vec<G>,
        rng: &mut RandomNumberGenerator,
        space: &S,
        problem: &P,
    ) -> Result<Vec<G>>;
}

/// Maps genotypes to objective vectors.
pub trait Evaluator<G, S: ?Sized, P: ?Sized>: Send + Sync {
    /// Returns one objective vector per genotype, in input order.
    fn evaluate(
        &self,
        genotypes: &[G],
        rng: &mut RandomNumberGenerator,
        space: &S,
        problem: &P,
    ) -> Result<Vec<ObjectiveVector>>;
}

/// Chooses members of a population, possibly repeatedly.
pub trait Selector<G, S: ?Sized, P: ?Sized>: Send + Sync {
    /// Returns `count` indices into `population`.
    fn select(
        &self,
        population: &Population<G>,
        count: usize,
        rng: &mut RandomNumberGenerator,
        space: &S,
        problem: &P,
    ) -> Result<Vec<usize>>;
}

/// Forms the next population from the previous one and fresh offspring.
pub trait Replacer<G, S: ?Sized, P: ?Sized>: Send + Sync {
    /// How many offspring to breed for a population of `population_size`.
    fn offspring_count(&self, population_size: usize) -> usize;

    /// Names the members of the next population.
    fn replace(
        &self,
        previous: &Population<G>,
        offspring: &Population<G>,
        rng: &mut RandomNumberGenerator,
        space: &S,
        problem: &P,
    ) -> Result<Vec<Survivor>>;
}
