//! Granularity adapters.
//!
//! [`Broadcast`] turns a one-at-a-time operator into a batch operator by
//! mapping it over the batch with [`map_forked_with_threshold`]: element `i`
//! always receives the i-th child of a single fork of the phase generator.
//! [`ContextFree`] lets operators that ignore the search space and problem
//! be used wherever a `Single*` operator is expected.

use crate::error::Result;
use crate::operators::{Creator, Crossover, Mutator};
use crate::parallel::{map_forked_with_threshold, DEFAULT_PARALLEL_THRESHOLD};
use crate::registry::{
    self_describing, CreatorDescription, CrossoverDescription, MutatorDescription,
};
use crate::rng::RandomNumberGenerator;

/// Creates a single genotype.
pub trait SingleCreator<G, S: ?Sized, P: ?Sized>: Send + Sync {
    fn create_one(&self, rng: &mut RandomNumberGenerator, space: &S, problem: &P) -> Result<G>;
}

/// Recombines a single pair of parents.
pub trait SingleCrossover<G, S: ?Sized, P: ?Sized>: Send + Sync {
    fn cross_one(
        &self,
        first: &G,
        second: &G,
        rng: &mut RandomNumberGenerator,
        space: &S,
        problem: &P,
    ) -> Result<G>;
}

/// Mutates a single genotype.
pub trait SingleMutator<G, S: ?Sized, P: ?Sized>: Send + Sync {
    fn mutate_one(
        &self,
        genotype: G,
        rng: &mut RandomNumberGenerator,
        space: &S,
        problem: &P,
    ) -> Result<G>;
}

pub trait ContextFreeCreator<G>: Send + Sync {
    fn generate(&self, rng: &mut RandomNumberGenerator) -> G;
}

pub trait ContextFreeCrossover<G>: Send + Sync {
    fn recombine(&self, first: &G, second: &G, rng: &mut RandomNumberGenerator) -> G;
}

pub trait ContextFreeMutator<G>: Send + Sync {
    fn perturb(&self, genotype: G, rng: &mut RandomNumberGenerator) -> G;
}

/// Adapts a context-free operator to the `Single*` traits.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContextFree<T>(pub T);

impl<G, S: ?Sized, P: ?Sized, T> SingleCreator<G, S, P> for ContextFree<T>
where
    T: ContextFreeCreator<G>,
{
    fn create_one(&self, rng: &mut RandomNumberGenerator, _space: &S, _problem: &P) -> Result<G> {
        Ok(self.0.generate(rng))
    }
}

impl<G, S: ?Sized, P: ?Sized, T> SingleCrossover<G, S, P> for ContextFree<T>
where
    T: ContextFreeCrossover<G>,
{
    fn cross_one(
        &self,
        first: &G,
        second: &G,
        rng: &mut RandomNumberGenerator,
        _space: &S,
        _problem: &P,
    ) -> Result<G> {
        Ok(self.0.recombine(first, second, rng))
    }
}

impl<G, S: ?Sized, P: ?Sized, T> SingleMutator<G, S, P> for ContextFree<T>
where
    T: ContextFreeMutator<G>,
{
    fn mutate_one(
        &self,
        genotype: G,
        rng: &mut RandomNumberGenerator,
        _space: &S,
        _problem: &P,
    ) -> Result<G> {
        Ok(self.0.perturb(genotype, rng))
    }
}

/// Maps a single-item operator over a batch.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Broadcast<T> {
    inner: T,
    parallel_threshold: usize,
}

impl<T> Broadcast<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }

    /// Batches of at least `parallel_threshold` items run on rayon.
    pub fn with_parallel_threshold(mut self, parallel_threshold: usize) -> Self {
        self.parallel_threshold = parallel_threshold;
        self
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }
}

impl<T> Broadcast<ContextFree<T>> {
    /// Shorthand for `Broadcast::new(ContextFree(inner))`.
    pub fn context_free(inner: T) -> Self {
        Self::new(ContextFree(inner))
    }
}

impl<G, S, P, T> Creator<G, S, P> for Broadcast<T>
where
    G: Send,
    S: Sync + ?Sized,
    P: Sync + ?Sized,
    T: SingleCreator<G, S, P>,
{
    fn create(
        &self,
        count: usize,
        rng: &mut RandomNumberGenerator,
        space: &S,
        problem: &P,
    ) -> Result<Vec<G>> {
        map_forked_with_threshold(
            vec![(); count],
            rng,
            self.parallel_threshold,
            |_, (), rng| self.inner.create_one(rng, space, problem),
        )
    }
}

impl<G, S, P, T> Crossover<G, S, P> for Broadcast<T>
where
    G: Send,
    S: Sync + ?Sized,
    P: Sync + ?Sized,
    T: SingleCrossover<G, S, P>,
{
    fn cross(
        &self,
        parents: Vec<(G, G)>,
        rng: &mut RandomNumberGenerator,
        space: &S,
        problem: &P,
    ) -> Result<Vec<G>> {
        map_forked_with_threshold(
            parents,
            rng,
            self.parallel_threshold,
            |_, (first, second), rng| self.inner.cross_one(&first, &second, rng, space, problem),
        )
    }
}

impl<G, S, P, T> Mutator<G, S, P> for Broadcast<T>
where
    G: Send,
    S: Sync + ?Sized,
    P: Sync + ?Sized,
    T: SingleMutator<G, S, P>,
{
    fn mutate(
        &self,
        genotypes: Vec<G>,
        rng: &mut RandomNumberGenerator,
        space: &S,
        problem: &P,
    ) -> Result<Vec<G>> {
        map_forked_with_threshold(
            genotypes,
            rng,
            self.parallel_threshold,
            |_, genotype, rng| self.inner.mutate_one(genotype, rng, space, problem),
        )
    }
}

self_describing!(<T> Broadcast<T> => CreatorDescription, Creator);
self_describing!(<T> Broadcast<T> => CrossoverDescription, Crossover);
self_describing!(<T> Broadcast<T> => MutatorDescription, Mutator);
