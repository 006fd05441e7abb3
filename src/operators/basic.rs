//! Trivial operators used as building blocks.

use crate::error::Result;
use crate::operators::{Crossover, Mutator};
use crate::registry::{self_describing, CrossoverDescription, MutatorDescription};
use crate::rng::RandomNumberGenerator;

/// Returns its input unchanged.
///
/// Paired with another mutator inside a [`MultiMutator`](crate::operators::MultiMutator)
/// it implements a mutation rate.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoChangeMutator;

impl<G: Send, S: ?Sized, P: ?Sized> Mutator<G, S, P> for NoChangeMutator {
    fn mutate(
        &self,
        genotypes: Vec<G>,
        _rng: &mut RandomNumberGenerator,
        _space: &S,
        _problem: &P,
    ) -> Result<Vec<G>> {
        Ok(genotypes)
    }
}

/// Offspring is a copy of the first parent.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FirstParentCrossover;

impl<G: Send, S: ?Sized, P: ?Sized> Crossover<G, S, P> for FirstParentCrossover {
    fn cross(
        &self,
        parents: Vec<(G, G)>,
        _rng: &mut RandomNumberGenerator,
        _space: &S,
        _problem: &P,
    ) -> Result<Vec<G>> {
        Ok(parents.into_iter().map(|(first, _)| first).collect())
    }
}

self_describing!(NoChangeMutator => MutatorDescription, Mutator);
self_describing!(FirstParentCrossover => CrossoverDescription, Crossover);
