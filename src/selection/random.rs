use rand::Rng;

use crate::error::{GeneticError, Result};
use crate::operators::Selector;
use crate::population::Population;
use crate::registry::{self_describing, SelectorDescription};
use crate::rng::RandomNumberGenerator;

/// Draws members uniformly, with replacement.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RandomSelector;

impl RandomSelector {
    pub fn new() -> Self {
        Self
    }
}

impl<G, S: ?Sized, P: ?Sized> Selector<G, S, P> for RandomSelector {
    fn select(
        &self,
        population: &Population<G>,
        count: usize,
        rng: &mut RandomNumberGenerator,
        _space: &S,
        _problem: &P,
    ) -> Result<Vec<usize>> {
        if population.is_empty() {
            return Err(GeneticError::EmptyPopulation);
        }

        let size = population.len();
        Ok((0..count).map(|_| rng.gen_range(0..size)).collect())
    }
}

self_describing!(RandomSelector => SelectorDescription, Selector);
