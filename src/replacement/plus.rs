use crate::error::{GeneticError, Result};
use crate::operators::Replacer;
use crate::population::{Population, Survivor};
use crate::problem::Problem;
use crate::registry::{self_describing, ReplacerDescription};
use crate::replacement::best_of_pool;
use crate::rng::RandomNumberGenerator;

/// The best `N` of the previous population and the offspring survive
/// (the `(μ + λ)` scheme).
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlusSelectionReplacer;

impl<G, S, P> Replacer<G, S, P> for PlusSelectionReplacer
where
    S: ?Sized,
    P: Problem<G> + ?Sized,
{
    fn offspring_count(&self, population_size: usize) -> usize {
        population_size
    }

    fn replace(
        &self,
        previous: &Population<G>,
        offspring: &Population<G>,
        _rng: &mut RandomNumberGenerator,
        _space: &S,
        problem: &P,
    ) -> Result<Vec<Survivor>> {
        if previous.is_empty() {
            return Err(GeneticError::EmptyPopulation);
        }

        best_of_pool(previous, offspring, previous.len(), problem.objective())
    }
}

self_describing!(PlusSelectionReplacer => ReplacerDescription, Replacer);
