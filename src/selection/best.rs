//! Best-of-k selection.
//!
//! Returns the `count` best members in O(n) with
//! [`slice::select_nth_unstable_by`] instead of sorting the whole
//! population. Ties are broken by the partitioning and are unspecified, as
//! is the order of the returned indices.

use crate::error::{GeneticError, Result};
use crate::objective::Objective;
use crate::operators::Selector;
use crate::population::Population;
use crate::problem::Problem;
use crate::registry::{self_describing, SelectorDescription};
use crate::rng::RandomNumberGenerator;

/// Indices of the `count` best members of `population` under
/// [`Objective::rank_cmp`].
///
/// ```
/// use genalps::objective::{Objective, ObjectiveVector};
/// use genalps::population::{Population, Solution};
/// use genalps::selection::best_indices;
///
/// let population = Population::new(
///     [4.0, 1.0, 3.0, 0.5]
///         .iter()
///         .map(|&x| Solution::new(x, ObjectiveVector::from(x)))
///         .collect(),
/// );
///
/// let mut best = best_indices(&population, 2, &Objective::minimize()).unwrap();
/// best.sort();
/// assert_eq!(best, vec![1, 3]);
/// ```
pub fn best_indices<G>(
    population: &Population<G>,
    count: usize,
    objective: &Objective,
) -> Result<Vec<usize>> {
    let size = population.len();
    if size == 0 {
        return Err(GeneticError::EmptyPopulation);
    }
    if count > size {
        return Err(GeneticError::Configuration(format!(
            "Cannot select the best {} of a population of {}",
            count, size
        )));
    }

    let solutions = population.solutions();
    let cmp = |a: &usize, b: &usize| {
        objective.rank_cmp(solutions[*a].objectives(), solutions[*b].objectives())
    };

    match count {
        0 => Ok(Vec::new()),
        1 => {
            let best = (1..size).fold(0, |best, i| {
                if cmp(&i, &best).is_lt() {
                    i
                } else {
                    best
                }
            });
            Ok(vec![best])
        }
        // Covers populations of one and two members.
        _ if count == size => Ok((0..size).collect()),
        _ => {
            let mut indices: Vec<usize> = (0..size).collect();
            indices.select_nth_unstable_by(count - 1, cmp);
            indices.truncate(count);
            Ok(indices)
        }
    }
}

/// Selects the `count` best members, each at most once.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BestSelector;

impl BestSelector {
    pub fn new() -> Self {
        Self
    }
}

impl<G, S, P> Selector<G, S, P> for BestSelector
where
    S: ?Sized,
    P: Problem<G> + ?Sized,
{
    fn select(
        &self,
        population: &Population<G>,
        count: usize,
        _rng: &mut RandomNumberGenerator,
        _space: &S,
        problem: &P,
    ) -> Result<Vec<usize>> {
        best_indices(population, count, problem.objective())
    }
}

self_describing!(BestSelector => SelectorDescription, Selector);
