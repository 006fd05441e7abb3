use std::cmp::Ordering;

use rand::Rng;

use crate::error::{GeneticError, Result};
use crate::operators::Selector;
use crate::population::Population;
use crate::problem::Problem;
use crate::registry::{self_describing, SelectorDescription};
use crate::rng::RandomNumberGenerator;

/// A selector that picks individuals through tournament selection.
///
/// Every selection samples `tournament_size` members with replacement and
/// keeps the best of them. Smaller tournaments favour exploration, larger
/// ones exploitation; a tournament size of 1 is random selection.
///
/// Without a total order a challenger only replaces the current winner when
/// it dominates it, so the first sampled member wins among mutually
/// non-dominated contestants.
///
/// # Examples
///
/// ```
/// use genalps::error::Result;
/// use genalps::objective::{Objective, ObjectiveVector};
/// use genalps::operators::Selector;
/// use genalps::population::{Population, Solution};
/// use genalps::problem::{Problem, Unconstrained};
/// use genalps::rng::RandomNumberGenerator;
/// use genalps::selection::TournamentSelector;
///
/// struct Identity(Objective);
///
/// impl Problem<f64> for Identity {
///     fn objective(&self) -> &Objective {
///         &self.0
///     }
///
///     fn evaluate(&self, x: &f64, _: &mut RandomNumberGenerator) -> Result<ObjectiveVector> {
///         Ok(ObjectiveVector::from(*x))
///     }
/// }
///
/// fn main() -> Result<()> {
///     let population = Population::new(
///         [0.5, 0.8, 0.3, 0.9, 0.1]
///             .iter()
///             .map(|&x| Solution::new(x, ObjectiveVector::from(x)))
///             .collect(),
///     );
///     let problem = Identity(Objective::minimize());
///     let mut rng = RandomNumberGenerator::from_seed(42);
///
///     let selected = TournamentSelector::new(3)?
///         .select(&population, 4, &mut rng, &Unconstrained, &problem)?;
///
///     assert_eq!(selected.len(), 4);
///     Ok(())
/// }
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "TournamentFields"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TournamentSelector {
    tournament_size: usize,
}

/// Deserialized form, checked by [`TournamentSelector::new`].
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct TournamentFields {
    tournament_size: usize,
}

#[cfg(feature = "serde")]
impl TryFrom<TournamentFields> for TournamentSelector {
    type Error = GeneticError;

    fn try_from(fields: TournamentFields) -> Result<Self> {
        Self::new(fields.tournament_size)
    }
}

impl TournamentSelector {
    /// # Errors
    ///
    /// Returns an error if `tournament_size` is 0.
    pub fn new(tournament_size: usize) -> Result<Self> {
        if tournament_size < 1 {
            return Err(GeneticError::Configuration(
                "Tournament size must be at least 1".to_string(),
            ));
        }

        Ok(Self { tournament_size })
    }

    pub fn with_tournament_size(self, tournament_size: usize) -> Result<Self> {
        Self::new(tournament_size)
    }

    pub fn tournament_size(&self) -> usize {
        self.tournament_size
    }
}

impl Default for TournamentSelector {
    fn default() -> Self {
        Self { tournament_size: 2 }
    }
}

impl<G, S, P> Selector<G, S, P> for TournamentSelector
where
    S: ?Sized,
    P: Problem<G> + ?Sized,
{
    fn select(
        &self,
        population: &Population<G>,
        count: usize,
        rng: &mut RandomNumberGenerator,
        _space: &S,
        problem: &P,
    ) -> Result<Vec<usize>> {
        if population.is_empty() {
            return Err(GeneticError::EmptyPopulation);
        }

        let objective = problem.objective();
        let total_order = objective.is_total_order();
        let solutions = population.solutions();
        let size = solutions.len();

        let selected = (0..count)
            .map(|_| {
                let mut winner = rng.gen_range(0..size);
                for _ in 1..self.tournament_size {
                    let challenger = rng.gen_range(0..size);
                    let c = solutions[challenger].objectives();
                    let w = solutions[winner].objectives();
                    let is_better = if total_order {
                        objective.rank_cmp(c, w) == Ordering::Less
                    } else {
                        objective.dominates(c, w)
                    };
                    if is_better {
                        winner = challenger;
                    }
                }
                winner
            })
            .collect();

        Ok(selected)
    }
}

self_describing!(TournamentSelector => SelectorDescription, Selector);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objective::{Direction, Objective, ObjectiveVector};
    use crate::population::Solution;
    use crate::problem::Unconstrained;

    struct Fixed(Objective);

    impl Problem<usize> for Fixed {
        fn objective(&self) -> &Objective {
            &self.0
        }

        fn evaluate(&self, _: &usize, _: &mut RandomNumberGenerator) -> Result<ObjectiveVector> {
            Ok(ObjectiveVector::from(0.0))
        }
    }

    fn population(values: &[Vec<f64>]) -> Population<usize> {
        Population::new(
            values
                .iter()
                .enumerate()
                .map(|(i, v)| Solution::new(i, ObjectiveVector::from(v.clone())))
                .collect(),
        )
    }

    fn scalar_population(values: &[f64]) -> Population<usize> {
        population(&values.iter().map(|v| vec![*v]).collect::<Vec<_>>())
    }

    #[test]
    fn test_tournament_selection() {
        let pop = scalar_population(&[0.5, 0.8, 0.3, 0.9, 0.1]);
        let problem = Fixed(Objective::minimize());
        let mut rng = RandomNumberGenerator::from_seed(42);

        let selected = TournamentSelector::default()
            .select(&pop, 7, &mut rng, &Unconstrained, &problem)
            .unwrap();

        assert_eq!(selected.len(), 7);
        assert!(selected.iter().all(|&i| i < 5));
    }

    #[test]
    fn test_large_tournament_finds_best() {
        let pop = scalar_population(&[0.5, 0.8, 0.3, 0.9, 0.1]);
        let mut rng = RandomNumberGenerator::from_seed(42);

        let minimize = Fixed(Objective::minimize());
        let selected = TournamentSelector::new(200)
            .unwrap()
            .select(&pop, 5, &mut rng, &Unconstrained, &minimize)
            .unwrap();
        assert!(selected.iter().all(|&i| i == 4));

        let maximize = Fixed(Objective::maximize());
        let selected = TournamentSelector::new(200)
            .unwrap()
            .select(&pop, 5, &mut rng, &Unconstrained, &maximize)
            .unwrap();
        assert!(selected.iter().all(|&i| i == 3));
    }

    #[test]
    fn test_selection_pressure() {
        let pop = scalar_population(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
        let problem = Fixed(Objective::minimize());
        let mut rng = RandomNumberGenerator::from_seed(7);

        let selected = TournamentSelector::new(4)
            .unwrap()
            .select(&pop, 2000, &mut rng, &Unconstrained, &problem)
            .unwrap();

        let best = selected.iter().filter(|&&i| i == 0).count();
        let worst = selected.iter().filter(|&&i| i == 7).count();
        assert!(best > worst);
    }

    #[test]
    fn test_tournament_without_total_order_uses_dominance() {
        // Member 2 dominates everyone; 0 and 1 are mutually non-dominated.
        let pop = population(&[vec![1.0, 5.0], vec![5.0, 1.0], vec![0.0, 0.0]]);
        let problem = Fixed(Objective::multi(vec![Direction::Minimize, Direction::Minimize]));
        let mut rng = RandomNumberGenerator::from_seed(3);

        let selected = TournamentSelector::new(100)
            .unwrap()
            .select(&pop, 10, &mut rng, &Unconstrained, &problem)
            .unwrap();

        assert!(selected.iter().all(|&i| i == 2));
    }

    #[test]
    fn test_tournament_selection_empty_population() {
        let pop = scalar_population(&[]);
        let problem = Fixed(Objective::minimize());
        let mut rng = RandomNumberGenerator::from_seed(1);

        let result =
            TournamentSelector::default().select(&pop, 3, &mut rng, &Unconstrained, &problem);

        assert!(matches!(result, Err(GeneticError::EmptyPopulation)));
    }

    #[test]
    fn test_tournament_selection_invalid_size() {
        assert!(TournamentSelector::new(0).is_err());
        assert!(TournamentSelector::default().with_tournament_size(0).is_err());
        assert_eq!(
            TournamentSelector::default()
                .with_tournament_size(5)
                .unwrap()
                .tournament_size(),
            5
        );
    }
}
