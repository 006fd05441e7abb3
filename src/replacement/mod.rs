//! # Replacement
//!
//! A replacer decides how many offspring each generation needs
//! ([`Replacer::offspring_count`]) and which members of the previous
//! population and of the evaluated offspring form the next population.
//! It names them with [`Survivor`]s; the engine assembles the population.
//!
//! Every replacer keeps the population size constant.

pub mod elitism;
pub mod generational;
pub mod plus;

pub use elitism::ElitismReplacer;
pub use generational::GenerationalReplacer;
pub use plus::PlusSelectionReplacer;

use crate::error::Result;
use crate::objective::Objective;
use crate::population::{Population, Solution, Survivor};
use crate::selection::best_indices;

/// Maps an index into `previous ++ offspring` back to its origin.
pub(crate) fn pooled_survivor(index: usize, previous_len: usize) -> Survivor {
    if index < previous_len {
        Survivor::Previous(index)
    } else {
        Survivor::Offspring(index - previous_len)
    }
}

/// The `count` best members of `previous ++ offspring`.
pub(crate) fn best_of_pool<G>(
    previous: &Population<G>,
    offspring: &Population<G>,
    count: usize,
    objective: &Objective,
) -> Result<Vec<Survivor>> {
    let tags: Population<Survivor> = Population::new(
        previous
            .iter()
            .enumerate()
            .map(|(i, s)| Solution::new(Survivor::Previous(i), s.objectives().clone()))
            .chain(
                offspring
                    .iter()
                    .enumerate()
                    .map(|(i, s)| Solution::new(Survivor::Offspring(i), s.objectives().clone())),
            )
            .collect(),
    );

    Ok(best_indices(&tags, count, objective)?
        .into_iter()
        .map(|i| pooled_survivor(i, previous.len()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objective::ObjectiveVector;

    fn population(values: &[f64]) -> Population<u8> {
        Population::new(
            values
                .iter()
                .map(|&v| Solution::new(0, ObjectiveVector::from(v)))
                .collect(),
        )
    }

    #[test]
    fn test_pooled_survivor() {
        assert_eq!(pooled_survivor(1, 3), Survivor::Previous(1));
        assert_eq!(pooled_survivor(3, 3), Survivor::Offspring(0));
        assert_eq!(pooled_survivor(5, 3), Survivor::Offspring(2));
    }

    #[test]
    fn test_best_of_pool() {
        let previous = population(&[5.0, 1.0, 4.0]);
        let offspring = population(&[0.5, 9.0]);

        let mut best = best_of_pool(&previous, &offspring, 2, &Objective::minimize()).unwrap();
        best.sort_by_key(|s| match s {
            Survivor::Previous(i) => *i,
            Survivor::Offspring(i) => 100 + *i,
        });

        assert_eq!(best, vec![Survivor::Previous(1), Survivor::Offspring(0)]);
    }
}
