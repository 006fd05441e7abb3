use crate::error::{GeneticError, Result};
use crate::operators::Replacer;
use crate::population::{Population, Survivor};
use crate::registry::{self_describing, ReplacerDescription};
use crate::rng::RandomNumberGenerator;

/// The offspring replace the whole previous population.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerationalReplacer;

impl<G, S: ?Sized, P: ?Sized> Replacer<G, S, P> for GenerationalReplacer {
    fn offspring_count(&self, population_size: usize) -> usize {
        population_size
    }

    fn replace(
        &self,
        previous: &Population<G>,
        offspring: &Population<G>,
        _rng: &mut RandomNumberGenerator,
        _space: &S,
        _problem: &P,
    ) -> Result<Vec<Survivor>> {
        if offspring.len() < previous.len() {
            return Err(GeneticError::Evolution(format!(
                "Expected {} offspring, received {}",
                previous.len(),
                offspring.len()
            )));
        }

        Ok((0..previous.len()).map(Survivor::Offspring).collect())
    }
}

self_describing!(GenerationalReplacer => ReplacerDescription, Replacer);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objective::ObjectiveVector;
    use crate::population::Solution;
    use crate::problem::Unconstrained;

    fn population(size: usize) -> Population<usize> {
        Population::new(
            (0..size)
                .map(|i| Solution::new(i, ObjectiveVector::from(i as f64)))
                .collect(),
        )
    }

    #[test]
    fn test_offspring_replace_everything() {
        let mut rng = RandomNumberGenerator::from_seed(0);
        let replacer = GenerationalReplacer;

        assert_eq!(Replacer::<usize, Unconstrained, ()>::offspring_count(&replacer, 4), 4);

        let survivors = replacer
            .replace(&population(4), &population(4), &mut rng, &Unconstrained, &())
            .unwrap();

        assert_eq!(
            survivors,
            (0..4).map(Survivor::Offspring).collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_too_few_offspring() {
        let mut rng = RandomNumberGenerator::from_seed(0);
        let result = GenerationalReplacer.replace(
            &population(4),
            &population(2),
            &mut rng,
            &Unconstrained,
            &(),
        );
        assert!(result.is_err());
    }
}
