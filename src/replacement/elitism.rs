use std::fmt;
use std::sync::Arc;

use crate::error::{GeneticError, Result};
use crate::operators::{Replacer, Selector};
use crate::population::{Population, Survivor};
use crate::problem::Problem;
use crate::registry::{InstanceRegistry, ReplacerDescription, SelectorDescription};
use crate::replacement::pooled_survivor;
use crate::rng::RandomNumberGenerator;
use crate::selection::best_indices;

/// Keeps the `elites` best members of the previous population.
///
/// The remaining `N - elites` places go to the offspring, in order. With an
/// inner selector they are instead chosen by that selector from the previous
/// population and the offspring together.
///
/// `offspring_count(N) = N - elites`.
pub struct ElitismReplacer<G, S: ?Sized, P: ?Sized> {
    elites: usize,
    selector: Option<Arc<dyn SelectorDescription<G, S, P>>>,
}

impl<G, S: ?Sized, P: ?Sized> ElitismReplacer<G, S, P> {
    pub fn new(elites: usize) -> Self {
        Self {
            elites,
            selector: None,
        }
    }

    /// Fills the non-elite places with `selector` over previous and offspring.
    pub fn with_selector(mut self, selector: Arc<dyn SelectorDescription<G, S, P>>) -> Self {
        self.selector = Some(selector);
        self
    }

    pub fn elites(&self) -> usize {
        self.elites
    }
}

impl<G, S: ?Sized, P: ?Sized> Clone for ElitismReplacer<G, S, P> {
    fn clone(&self) -> Self {
        Self {
            elites: self.elites,
            selector: self.selector.clone(),
        }
    }
}

impl<G, S: ?Sized, P: ?Sized> fmt::Debug for ElitismReplacer<G, S, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElitismReplacer")
            .field("elites", &self.elites)
            .field("selector", &self.selector.is_some())
            .finish()
    }
}

struct ElitismInstance<G, S: ?Sized, P: ?Sized> {
    elites: usize,
    selector: Option<Arc<dyn Selector<G, S, P>>>,
}

impl<G, S, P> Replacer<G, S, P> for ElitismInstance<G, S, P>
where
    G: Clone,
    S: ?Sized,
    P: Problem<G> + ?Sized,
{
    fn offspring_count(&self, population_size: usize) -> usize {
        population_size.saturating_sub(self.elites)
    }

    fn replace(
        &self,
        previous: &Population<G>,
        offspring: &Population<G>,
        rng: &mut RandomNumberGenerator,
        space: &S,
        problem: &P,
    ) -> Result<Vec<Survivor>> {
        let size = previous.len();
        if size == 0 {
            return Err(GeneticError::EmptyPopulation);
        }
        if self.elites > size {
            return Err(GeneticError::Configuration(format!(
                "Cannot keep {} elites in a population of {}",
                self.elites, size
            )));
        }

        let mut survivors: Vec<Survivor> = best_indices(previous, self.elites, problem.objective())?
            .into_iter()
            .map(Survivor::Previous)
            .collect();
        let remaining = size - self.elites;

        match &self.selector {
            None => {
                if offspring.len() < remaining {
                    return Err(GeneticError::Evolution(format!(
                        "Expected {} offspring, received {}",
                        remaining,
                        offspring.len()
                    )));
                }
                survivors.extend((0..remaining).map(Survivor::Offspring));
            }
            Some(selector) => {
                let pool =
                    Population::new(previous.iter().chain(offspring.iter()).cloned().collect());
                let chosen = selector.select(&pool, remaining, rng, space, problem)?;
                survivors.extend(chosen.into_iter().map(|i| pooled_survivor(i, size)));
            }
        }

        Ok(survivors)
    }
}

impl<G, S, P> ReplacerDescription<G, S, P> for ElitismReplacer<G, S, P>
where
    G: Clone + 'static,
    S: ?Sized + 'static,
    P: Problem<G> + ?Sized + 'static,
{
    fn create_instance(
        &self,
        registry: &mut InstanceRegistry,
    ) -> Result<Arc<dyn Replacer<G, S, P>>> {
        let selector = match &self.selector {
            Some(description) => Some(registry.selector(description)?),
            None => None,
        };

        Ok(Arc::new(ElitismInstance {
            elites: self.elites,
            selector,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objective::{Objective, ObjectiveVector};
    use crate::population::Solution;
    use crate::problem::Unconstrained;
    use crate::selection::{BestSelector, RandomSelector};

    struct Minimize(Objective);

    impl Problem<u32> for Minimize {
        fn objective(&self) -> &Objective {
            &self.0
        }

        fn evaluate(&self, _: &u32, _: &mut RandomNumberGenerator) -> Result<ObjectiveVector> {
            Ok(ObjectiveVector::from(0.0))
        }
    }

    type Replace = Arc<dyn Replacer<u32, Unconstrained, Minimize>>;

    fn instantiate(description: ElitismReplacer<u32, Unconstrained, Minimize>) -> Replace {
        let description: Arc<dyn ReplacerDescription<u32, Unconstrained, Minimize>> =
            Arc::new(description);
        InstanceRegistry::new().replacer(&description).unwrap()
    }

    fn population(first_id: u32, values: &[f64]) -> Population<u32> {
        Population::new(
            values
                .iter()
                .enumerate()
                .map(|(i, &v)| Solution::new(first_id + i as u32, ObjectiveVector::from(v)))
                .collect(),
        )
    }

    #[test]
    fn test_offspring_count() {
        let replacer = instantiate(ElitismReplacer::new(2));
        assert_eq!(replacer.offspring_count(10), 8);
        assert_eq!(replacer.offspring_count(1), 0);
    }

    #[test]
    fn test_elites_and_offspring() {
        let mut rng = RandomNumberGenerator::from_seed(1);
        let problem = Minimize(Objective::minimize());
        let previous = population(0, &[4.0, 1.0, 3.0, 2.0]);
        let offspring = population(10, &[0.5, 9.0]);

        let survivors = instantiate(ElitismReplacer::new(2))
            .replace(&previous, &offspring, &mut rng, &Unconstrained, &problem)
            .unwrap();

        assert_eq!(survivors.len(), 4);
        let mut elites: Vec<Survivor> = survivors[..2].to_vec();
        elites.sort_by_key(|s| match s {
            Survivor::Previous(i) => *i,
            Survivor::Offspring(i) => 100 + *i,
        });
        assert_eq!(elites, vec![Survivor::Previous(1), Survivor::Previous(3)]);
        assert_eq!(&survivors[2..], &[Survivor::Offspring(0), Survivor::Offspring(1)]);
    }

    #[test]
    fn test_elites_survive_any_selector() {
        let mut rng = RandomNumberGenerator::from_seed(3);
        let problem = Minimize(Objective::minimize());
        let previous = population(0, &[4.0, 1.0, 3.0, 2.0, 6.0]);
        let offspring = population(10, &[0.5, 9.0, 7.0, 8.0]);

        let replacer = instantiate(ElitismReplacer::new(1).with_selector(Arc::new(RandomSelector)));

        for _ in 0..20 {
            let survivors = replacer
                .replace(&previous, &offspring, &mut rng, &Unconstrained, &problem)
                .unwrap();
            assert_eq!(survivors.len(), 5);
            assert!(survivors.contains(&Survivor::Previous(1)));
        }
    }

    #[test]
    fn test_selector_over_pool() {
        let mut rng = RandomNumberGenerator::from_seed(3);
        let problem = Minimize(Objective::minimize());
        let previous = population(0, &[4.0, 1.0, 3.0]);
        let offspring = population(10, &[0.5, 9.0]);

        let survivors = instantiate(ElitismReplacer::new(1).with_selector(Arc::new(BestSelector)))
            .replace(&previous, &offspring, &mut rng, &Unconstrained, &problem)
            .unwrap();
        let next = Population::assemble(&previous, &offspring, &survivors).unwrap();

        let mut values: Vec<f64> = next.iter().map(|s| s.objectives()[0]).collect();
        values.sort_by(|a, b| a.partial_cmp(b).unwrap());
        // The elite (1.0) plus the two best of the pool (0.5 and 1.0 again).
        assert_eq!(values, vec![0.5, 1.0, 1.0]);
    }

    #[test]
    fn test_too_many_elites() {
        let mut rng = RandomNumberGenerator::from_seed(1);
        let problem = Minimize(Objective::minimize());

        let result = instantiate(ElitismReplacer::new(5)).replace(
            &population(0, &[1.0, 2.0]),
            &population(10, &[]),
            &mut rng,
            &Unconstrained,
            &problem,
        );

        assert!(matches!(result, Err(GeneticError::Configuration(_))));
    }

    #[test]
    fn test_all_elites_needs_no_offspring() {
        let mut rng = RandomNumberGenerator::from_seed(1);
        let problem = Minimize(Objective::minimize());
        let previous = population(0, &[2.0, 1.0]);

        let survivors = instantiate(ElitismReplacer::new(2))
            .replace(&previous, &population(10, &[]), &mut rng, &Unconstrained, &problem)
            .unwrap();

        assert_eq!(survivors.len(), 2);
        assert!(survivors.iter().all(|s| matches!(s, Survivor::Previous(_))));
    }
}
