//! # GenerationalEngine
//!
//! The step function shared by every single-population algorithm in the
//! crate. Initialization creates and evaluates `population_size` genotypes.
//! Every further generation runs the same pipeline:
//!
//! 1. ask the replacer how many offspring it needs (`count`),
//! 2. select `2 * count` parents, paired consecutively,
//! 3. cross every pair into one offspring,
//! 4. mutate the offspring,
//! 5. evaluate the offspring,
//! 6. let the replacer name the survivors and assemble the new population.
//!
//! The engine is generic over the genotype only. It does not know whether
//! it breeds plain genotypes or wrapped ones, which is how ALPS reuses it
//! for aged genotypes.

use std::fmt;
use std::sync::Arc;

use tracing::trace;

use crate::error::{GeneticError, Result};
use crate::evolution::state::PopulationState;
use crate::metrics::GenerationMetrics;
use crate::operators::{Creator, Crossover, Evaluator, Mutator, Replacer, Selector};
use crate::population::Population;
use crate::rng::RandomNumberGenerator;

/// The operator instances a [`GenerationalEngine`] runs with.
pub struct EngineOperators<G, S: ?Sized, P: ?Sized> {
    pub creator: Arc<dyn Creator<G, S, P>>,
    pub crossover: Arc<dyn Crossover<G, S, P>>,
    /// Applied to every offspring; mutation rates are folded in beforehand.
    pub mutator: Arc<dyn Mutator<G, S, P>>,
    pub evaluator: Arc<dyn Evaluator<G, S, P>>,
    pub selector: Arc<dyn Selector<G, S, P>>,
    pub replacer: Arc<dyn Replacer<G, S, P>>,
}

impl<G, S: ?Sized, P: ?Sized> Clone for EngineOperators<G, S, P> {
    fn clone(&self) -> Self {
        Self {
            creator: Arc::clone(&self.creator),
            crossover: Arc::clone(&self.crossover),
            mutator: Arc::clone(&self.mutator),
            evaluator: Arc::clone(&self.evaluator),
            selector: Arc::clone(&self.selector),
            replacer: Arc::clone(&self.replacer),
        }
    }
}

pub struct GenerationalEngine<G, S: ?Sized, P: ?Sized> {
    operators: EngineOperators<G, S, P>,
    population_size: usize,
}

fn check_len(phase: &str, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(GeneticError::Evolution(format!(
            "{} returned {} items, expected {}",
            phase, actual, expected
        )));
    }
    Ok(())
}

impl<G, S: ?Sized, P: ?Sized> GenerationalEngine<G, S, P>
where
    G: Clone,
{
    pub fn new(operators: EngineOperators<G, S, P>, population_size: usize) -> Result<Self> {
        if population_size == 0 {
            return Err(GeneticError::Configuration(
                "Population size cannot be zero".to_string(),
            ));
        }

        Ok(Self {
            operators,
            population_size,
        })
    }

    pub fn population_size(&self) -> usize {
        self.population_size
    }

    pub fn operators(&self) -> &EngineOperators<G, S, P> {
        &self.operators
    }

    /// Initializes on `None`, otherwise advances one generation.
    pub fn step(
        &self,
        previous: Option<&PopulationState<G>>,
        rng: &mut RandomNumberGenerator,
        space: &S,
        problem: &P,
    ) -> Result<PopulationState<G>> {
        match previous {
            None => self.initialize(rng, space, problem),
            Some(previous) => self.advance(previous, rng, space, problem),
        }
    }

    /// Creates and evaluates the generation-0 population.
    pub fn initialize(
        &self,
        rng: &mut RandomNumberGenerator,
        space: &S,
        problem: &P,
    ) -> Result<PopulationState<G>> {
        let ops = &self.operators;
        let mut metrics = GenerationMetrics::default();

        let genotypes = metrics
            .creation
            .measure(|| ops.creator.create(self.population_size, rng, space, problem))?;
        check_len("Creator", self.population_size, genotypes.len())?;
        trace!(phase = "creation", elapsed = ?metrics.creation.duration);

        let objectives = metrics
            .evaluation
            .measure(|| ops.evaluator.evaluate(&genotypes, rng, space, problem))?;
        trace!(phase = "evaluation", elapsed = ?metrics.evaluation.duration);

        let population = Population::from_parts(genotypes, objectives)?;
        Ok(PopulationState::new(population, 0, metrics))
    }

    /// Breeds the generation following `previous`.
    pub fn advance(
        &self,
        previous: &PopulationState<G>,
        rng: &mut RandomNumberGenerator,
        space: &S,
        problem: &P,
    ) -> Result<PopulationState<G>> {
        let ops = &self.operators;
        let parents_pool = previous.population();
        let size = parents_pool.len();
        let count = ops.replacer.offspring_count(size);
        let mut metrics = GenerationMetrics::default();

        let selected = metrics
            .selection
            .measure(|| ops.selector.select(parents_pool, 2 * count, rng, space, problem))?;
        check_len("Selector", 2 * count, selected.len())?;
        trace!(
            phase = "selection",
            selected = selected.len(),
            elapsed = ?metrics.selection.duration
        );

        let mut parents = parents_pool
            .pick(&selected)?
            .into_iter()
            .map(|solution| solution.into_parts().0);
        let pairs: Vec<(G, G)> =
            std::iter::from_fn(|| Some((parents.next()?, parents.next()?))).collect();

        let offspring = metrics
            .crossover
            .measure(|| ops.crossover.cross(pairs, rng, space, problem))?;
        check_len("Crossover", count, offspring.len())?;
        trace!(phase = "crossover", elapsed = ?metrics.crossover.duration);

        let offspring = metrics
            .mutation
            .measure(|| ops.mutator.mutate(offspring, rng, space, problem))?;
        check_len("Mutator", count, offspring.len())?;
        trace!(phase = "mutation", elapsed = ?metrics.mutation.duration);

        let objectives = metrics
            .evaluation
            .measure(|| ops.evaluator.evaluate(&offspring, rng, space, problem))?;
        trace!(phase = "evaluation", elapsed = ?metrics.evaluation.duration);
        let offspring = Population::from_parts(offspring, objectives)?;

        let survivors = metrics.replacement.measure(|| {
            ops.replacer
                .replace(parents_pool, &offspring, rng, space, problem)
        })?;
        check_len("Replacer", size, survivors.len())?;
        trace!(phase = "replacement", elapsed = ?metrics.replacement.duration);

        let population = Population::assemble(parents_pool, &offspring, &survivors)?;

        Ok(PopulationState::new(
            population,
            previous.generation() + 1,
            *previous.metrics() + metrics,
        ))
    }
}

impl<G, S: ?Sized, P: ?Sized> fmt::Debug for GenerationalEngine<G, S, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationalEngine")
            .field("population_size", &self.population_size)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objective::{Objective, ObjectiveVector};
    use crate::operators::{
        Broadcast, ContextFreeCreator, ContextFreeCrossover, ContextFreeMutator,
        FirstParentCrossover, NoChangeMutator,
    };
    use crate::problem::{Problem, ProblemEvaluator, Unconstrained};
    use crate::replacement::{ElitismReplacer, GenerationalReplacer};
    use crate::registry::{InstanceRegistry, ReplacerDescription};
    use crate::selection::{RandomSelector, TournamentSelector};
    use rand::Rng;

    struct Square(Objective);

    impl Problem<i64> for Square {
        fn objective(&self) -> &Objective {
            &self.0
        }

        fn evaluate(
            &self,
            genotype: &i64,
            _: &mut RandomNumberGenerator,
        ) -> Result<ObjectiveVector> {
            Ok(ObjectiveVector::from((genotype * genotype) as f64))
        }
    }

    #[derive(Clone)]
    struct Uniform;

    impl ContextFreeCreator<i64> for Uniform {
        fn generate(&self, rng: &mut RandomNumberGenerator) -> i64 {
            rng.gen_range(-100..100)
        }
    }

    #[derive(Clone)]
    struct Midpoint;

    impl ContextFreeCrossover<i64> for Midpoint {
        fn recombine(&self, a: &i64, b: &i64, _: &mut RandomNumberGenerator) -> i64 {
            (a + b) / 2
        }
    }

    #[derive(Clone)]
    struct Step;

    impl ContextFreeMutator<i64> for Step {
        fn perturb(&self, genotype: i64, rng: &mut RandomNumberGenerator) -> i64 {
            genotype + rng.gen_range(-3..=3)
        }
    }

    /// Breeds nothing but claims to need offspring.
    struct Barren;

    impl Crossover<i64, Unconstrained, Square> for Barren {
        fn cross(
            &self,
            _: Vec<(i64, i64)>,
            _: &mut RandomNumberGenerator,
            _: &Unconstrained,
            _: &Square,
        ) -> Result<Vec<i64>> {
            Ok(Vec::new())
        }
    }

    type Ops = EngineOperators<i64, Unconstrained, Square>;

    fn elitism(elites: usize) -> Arc<dyn Replacer<i64, Unconstrained, Square>> {
        let description: Arc<dyn ReplacerDescription<i64, Unconstrained, Square>> =
            Arc::new(ElitismReplacer::new(elites));
        InstanceRegistry::new().replacer(&description).unwrap()
    }

    fn operators() -> Ops {
        EngineOperators {
            creator: Arc::new(Broadcast::context_free(Uniform)),
            crossover: Arc::new(Broadcast::context_free(Midpoint)),
            mutator: Arc::new(Broadcast::context_free(Step)),
            evaluator: Arc::new(ProblemEvaluator::new()),
            selector: Arc::new(TournamentSelector::default()),
            replacer: elitism(1),
        }
    }

    fn problem() -> Square {
        Square(Objective::minimize())
    }

    #[test]
    fn test_zero_population_rejected() {
        assert!(matches!(
            GenerationalEngine::new(operators(), 0),
            Err(GeneticError::Configuration(_))
        ));
    }

    #[test]
    fn test_initialize() {
        let engine = GenerationalEngine::new(operators(), 12).unwrap();
        let mut rng = RandomNumberGenerator::from_seed(3);

        let state = engine.initialize(&mut rng, &Unconstrained, &problem()).unwrap();

        assert_eq!(state.generation(), 0);
        assert_eq!(state.population().len(), 12);
        assert_eq!(state.metrics().creation.count, 1);
        assert_eq!(state.metrics().evaluation.count, 1);
        for solution in state.population() {
            let g = *solution.genotype() as f64;
            assert_eq!(solution.objectives()[0], g * g);
        }
    }

    #[test]
    fn test_advance_keeps_size_and_counts_generations() {
        let engine = GenerationalEngine::new(operators(), 10).unwrap();
        let mut rng = RandomNumberGenerator::from_seed(3);
        let problem = problem();

        let mut state = engine.step(None, &mut rng, &Unconstrained, &problem).unwrap();
        for expected in 1..=5 {
            state = engine
                .step(Some(&state), &mut rng, &Unconstrained, &problem)
                .unwrap();
            assert_eq!(state.generation(), expected);
            assert_eq!(state.population().len(), 10);
        }

        let metrics = state.metrics();
        assert_eq!(metrics.creation.count, 1);
        assert_eq!(metrics.evaluation.count, 6);
        assert_eq!(metrics.selection.count, 5);
        assert_eq!(metrics.crossover.count, 5);
        assert_eq!(metrics.mutation.count, 5);
        assert_eq!(metrics.replacement.count, 5);
    }

    #[test]
    fn test_elitism_never_loses_best() {
        let engine = GenerationalEngine::new(operators(), 8).unwrap();
        let mut rng = RandomNumberGenerator::from_seed(17);
        let problem = problem();
        let objective = Objective::minimize();

        let mut state = engine.initialize(&mut rng, &Unconstrained, &problem).unwrap();
        let mut best = state.best(&objective).unwrap().objectives()[0];

        for _ in 0..20 {
            state = engine.advance(&state, &mut rng, &Unconstrained, &problem).unwrap();
            let next_best = state.best(&objective).unwrap().objectives()[0];
            assert!(next_best <= best);
            best = next_best;
        }
    }

    #[test]
    fn test_previous_state_is_untouched() {
        let engine = GenerationalEngine::new(operators(), 6).unwrap();
        let mut rng = RandomNumberGenerator::from_seed(5);
        let problem = problem();

        let initial = engine.initialize(&mut rng, &Unconstrained, &problem).unwrap();
        let snapshot = initial.population().clone();
        let _next = engine.advance(&initial, &mut rng, &Unconstrained, &problem).unwrap();

        assert_eq!(initial.population(), &snapshot);
        assert_eq!(initial.generation(), 0);
    }

    #[test]
    fn test_generational_replacement_with_identity_operators() {
        let description: Arc<dyn ReplacerDescription<i64, Unconstrained, Square>> =
            Arc::new(GenerationalReplacer);
        let ops = EngineOperators {
            crossover: Arc::new(FirstParentCrossover),
            mutator: Arc::new(NoChangeMutator),
            selector: Arc::new(RandomSelector),
            replacer: InstanceRegistry::new().replacer(&description).unwrap(),
            ..operators()
        };
        let engine = GenerationalEngine::new(ops, 5).unwrap();
        let mut rng = RandomNumberGenerator::from_seed(8);
        let problem = problem();

        let initial = engine.initialize(&mut rng, &Unconstrained, &problem).unwrap();
        let next = engine.advance(&initial, &mut rng, &Unconstrained, &problem).unwrap();

        let original: Vec<i64> = initial.population().iter().map(|s| *s.genotype()).collect();
        assert!(next
            .population()
            .iter()
            .all(|s| original.contains(s.genotype())));
    }

    #[test]
    fn test_operator_length_violation() {
        let ops = EngineOperators {
            crossover: Arc::new(Barren),
            ..operators()
        };
        let engine = GenerationalEngine::new(ops, 4).unwrap();
        let mut rng = RandomNumberGenerator::from_seed(1);
        let problem = problem();

        let initial = engine.initialize(&mut rng, &Unconstrained, &problem).unwrap();
        let result = engine.advance(&initial, &mut rng, &Unconstrained, &problem);

        assert!(matches!(result, Err(GeneticError::Evolution(_))));
    }

    #[test]
    fn test_survivors_follow_replacer() {
        let engine = GenerationalEngine::new(operators(), 4).unwrap();
        let mut rng = RandomNumberGenerator::from_seed(42);
        let problem = problem();
        let objective = Objective::minimize();

        let initial = engine.initialize(&mut rng, &Unconstrained, &problem).unwrap();
        let elite = initial.best(&objective).unwrap().objectives().clone();
        let next = engine.advance(&initial, &mut rng, &Unconstrained, &problem).unwrap();

        assert!(next.population().iter().any(|s| s.objectives() == &elite));
        assert_eq!(engine.operators().replacer.offspring_count(4), 3);
    }
}
