//! # Aging wrappers
//!
//! Each wrapper turns an operator over `G` into the same kind of operator
//! over [`AgedGenotype<G>`]. The wrapper strips ages, calls the inner
//! operator unchanged and puts ages back on the results:
//!
//! | kind       | age of each output                                   |
//! |------------|------------------------------------------------------|
//! | creator    | 0                                                    |
//! | crossover  | `max(parent ages) + 1`, matched to its parent pair   |
//! | mutator    | age of the input at the same position                |
//! | selector   | unchanged; the selected indices are passed through   |
//! | replacer   | unchanged; the survivors are passed through          |
//!
//! Ages are recovered through positions, indices and [`Survivor`]s, never by
//! comparing genotypes. An inner operator that breaks its positional
//! contract (returns too few items, or an index out of range) makes the
//! wrapper fail with [`GeneticError::Lifting`].
//!
//! The search space and the problem are passed through unwrapped.

use std::sync::{Arc, Mutex};

use crate::alps::genotype::AgedGenotype;
use crate::alps::state::AlpsState;
use crate::error::{GeneticError, Result};
use crate::evolution::state::PopulationState;
use crate::objective::ObjectiveVector;
use crate::operators::{Creator, Crossover, Evaluator, Mutator, Replacer, Selector};
use crate::population::{Population, Survivor};
use crate::rng::RandomNumberGenerator;
use crate::termination::Terminator;

fn check_count(kind: &str, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(GeneticError::Lifting(format!(
            "inner {} returned {} items for {} inputs",
            kind, actual, expected
        )));
    }
    Ok(())
}

fn strip<G: Clone>(population: &Population<AgedGenotype<G>>) -> Population<G> {
    population.map_genotypes(|aged| aged.inner().clone())
}

pub struct AgingCreator<G, S: ?Sized, P: ?Sized> {
    inner: Arc<dyn Creator<G, S, P>>,
}

impl<G, S: ?Sized, P: ?Sized> AgingCreator<G, S, P> {
    pub fn new(inner: Arc<dyn Creator<G, S, P>>) -> Self {
        Self { inner }
    }
}

impl<G, S: ?Sized, P: ?Sized> Creator<AgedGenotype<G>, S, P> for AgingCreator<G, S, P> {
    fn create(
        &self,
        count: usize,
        rng: &mut RandomNumberGenerator,
        space: &S,
        problem: &P,
    ) -> Result<Vec<AgedGenotype<G>>> {
        let genotypes = self.inner.create(count, rng, space, problem)?;
        check_count("creator", count, genotypes.len())?;

        Ok(genotypes.into_iter().map(AgedGenotype::newborn).collect())
    }
}

pub struct AgingCrossover<G, S: ?Sized, P: ?Sized> {
    inner: Arc<dyn Crossover<G, S, P>>,
}

impl<G, S: ?Sized, P: ?Sized> AgingCrossover<G, S, P> {
    pub fn new(inner: Arc<dyn Crossover<G, S, P>>) -> Self {
        Self { inner }
    }
}

impl<G, S: ?Sized, P: ?Sized> Crossover<AgedGenotype<G>, S, P> for AgingCrossover<G, S, P> {
    fn cross(
        &self,
        parents: Vec<(AgedGenotype<G>, AgedGenotype<G>)>,
        rng: &mut RandomNumberGenerator,
        space: &S,
        problem: &P,
    ) -> Result<Vec<AgedGenotype<G>>> {
        let (ages, pairs): (Vec<usize>, Vec<(G, G)>) = parents
            .into_iter()
            .map(|(a, b)| (a.age().max(b.age()) + 1, (a.into_inner(), b.into_inner())))
            .unzip();

        let offspring = self.inner.cross(pairs, rng, space, problem)?;
        check_count("crossover", ages.len(), offspring.len())?;

        Ok(offspring
            .into_iter()
            .zip(ages)
            .map(|(genotype, age)| AgedGenotype::new(genotype, age))
            .collect())
    }
}

pub struct AgingMutator<G, S: ?Sized, P: ?Sized> {
    inner: Arc<dyn Mutator<G, S, P>>,
}

impl<G, S: ?Sized, P: ?Sized> AgingMutator<G, S, P> {
    pub fn new(inner: Arc<dyn Mutator<G, S, P>>) -> Self {
        Self { inner }
    }
}

impl<G, S: ?Sized, P: ?Sized> Mutator<AgedGenotype<G>, S, P> for AgingMutator<G, S, P> {
    fn mutate(
        &self,
        genotypes: Vec<AgedGenotype<G>>,
        rng: &mut RandomNumberGenerator,
        space: &S,
        problem: &P,
    ) -> Result<Vec<AgedGenotype<G>>> {
        let (inner, ages): (Vec<G>, Vec<usize>) =
            genotypes.into_iter().map(AgedGenotype::into_parts).unzip();

        let mutated = self.inner.mutate(inner, rng, space, problem)?;
        check_count("mutator", ages.len(), mutated.len())?;

        Ok(mutated
            .into_iter()
            .zip(ages)
            .map(|(genotype, age)| AgedGenotype::new(genotype, age))
            .collect())
    }
}

/// Evaluates aged genotypes by their inner genotype; age never affects
/// fitness.
pub struct AgingEvaluator<G, S: ?Sized, P: ?Sized> {
    inner: Arc<dyn Evaluator<G, S, P>>,
}

impl<G, S: ?Sized, P: ?Sized> AgingEvaluator<G, S, P> {
    pub fn new(inner: Arc<dyn Evaluator<G, S, P>>) -> Self {
        Self { inner }
    }
}

impl<G: Clone, S: ?Sized, P: ?Sized> Evaluator<AgedGenotype<G>, S, P> for AgingEvaluator<G, S, P> {
    fn evaluate(
        &self,
        genotypes: &[AgedGenotype<G>],
        rng: &mut RandomNumberGenerator,
        space: &S,
        problem: &P,
    ) -> Result<Vec<ObjectiveVector>> {
        let inner: Vec<G> = genotypes.iter().map(|aged| aged.inner().clone()).collect();

        let objectives = self.inner.evaluate(&inner, rng, space, problem)?;
        check_count("evaluator", genotypes.len(), objectives.len())?;

        Ok(objectives)
    }
}

pub struct AgingSelector<G, S: ?Sized, P: ?Sized> {
    inner: Arc<dyn Selector<G, S, P>>,
}

impl<G, S: ?Sized, P: ?Sized> AgingSelector<G, S, P> {
    pub fn new(inner: Arc<dyn Selector<G, S, P>>) -> Self {
        Self { inner }
    }
}

impl<G: Clone, S: ?Sized, P: ?Sized> Selector<AgedGenotype<G>, S, P> for AgingSelector<G, S, P> {
    fn select(
        &self,
        population: &Population<AgedGenotype<G>>,
        count: usize,
        rng: &mut RandomNumberGenerator,
        space: &S,
        problem: &P,
    ) -> Result<Vec<usize>> {
        let indices = self
            .inner
            .select(&strip(population), count, rng, space, problem)?;
        check_count("selector", count, indices.len())?;

        if let Some(&index) = indices.iter().find(|&&i| i >= population.len()) {
            return Err(GeneticError::Lifting(format!(
                "inner selector returned index {} for a population of {}",
                index,
                population.len()
            )));
        }

        Ok(indices)
    }
}

pub struct AgingReplacer<G, S: ?Sized, P: ?Sized> {
    inner: Arc<dyn Replacer<G, S, P>>,
}

impl<G, S: ?Sized, P: ?Sized> AgingReplacer<G, S, P> {
    pub fn new(inner: Arc<dyn Replacer<G, S, P>>) -> Self {
        Self { inner }
    }
}

impl<G: Clone, S: ?Sized, P: ?Sized> Replacer<AgedGenotype<G>, S, P> for AgingReplacer<G, S, P> {
    fn offspring_count(&self, population_size: usize) -> usize {
        self.inner.offspring_count(population_size)
    }

    fn replace(
        &self,
        previous: &Population<AgedGenotype<G>>,
        offspring: &Population<AgedGenotype<G>>,
        rng: &mut RandomNumberGenerator,
        space: &S,
        problem: &P,
    ) -> Result<Vec<Survivor>> {
        let survivors =
            self.inner
                .replace(&strip(previous), &strip(offspring), rng, space, problem)?;

        for survivor in &survivors {
            let (index, len) = match *survivor {
                Survivor::Previous(i) => (i, previous.len()),
                Survivor::Offspring(i) => (i, offspring.len()),
            };
            if index >= len {
                return Err(GeneticError::Lifting(format!(
                    "inner replacer returned {:?} for {} previous and {} offspring",
                    survivor,
                    previous.len(),
                    offspring.len()
                )));
            }
        }

        Ok(survivors)
    }
}

/// Lets a terminator written against [`PopulationState<G>`] decide on
/// [`AlpsState<G>`]s.
///
/// The terminator sees the first layer with ages stripped, the state's
/// generation and its metrics. The latest projection is kept, so the state
/// passed as `previous` on the next call is not stripped again.
pub struct AgingTerminator<G, S: ?Sized, P: ?Sized> {
    inner: Arc<dyn Terminator<PopulationState<G>, S, P>>,
    last: Mutex<Option<Projection<G>>>,
}

struct Projection<G> {
    source: Population<AgedGenotype<G>>,
    generation: usize,
    state: PopulationState<G>,
}

impl<G, S: ?Sized, P: ?Sized> AgingTerminator<G, S, P> {
    pub fn new(inner: Arc<dyn Terminator<PopulationState<G>, S, P>>) -> Self {
        Self {
            inner,
            last: Mutex::new(None),
        }
    }
}

fn project<G: Clone>(state: &AlpsState<G>) -> PopulationState<G> {
    PopulationState::new(strip(state.population()), state.generation(), *state.metrics())
}

impl<G: Clone, S: ?Sized, P: ?Sized> AgingTerminator<G, S, P> {
    fn projected(&self, state: &AlpsState<G>) -> PopulationState<G> {
        let Ok(mut last) = self.last.lock() else {
            return project(state);
        };

        if let Some(cached) = last.as_ref() {
            if cached.generation == state.generation()
                && cached.source.ptr_eq(state.population())
            {
                return cached.state.clone();
            }
        }

        let projected = project(state);
        *last = Some(Projection {
            source: state.population().clone(),
            generation: state.generation(),
            state: projected.clone(),
        });
        projected
    }
}

impl<G, S, P> Terminator<AlpsState<G>, S, P> for AgingTerminator<G, S, P>
where
    G: Clone + Send + Sync,
    S: ?Sized,
    P: ?Sized,
{
    fn should_terminate(
        &self,
        current: &AlpsState<G>,
        previous: Option<&AlpsState<G>>,
        space: &S,
        problem: &P,
    ) -> bool {
        // Previous first: it is the state cached by the last call.
        let previous = previous.map(|state| self.projected(state));
        let current = self.projected(current);

        self.inner
            .should_terminate(&current, previous.as_ref(), space, problem)
    }
}
