use std::fmt;
use std::sync::Arc;

use tracing::{debug, info_span};

use crate::alps::genotype::AgedGenotype;
use crate::alps::lifting::{
    AgingCreator, AgingCrossover, AgingEvaluator, AgingMutator, AgingReplacer, AgingSelector,
    AgingTerminator,
};
use crate::alps::state::AlpsState;
use crate::alps::AlpsOptions;
use crate::error::{GeneticError, Result};
use crate::evolution::algorithm::IterativeAlgorithm;
use crate::evolution::driver::{AlgorithmDriver, RunOutcome};
use crate::evolution::engine::{EngineOperators, GenerationalEngine};
use crate::evolution::state::PopulationState;
use crate::operators::MultiMutator;
use crate::problem::{Problem, ProblemEvaluator, SearchSpace};
use crate::registry::{
    CreatorDescription, CrossoverDescription, EvaluatorDescription, InstanceRegistry,
    MutatorDescription, ReplacerDescription, SelectorDescription, TerminatorDescription,
};
use crate::rng::RandomNumberGenerator;
use crate::termination::Terminator;

/// Description of an ALPS run over genotypes `G`.
///
/// All operators are configured over `G`; ages are handled by lifting them
/// when a run starts. The terminator is written against
/// [`PopulationState<G>`] and sees the population with ages stripped.
pub struct Alps<G, S: ?Sized, P: ?Sized> {
    options: AlpsOptions,
    creator: Arc<dyn CreatorDescription<G, S, P>>,
    crossover: Arc<dyn CrossoverDescription<G, S, P>>,
    /// The configured mutator behind the mutation rate.
    mutator: Arc<dyn MutatorDescription<G, S, P>>,
    evaluator: Arc<dyn EvaluatorDescription<G, S, P>>,
    selector: Arc<dyn SelectorDescription<G, S, P>>,
    replacer: Arc<dyn ReplacerDescription<G, S, P>>,
    terminator: Arc<dyn TerminatorDescription<PopulationState<G>, S, P>>,
}

impl<G, S, P> Alps<G, S, P>
where
    G: Clone + Send + Sync + 'static,
    S: ?Sized + 'static,
    P: Problem<G> + ?Sized + 'static,
{
    pub fn builder() -> AlpsBuilder<G, S, P> {
        AlpsBuilder::new()
    }

    pub fn options(&self) -> &AlpsOptions {
        &self.options
    }

    /// Materializes every operator in `registry` and lifts it to aged
    /// genotypes.
    pub fn create_instance(
        &self,
        registry: &mut InstanceRegistry,
    ) -> Result<AlpsInstance<G, S, P>> {
        let operators = EngineOperators {
            creator: Arc::new(AgingCreator::new(registry.creator(&self.creator)?)),
            crossover: Arc::new(AgingCrossover::new(registry.crossover(&self.crossover)?)),
            mutator: Arc::new(AgingMutator::new(registry.mutator(&self.mutator)?)),
            evaluator: Arc::new(AgingEvaluator::new(registry.evaluator(&self.evaluator)?)),
            selector: Arc::new(AgingSelector::new(registry.selector(&self.selector)?)),
            replacer: Arc::new(AgingReplacer::new(registry.replacer(&self.replacer)?)),
        };

        Ok(AlpsInstance {
            engine: GenerationalEngine::new(operators, self.options.get_population_size())?,
        })
    }

    /// Materializes the terminator in `registry`, lifted to [`AlpsState`].
    pub fn create_terminator(
        &self,
        registry: &mut InstanceRegistry,
    ) -> Result<Arc<dyn Terminator<AlpsState<G>, S, P>>> {
        let inner = registry.terminator(&self.terminator)?;
        Ok(Arc::new(AgingTerminator::new(inner)))
    }

    /// Builds a driver backed by a fresh registry.
    pub fn driver(&self) -> Result<AlgorithmDriver<AlpsInstance<G, S, P>, S, P>> {
        let mut registry = InstanceRegistry::new();
        let instance = self.create_instance(&mut registry)?;
        let terminator = self.create_terminator(&mut registry)?;

        Ok(AlgorithmDriver::new(instance, terminator))
    }

    /// Runs ALPS to termination.
    pub fn execute(
        &self,
        rng: &mut RandomNumberGenerator,
        space: &S,
        problem: &P,
    ) -> Result<RunOutcome<AlpsState<G>>> {
        let span = info_span!(
            "alps",
            population_size = self.options.get_population_size(),
            mutation_rate = self.options.get_mutation_rate()
        );
        let _guard = span.enter();

        self.driver()?.run(rng, space, problem)
    }
}

impl<G, S: ?Sized, P: ?Sized> Clone for Alps<G, S, P> {
    fn clone(&self) -> Self {
        Self {
            options: self.options.clone(),
            creator: Arc::clone(&self.creator),
            crossover: Arc::clone(&self.crossover),
            mutator: Arc::clone(&self.mutator),
            evaluator: Arc::clone(&self.evaluator),
            selector: Arc::clone(&self.selector),
            replacer: Arc::clone(&self.replacer),
            terminator: Arc::clone(&self.terminator),
        }
    }
}

impl<G, S: ?Sized, P: ?Sized> fmt::Debug for Alps<G, S, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Alps")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// The per-run side of [`Alps`]: the generational engine over aged
/// genotypes.
pub struct AlpsInstance<G, S: ?Sized, P: ?Sized> {
    engine: GenerationalEngine<AgedGenotype<G>, S, P>,
}

impl<G, S: ?Sized, P: ?Sized> AlpsInstance<G, S, P> {
    pub fn engine(&self) -> &GenerationalEngine<AgedGenotype<G>, S, P> {
        &self.engine
    }
}

impl<G, S, P> IterativeAlgorithm<S, P> for AlpsInstance<G, S, P>
where
    G: Clone + Send + Sync,
    S: ?Sized,
    P: Problem<G> + ?Sized,
{
    type State = AlpsState<G>;

    fn execute_step(
        &self,
        previous: Option<&AlpsState<G>>,
        rng: &mut RandomNumberGenerator,
        space: &S,
        problem: &P,
    ) -> Result<AlpsState<G>> {
        let state: AlpsState<G> = match previous {
            None => self.engine.initialize(rng, space, problem)?,
            Some(previous) => {
                self.engine
                    .advance(&previous.to_population_state(), rng, space, problem)?
            }
        }
        .into();

        debug!(
            generation = state.generation(),
            population_size = state.population().len(),
            max_age = state.max_age(),
            best = ?state.best(problem.objective()).map(|s| s.objectives()),
            "Generation complete"
        );

        Ok(state)
    }
}

/// Builder for [`Alps`].
///
/// Every operator must be provided except the evaluator, which defaults to
/// a [`ProblemEvaluator`] using the options' parallel threshold. Options
/// default to [`AlpsOptions::default`].
pub struct AlpsBuilder<G, S: ?Sized, P: ?Sized> {
    options: Option<AlpsOptions>,
    creator: Option<Arc<dyn CreatorDescription<G, S, P>>>,
    crossover: Option<Arc<dyn CrossoverDescription<G, S, P>>>,
    mutator: Option<Arc<dyn MutatorDescription<G, S, P>>>,
    evaluator: Option<Arc<dyn EvaluatorDescription<G, S, P>>>,
    selector: Option<Arc<dyn SelectorDescription<G, S, P>>>,
    replacer: Option<Arc<dyn ReplacerDescription<G, S, P>>>,
    terminator: Option<Arc<dyn TerminatorDescription<PopulationState<G>, S, P>>>,
}

impl<G, S: ?Sized, P: ?Sized> AlpsBuilder<G, S, P> {
    pub fn new() -> Self {
        Self {
            options: None,
            creator: None,
            crossover: None,
            mutator: None,
            evaluator: None,
            selector: None,
            replacer: None,
            terminator: None,
        }
    }

    pub fn with_options(mut self, options: AlpsOptions) -> Self {
        self.options = Some(options);
        self
    }

    pub fn with_creator(mut self, creator: Arc<dyn CreatorDescription<G, S, P>>) -> Self {
        self.creator = Some(creator);
        self
    }

    pub fn with_crossover(mut self, crossover: Arc<dyn CrossoverDescription<G, S, P>>) -> Self {
        self.crossover = Some(crossover);
        self
    }

    pub fn with_mutator(mut self, mutator: Arc<dyn MutatorDescription<G, S, P>>) -> Self {
        self.mutator = Some(mutator);
        self
    }

    pub fn with_evaluator(mut self, evaluator: Arc<dyn EvaluatorDescription<G, S, P>>) -> Self {
        self.evaluator = Some(evaluator);
        self
    }

    pub fn with_selector(mut self, selector: Arc<dyn SelectorDescription<G, S, P>>) -> Self {
        self.selector = Some(selector);
        self
    }

    pub fn with_replacer(mut self, replacer: Arc<dyn ReplacerDescription<G, S, P>>) -> Self {
        self.replacer = Some(replacer);
        self
    }

    pub fn with_terminator(
        mut self,
        terminator: Arc<dyn TerminatorDescription<PopulationState<G>, S, P>>,
    ) -> Self {
        self.terminator = Some(terminator);
        self
    }
}

impl<G, S, P> AlpsBuilder<G, S, P>
where
    G: Clone + Send + Sync + 'static,
    S: SearchSpace<G> + ?Sized + 'static,
    P: Problem<G> + ?Sized + 'static,
{
    pub fn build(self) -> Result<Alps<G, S, P>> {
        let options = self.options.unwrap_or_default();
        options.validate()?;

        let creator = self
            .creator
            .ok_or_else(|| GeneticError::Configuration("Creator not specified".to_string()))?;
        let crossover = self
            .crossover
            .ok_or_else(|| GeneticError::Configuration("Crossover not specified".to_string()))?;
        let mutator = self
            .mutator
            .ok_or_else(|| GeneticError::Configuration("Mutator not specified".to_string()))?;
        let selector = self
            .selector
            .ok_or_else(|| GeneticError::Configuration("Selector not specified".to_string()))?;
        let replacer = self
            .replacer
            .ok_or_else(|| GeneticError::Configuration("Replacer not specified".to_string()))?;
        let terminator = self
            .terminator
            .ok_or_else(|| GeneticError::Configuration("Terminator not specified".to_string()))?;

        let evaluator: Arc<dyn EvaluatorDescription<G, S, P>> = match self.evaluator {
            Some(evaluator) => evaluator,
            None => Arc::new(
                ProblemEvaluator::new().with_parallel_threshold(options.get_parallel_threshold()),
            ),
        };
        let mutator = Arc::new(MultiMutator::with_rate(mutator, options.get_mutation_rate())?);

        Ok(Alps {
            options,
            creator,
            crossover,
            mutator,
            evaluator,
            selector,
            replacer,
            terminator,
        })
    }
}

impl<G, S: ?Sized, P: ?Sized> Default for AlpsBuilder<G, S, P> {
    fn default() -> Self {
        Self::new()
    }
}
