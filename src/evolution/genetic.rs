//! # GeneticAlgorithm
//!
//! A plain single-population genetic algorithm over genotypes `G`. It is
//! configured entirely through operator descriptions and runs the
//! [`GenerationalEngine`] directly, without any genotype wrapping.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use genalps::evolution::{EvolutionOptions, GeneticAlgorithm};
//! use genalps::error::Result;
//! use genalps::objective::{Objective, ObjectiveVector};
//! use genalps::operators::{
//!     Broadcast, ContextFreeCreator, ContextFreeCrossover, ContextFreeMutator,
//! };
//! use genalps::problem::{Problem, Unconstrained};
//! use genalps::replacement::ElitismReplacer;
//! use genalps::rng::RandomNumberGenerator;
//! use genalps::selection::TournamentSelector;
//! use genalps::termination::MaxGenerationTerminator;
//! use rand::Rng;
//!
//! struct Parabola(Objective);
//!
//! impl Problem<f64> for Parabola {
//!     fn objective(&self) -> &Objective {
//!         &self.0
//!     }
//!
//!     fn evaluate(&self, x: &f64, _: &mut RandomNumberGenerator) -> Result<ObjectiveVector> {
//!         Ok(ObjectiveVector::from((x - 3.0).powi(2)))
//!     }
//! }
//!
//! #[derive(Clone)]
//! struct Uniform;
//!
//! impl ContextFreeCreator<f64> for Uniform {
//!     fn generate(&self, rng: &mut RandomNumberGenerator) -> f64 {
//!         rng.gen_range(-10.0..10.0)
//!     }
//! }
//!
//! #[derive(Clone)]
//! struct Blend;
//!
//! impl ContextFreeCrossover<f64> for Blend {
//!     fn recombine(&self, a: &f64, b: &f64, _: &mut RandomNumberGenerator) -> f64 {
//!         (a + b) / 2.0
//!     }
//! }
//!
//! #[derive(Clone)]
//! struct Nudge;
//!
//! impl ContextFreeMutator<f64> for Nudge {
//!     fn perturb(&self, x: f64, rng: &mut RandomNumberGenerator) -> f64 {
//!         x + rng.gen_range(-0.5..0.5)
//!     }
//! }
//!
//! let algorithm = GeneticAlgorithm::<f64, Unconstrained, Parabola>::builder()
//!     .with_options(EvolutionOptions::new(20, 0.3))
//!     .with_creator(Arc::new(Broadcast::context_free(Uniform)))
//!     .with_crossover(Arc::new(Broadcast::context_free(Blend)))
//!     .with_mutator(Arc::new(Broadcast::context_free(Nudge)))
//!     .with_selector(Arc::new(TournamentSelector::default()))
//!     .with_replacer(Arc::new(ElitismReplacer::new(2)))
//!     .with_terminator(Arc::new(MaxGenerationTerminator::new(30)))
//!     .build()
//!     .unwrap();
//!
//! let problem = Parabola(Objective::minimize());
//! let mut rng = RandomNumberGenerator::from_seed(7);
//! let outcome = algorithm.execute(&mut rng, &Unconstrained, &problem).unwrap();
//!
//! let best = outcome.state.best(problem.objective()).unwrap();
//! assert!(best.objectives()[0] < 1.0);
//! ```

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info_span};

use crate::error::{GeneticError, Result};
use crate::evolution::algorithm::IterativeAlgorithm;
use crate::evolution::driver::{AlgorithmDriver, RunOutcome};
use crate::evolution::engine::{EngineOperators, GenerationalEngine};
use crate::evolution::options::EvolutionOptions;
use crate::evolution::state::PopulationState;
use crate::operators::MultiMutator;
use crate::problem::{Problem, ProblemEvaluator, SearchSpace};
use crate::registry::{
    CreatorDescription, CrossoverDescription, EvaluatorDescription, InstanceRegistry,
    MutatorDescription, ReplacerDescription, SelectorDescription, TerminatorDescription,
};
use crate::rng::RandomNumberGenerator;

/// Description of a plain genetic algorithm.
///
/// Descriptions hold no per-run state and can be executed any number of
/// times; every run resolves its operators through a fresh registry.
pub struct GeneticAlgorithm<G, S: ?Sized, P: ?Sized> {
    options: EvolutionOptions,
    creator: Arc<dyn CreatorDescription<G, S, P>>,
    crossover: Arc<dyn CrossoverDescription<G, S, P>>,
    /// The configured mutator behind the mutation rate.
    mutator: Arc<dyn MutatorDescription<G, S, P>>,
    evaluator: Arc<dyn EvaluatorDescription<G, S, P>>,
    selector: Arc<dyn SelectorDescription<G, S, P>>,
    replacer: Arc<dyn ReplacerDescription<G, S, P>>,
    terminator: Arc<dyn TerminatorDescription<PopulationState<G>, S, P>>,
}

impl<G, S, P> GeneticAlgorithm<G, S, P>
where
    G: Clone + Send + Sync + 'static,
    S: ?Sized + 'static,
    P: Problem<G> + ?Sized + 'static,
{
    pub fn builder() -> GeneticAlgorithmBuilder<G, S, P> {
        GeneticAlgorithmBuilder::new()
    }

    pub fn options(&self) -> &EvolutionOptions {
        &self.options
    }

    /// Materializes the algorithm's operators in `registry`.
    pub fn create_instance(
        &self,
        registry: &mut InstanceRegistry,
    ) -> Result<GeneticAlgorithmInstance<G, S, P>> {
        let operators = EngineOperators {
            creator: registry.creator(&self.creator)?,
            crossover: registry.crossover(&self.crossover)?,
            mutator: registry.mutator(&self.mutator)?,
            evaluator: registry.evaluator(&self.evaluator)?,
            selector: registry.selector(&self.selector)?,
            replacer: registry.replacer(&self.replacer)?,
        };

        Ok(GeneticAlgorithmInstance {
            engine: GenerationalEngine::new(operators, self.options.get_population_size())?,
        })
    }

    /// Builds a driver backed by a fresh registry.
    pub fn driver(&self) -> Result<AlgorithmDriver<GeneticAlgorithmInstance<G, S, P>, S, P>> {
        let mut registry = InstanceRegistry::new();
        let instance = self.create_instance(&mut registry)?;
        let terminator = registry.terminator(&self.terminator)?;

        Ok(AlgorithmDriver::new(instance, terminator))
    }

    /// Runs the algorithm to termination.
    pub fn execute(
        &self,
        rng: &mut RandomNumberGenerator,
        space: &S,
        problem: &P,
    ) -> Result<RunOutcome<PopulationState<G>>> {
        let span = info_span!(
            "genetic_algorithm",
            population_size = self.options.get_population_size(),
            mutation_rate = self.options.get_mutation_rate()
        );
        let _guard = span.enter();

        self.driver()?.run(rng, space, problem)
    }
}

impl<G, S: ?Sized, P: ?Sized> Clone for GeneticAlgorithm<G, S, P> {
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

impl<G, S: ?Sized, P: ?Sized> fmt::Debug for GeneticAlgorithm<G, S, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneticAlgorithm")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// The per-run side of a [`GeneticAlgorithm`].
pub struct GeneticAlgorithmInstance<G, S: ?Sized, P: ?Sized> {
    engine: GenerationalEngine<G, S, P>,
}

impl<G, S: ?Sized, P: ?Sized> GeneticAlgorithmInstance<G, S, P> {
    pub fn engine(&self) -> &GenerationalEngine<G, S, P> {
        &self.engine
    }
}

impl<G, S, P> IterativeAlgorithm<S, P> for GeneticAlgorithmInstance<G, S, P>
where
    G: Clone + Send + Sync,
    S: ?Sized,
    P: Problem<G> + ?Sized,
{
    type State = PopulationState<G>;

    fn execute_step(
        &self,
        previous: Option<&PopulationState<G>>,
        rng: &mut RandomNumberGenerator,
        space: &S,
        problem: &P,
    ) -> Result<PopulationState<G>> {
        let state = self.engine.step(previous, rng, space, problem)?;

        debug!(
            generation = state.generation(),
            population_size = state.population().len(),
            best = ?state.best(problem.objective()).map(|s| s.objectives()),
            "Generation complete"
        );

        Ok(state)
    }
}

/// Builder for [`GeneticAlgorithm`].
///
/// Every operator must be provided except the evaluator, which defaults to
/// a [`ProblemEvaluator`] using the options' parallel threshold. Options
/// default to [`EvolutionOptions::default`].
pub struct GeneticAlgorithmBuilder<G, S: ?Sized, P: ?Sized> {
    options: Option<EvolutionOptions>,
    creator: Option<Arc<dyn CreatorDescription<G, S, P>>>,
    crossover: Option<Arc<dyn CrossoverDescription<G, S, P>>>,
    mutator: Option<Arc<dyn MutatorDescription<G, S, P>>>,
    evaluator: Option<Arc<dyn EvaluatorDescription<G, S, P>>>,
    selector: Option<Arc<dyn SelectorDescription<G, S, P>>>,
    replacer: Option<Arc<dyn ReplacerDescription<G, S, P>>>,
    terminator: Option<Arc<dyn TerminatorDescription<PopulationState<G>, S, P>>>,
}

impl<G, S: ?Sized, P: ?Sized> GeneticAlgorithmBuilder<G, S, P> {
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

    pub fn with_options(mut self, options: EvolutionOptions) -> Self {
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

impl<G, S, P> GeneticAlgorithmBuilder<G, S, P>
where
    G: Clone + Send + Sync + 'static,
    S: SearchSpace<G> + ?Sized + 'static,
    P: Problem<G> + ?Sized + 'static,
{
    pub fn build(self) -> Result<GeneticAlgorithm<G, S, P>> {
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

        Ok(GeneticAlgorithm {
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

impl<G, S: ?Sized, P: ?Sized> Default for GeneticAlgorithmBuilder<G, S, P> {
    fn default() -> Self {
        Self::new()
    }
}
