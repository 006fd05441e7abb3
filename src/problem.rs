//! # Problems and search spaces
//!
//! The engine never looks inside a genotype. Everything it knows about one
//! comes from two collaborators supplied by the caller:
//!
//! - a [`SearchSpace`], answering whether a genotype is valid, and
//! - a [`Problem`], providing the [`Objective`] and evaluating genotypes.
//!
//! [`ProblemEvaluator`] is the default evaluator operator: it checks
//! containment and evaluates a whole batch through the deterministic
//! parallel map.

use crate::error::{GeneticError, Result};
use crate::objective::{Objective, ObjectiveVector};
use crate::operators::Evaluator;
use crate::parallel::{map_forked_with_threshold, DEFAULT_PARALLEL_THRESHOLD};
use crate::registry::{self_describing, EvaluatorDescription};
use crate::rng::RandomNumberGenerator;

/// The set of valid genotypes.
pub trait SearchSpace<G>: Send + Sync {
    fn contains(&self, genotype: &G) -> bool;
}

/// A search space containing every value of `G`.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Unconstrained;

impl<G> SearchSpace<G> for Unconstrained {
    fn contains(&self, _genotype: &G) -> bool {
        true
    }
}

/// An optimization problem over genotypes of type `G`.
///
/// `evaluate` may be stochastic; it receives a generator forked for the
/// genotype it evaluates. Errors abort the run and are never retried.
pub trait Problem<G>: Send + Sync {
    fn objective(&self) -> &Objective;

    fn evaluate(&self, genotype: &G, rng: &mut RandomNumberGenerator) -> Result<ObjectiveVector>;
}

/// Evaluates every genotype with [`Problem::evaluate`].
///
/// Genotypes outside the search space are rejected with
/// [`GeneticError::OutOfBounds`]; vectors of the wrong length with
/// [`GeneticError::FitnessCalculation`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProblemEvaluator {
    parallel_threshold: usize,
}

impl ProblemEvaluator {
    pub fn new() -> Self {
        Self {
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }

    pub fn with_parallel_threshold(mut self, parallel_threshold: usize) -> Self {
        self.parallel_threshold = parallel_threshold;
        self
    }
}

impl Default for ProblemEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl<G, S, P> Evaluator<G, S, P> for ProblemEvaluator
where
    G: Sync,
    S: SearchSpace<G> + ?Sized,
    P: Problem<G> + ?Sized,
{
    fn evaluate(
        &self,
        genotypes: &[G],
        rng: &mut RandomNumberGenerator,
        space: &S,
        problem: &P,
    ) -> Result<Vec<ObjectiveVector>> {
        let objective = problem.objective();
        let items: Vec<&G> = genotypes.iter().collect();

        map_forked_with_threshold(items, rng, self.parallel_threshold, |index, genotype, rng| {
            if !space.contains(genotype) {
                return Err(GeneticError::OutOfBounds(format!(
                    "genotype at position {} is not contained in the search space",
                    index
                )));
            }
            let objectives = problem.evaluate(genotype, rng)?;
            objective.validate(&objectives)?;
            Ok(objectives)
        })
    }
}

self_describing!(ProblemEvaluator => EvaluatorDescription, Evaluator);
