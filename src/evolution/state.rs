use crate::metrics::GenerationMetrics;
use crate::objective::Objective;
use crate::population::{Population, Solution};
use crate::termination::GenerationCount;

/// Snapshot of a single-population algorithm after a step.
#[derive(Debug, Clone)]
pub struct PopulationState<G> {
    population: Population<G>,
    generation: usize,
    metrics: GenerationMetrics,
}

impl<G> PopulationState<G> {
    pub fn new(population: Population<G>, generation: usize, metrics: GenerationMetrics) -> Self {
        Self {
            population,
            generation,
            metrics,
        }
    }

    pub fn population(&self) -> &Population<G> {
        &self.population
    }

    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Operator metrics accumulated since initialization.
    pub fn metrics(&self) -> &GenerationMetrics {
        &self.metrics
    }

    pub fn best(&self, objective: &Objective) -> Option<&Solution<G>> {
        self.population.best(objective)
    }

    pub fn into_parts(self) -> (Population<G>, usize, GenerationMetrics) {
        (self.population, self.generation, self.metrics)
    }
}

impl<G> GenerationCount for PopulationState<G> {
    fn generation(&self) -> usize {
        self.generation
    }
}
