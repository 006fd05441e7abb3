use crate::alps::genotype::AgedGenotype;
use crate::evolution::state::PopulationState;
use crate::metrics::GenerationMetrics;
use crate::objective::Objective;
use crate::population::{Population, Solution};
use crate::termination::GenerationCount;

/// Snapshot of an ALPS run after a step.
///
/// Layers are ordered from youngest to oldest. This implementation keeps a
/// single unbounded layer, so [`AlpsState::population`] is the whole
/// population.
#[derive(Debug, Clone)]
pub struct AlpsState<G> {
    layers: Vec<Population<AgedGenotype<G>>>,
    generation: usize,
    metrics: GenerationMetrics,
}

impl<G> AlpsState<G> {
    pub fn new(
        population: Population<AgedGenotype<G>>,
        generation: usize,
        metrics: GenerationMetrics,
    ) -> Self {
        Self {
            layers: vec![population],
            generation,
            metrics,
        }
    }

    pub fn layers(&self) -> &[Population<AgedGenotype<G>>] {
        &self.layers
    }

    /// The first (and only) layer.
    pub fn population(&self) -> &Population<AgedGenotype<G>> {
        &self.layers[0]
    }

    pub fn generation(&self) -> usize {
        self.generation
    }

    pub fn metrics(&self) -> &GenerationMetrics {
        &self.metrics
    }

    pub fn best(&self, objective: &Objective) -> Option<&Solution<AgedGenotype<G>>> {
        self.population().best(objective)
    }

    /// Age of the oldest individual, 0 for an empty population.
    pub fn max_age(&self) -> usize {
        self.layers
            .iter()
            .flat_map(|layer| layer.iter())
            .map(|s| s.genotype().age())
            .max()
            .unwrap_or(0)
    }

    /// The state as the engine sees it; populations are shared, not copied.
    pub(crate) fn to_population_state(&self) -> PopulationState<AgedGenotype<G>> {
        PopulationState::new(self.population().clone(), self.generation, self.metrics)
    }
}

impl<G> From<PopulationState<AgedGenotype<G>>> for AlpsState<G> {
    fn from(state: PopulationState<AgedGenotype<G>>) -> Self {
        let (population, generation, metrics) = state.into_parts();
        Self::new(population, generation, metrics)
    }
}

impl<G> GenerationCount for AlpsState<G> {
    fn generation(&self) -> usize {
        self.generation
    }
}
