//! Composite operators.
//!
//! [`MultiMutator`] and [`MultiCrossover`] pick one of several child
//! operators per item according to fixed weights. Items are grouped by the
//! child they drew, each group is handed to its child as one batch, and the
//! results are scattered back to the original positions, so the composite
//! keeps the positional contract of its children.
//!
//! [`PipelineMutator`] applies its children one after another.
//!
//! All three are descriptions: their children are resolved through the
//! [`InstanceRegistry`] when a run starts.

use std::fmt;
use std::sync::Arc;

use rand::Rng;

use crate::error::{GeneticError, Result};
use crate::operators::{Crossover, Mutator, NoChangeMutator};
use crate::registry::{CrossoverDescription, InstanceRegistry, MutatorDescription};
use crate::rng::RandomNumberGenerator;

/// Validates weights and turns them into a cumulative table.
fn cumulative_weights(operators: usize, weights: &[f64]) -> Result<Vec<f64>> {
    if operators == 0 {
        return Err(GeneticError::Configuration(
            "At least one operator is required".to_string(),
        ));
    }
    if weights.len() != operators {
        return Err(GeneticError::Configuration(format!(
            "Got {} weights for {} operators",
            weights.len(),
            operators
        )));
    }
    if let Some(w) = weights.iter().find(|w| !w.is_finite()) {
        return Err(GeneticError::InvalidNumericValue(format!(
            "Operator weight {} is not finite",
            w
        )));
    }
    if let Some(w) = weights.iter().find(|w| **w < 0.0) {
        return Err(GeneticError::Configuration(format!(
            "Operator weight {} is negative",
            w
        )));
    }

    let cumulative: Vec<f64> = weights
        .iter()
        .scan(0.0, |total, w| {
            *total += w;
            Some(*total)
        })
        .collect();

    match cumulative.last() {
        Some(total) if *total > 0.0 && total.is_finite() => Ok(cumulative),
        _ => Err(GeneticError::Configuration(
            "Operator weights must not all be zero".to_string(),
        )),
    }
}

/// Draws a child per item, runs every child on its batch and restores the
/// input order.
fn dispatch<T, U, F>(
    items: Vec<T>,
    cumulative: &[f64],
    rng: &mut RandomNumberGenerator,
    mut apply: F,
) -> Result<Vec<U>>
where
    F: FnMut(usize, Vec<T>, &mut RandomNumberGenerator) -> Result<Vec<U>>,
{
    let children = cumulative.len();
    let total = cumulative[children - 1];
    let count = items.len();

    let mut batches: Vec<(Vec<usize>, Vec<T>)> =
        (0..children).map(|_| (Vec::new(), Vec::new())).collect();
    for (position, item) in items.into_iter().enumerate() {
        let draw = rng.gen_range(0.0..total);
        let child = cumulative
            .partition_point(|&c| c <= draw)
            .min(children - 1);
        batches[child].0.push(position);
        batches[child].1.push(item);
    }

    let fork = rng.fork();
    let mut slots: Vec<Option<U>> = (0..count).map(|_| None).collect();

    for (child, (positions, batch)) in batches.into_iter().enumerate() {
        if positions.is_empty() {
            continue;
        }
        let mut child_rng = fork.child(child);
        let results = apply(child, batch, &mut child_rng)?;
        if results.len() != positions.len() {
            return Err(GeneticError::Evolution(format!(
                "Operator {} returned {} results for {} inputs",
                child,
                results.len(),
                positions.len()
            )));
        }
        for (position, result) in positions.into_iter().zip(results) {
            slots[position] = Some(result);
        }
    }

    slots
        .into_iter()
        .map(|slot| {
            slot.ok_or_else(|| {
                GeneticError::Evolution("An item was not assigned to any operator".to_string())
            })
        })
        .collect()
}

/// Applies one of several mutators per genotype, chosen by weight.
pub struct MultiMutator<G, S: ?Sized, P: ?Sized> {
    mutators: Vec<Arc<dyn MutatorDescription<G, S, P>>>,
    cumulative: Vec<f64>,
}

impl<G, S: ?Sized, P: ?Sized> MultiMutator<G, S, P> {
    /// Weights must be finite, non-negative, not all zero, and one per mutator.
    pub fn new(
        mutators: Vec<Arc<dyn MutatorDescription<G, S, P>>>,
        weights: Vec<f64>,
    ) -> Result<Self> {
        let cumulative = cumulative_weights(mutators.len(), &weights)?;
        Ok(Self {
            mutators,
            cumulative,
        })
    }

    pub fn len(&self) -> usize {
        self.mutators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mutators.is_empty()
    }
}

impl<G, S, P> MultiMutator<G, S, P>
where
    G: Send + 'static,
    S: ?Sized + 'static,
    P: ?Sized + 'static,
{
    /// Applies `mutator` to each genotype with probability `rate` and leaves
    /// the rest unchanged.
    pub fn with_rate(mutator: Arc<dyn MutatorDescription<G, S, P>>, rate: f64) -> Result<Self> {
        if !rate.is_finite() {
            return Err(GeneticError::InvalidNumericValue(format!(
                "Mutation rate {} is not finite",
                rate
            )));
        }
        if !(0.0..=1.0).contains(&rate) {
            return Err(GeneticError::Configuration(format!(
                "Mutation rate {} is outside of [0, 1]",
                rate
            )));
        }

        Self::new(
            vec![mutator, Arc::new(NoChangeMutator)],
            vec![rate, 1.0 - rate],
        )
    }
}

impl<G, S: ?Sized, P: ?Sized> Clone for MultiMutator<G, S, P> {
    fn clone(&self) -> Self {
        Self {
            mutators: self.mutators.clone(),
            cumulative: self.cumulative.clone(),
        }
    }
}

impl<G, S: ?Sized, P: ?Sized> fmt::Debug for MultiMutator<G, S, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiMutator")
            .field("mutators", &self.mutators.len())
            .field("cumulative", &self.cumulative)
            .finish()
    }
}

struct MultiMutatorInstance<G, S: ?Sized, P: ?Sized> {
    mutators: Vec<Arc<dyn Mutator<G, S, P>>>,
    cumulative: Vec<f64>,
}

impl<G: Send, S: ?Sized, P: ?Sized> Mutator<G, S, P> for MultiMutatorInstance<G, S, P> {
    fn mutate(
        &self,
        genotypes: Vec<G>,
        rng: &mut RandomNumberGenerator,
        space: &S,
        problem: &P,
    ) -> Result<Vec<G>> {
        dispatch(genotypes, &self.cumulative, rng, |child, batch, rng| {
            self.mutators[child].mutate(batch, rng, space, problem)
        })
    }
}

impl<G, S, P> MutatorDescription<G, S, P> for MultiMutator<G, S, P>
where
    G: Send + 'static,
    S: ?Sized + 'static,
    P: ?Sized + 'static,
{
    fn create_instance(
        &self,
        registry: &mut InstanceRegistry,
    ) -> Result<Arc<dyn Mutator<G, S, P>>> {
        let mutators = self
            .mutators
            .iter()
            .map(|d| registry.mutator(d))
            .collect::<Result<Vec<_>>>()?;

        Ok(Arc::new(MultiMutatorInstance {
            mutators,
            cumulative: self.cumulative.clone(),
        }))
    }
}

/// Applies one of several crossovers per parent pair, chosen by weight.
pub struct MultiCrossover<G, S: ?Sized, P: ?Sized> {
    crossovers: Vec<Arc<dyn CrossoverDescription<G, S, P>>>,
    cumulative: Vec<f64>,
}

impl<G, S: ?Sized, P: ?Sized> MultiCrossover<G, S, P> {
    pub fn new(
        crossovers: Vec<Arc<dyn CrossoverDescription<G, S, P>>>,
        weights: Vec<f64>,
    ) -> Result<Self> {
        let cumulative = cumulative_weights(crossovers.len(), &weights)?;
        Ok(Self {
            crossovers,
            cumulative,
        })
    }

    pub fn len(&self) -> usize {
        self.crossovers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.crossovers.is_empty()
    }
}

impl<G, S: ?Sized, P: ?Sized> Clone for MultiCrossover<G, S, P> {
    fn clone(&self) -> Self {
        Self {
            crossovers: self.crossovers.clone(),
            cumulative: self.cumulative.clone(),
        }
    }
}

impl<G, S: ?Sized, P: ?Sized> fmt::Debug for MultiCrossover<G, S, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiCrossover")
            .field("crossovers", &self.crossovers.len())
            .field("cumulative", &self.cumulative)
            .finish()
    }
}

struct MultiCrossoverInstance<G, S: ?Sized, P: ?Sized> {
    crossovers: Vec<Arc<dyn Crossover<G, S, P>>>,
    cumulative: Vec<f64>,
}

impl<G: Send, S: ?Sized, P: ?Sized> Crossover<G, S, P> for MultiCrossoverInstance<G, S, P> {
    fn cross(
        &self,
        parents: Vec<(G, G)>,
        rng: &mut RandomNumberGenerator,
        space: &S,
        problem: &P,
    ) -> Result<Vec<G>> {
        dispatch(parents, &self.cumulative, rng, |child, batch, rng| {
            self.crossovers[child].cross(batch, rng, space, problem)
        })
    }
}

impl<G, S, P> CrossoverDescription<G, S, P> for MultiCrossover<G, S, P>
where
    G: Send + 'static,
    S: ?Sized + 'static,
    P: ?Sized + 'static,
{
    fn create_instance(
        &self,
        registry: &mut InstanceRegistry,
    ) -> Result<Arc<dyn Crossover<G, S, P>>> {
        let crossovers = self
            .crossovers
            .iter()
            .map(|d| registry.crossover(d))
            .collect::<Result<Vec<_>>>()?;

        Ok(Arc::new(MultiCrossoverInstance {
            crossovers,
            cumulative: self.cumulative.clone(),
        }))
    }
}

/// Applies every mutator in order to the whole batch.
pub struct PipelineMutator<G, S: ?Sized, P: ?Sized> {
    mutators: Vec<Arc<dyn MutatorDescription<G, S, P>>>,
}

impl<G, S: ?Sized, P: ?Sized> PipelineMutator<G, S, P> {
    pub fn new(mutators: Vec<Arc<dyn MutatorDescription<G, S, P>>>) -> Result<Self> {
        if mutators.is_empty() {
            return Err(GeneticError::Configuration(
                "A pipeline needs at least one mutator".to_string(),
            ));
        }
        Ok(Self { mutators })
    }

    pub fn len(&self) -> usize {
        self.mutators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mutators.is_empty()
    }
}

impl<G, S: ?Sized, P: ?Sized> Clone for PipelineMutator<G, S, P> {
    fn clone(&self) -> Self {
        Self {
            mutators: self.mutators.clone(),
        }
    }
}

impl<G, S: ?Sized, P: ?Sized> fmt::Debug for PipelineMutator<G, S, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineMutator")
            .field("mutators", &self.mutators.len())
            .finish()
    }
}

struct PipelineMutatorInstance<G, S: ?Sized, P: ?Sized> {
    mutators: Vec<Arc<dyn Mutator<G, S, P>>>,
}

impl<G: Send, S: ?Sized, P: ?Sized> Mutator<G, S, P> for PipelineMutatorInstance<G, S, P> {
    fn mutate(
        &self,
        genotypes: Vec<G>,
        rng: &mut RandomNumberGenerator,
        space: &S,
        problem: &P,
    ) -> Result<Vec<G>> {
        let count = genotypes.len();
        let mut current = genotypes;
        for mutator in &self.mutators {
            current = mutator.mutate(current, rng, space, problem)?;
            if current.len() != count {
                return Err(GeneticError::Evolution(format!(
                    "Pipeline stage returned {} genotypes for {} inputs",
                    current.len(),
                    count
                )));
            }
        }
        Ok(current)
    }
}

impl<G, S, P> MutatorDescription<G, S, P> for PipelineMutator<G, S, P>
where
    G: Send + 'static,
    S: ?Sized + 'static,
    P: ?Sized + 'static,
{
    fn create_instance(
        &self,
        registry: &mut InstanceRegistry,
    ) -> Result<Arc<dyn Mutator<G, S, P>>> {
        let mutators = self
            .mutators
            .iter()
            .map(|d| registry.mutator(d))
            .collect::<Result<Vec<_>>>()?;

        Ok(Arc::new(PipelineMutatorInstance { mutators }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operators::{Broadcast, ContextFreeMutator, FirstParentCrossover};
    use crate::problem::Unconstrained;
    use crate::registry::Stateless;

    type MutDesc = Arc<dyn MutatorDescription<i32, Unconstrained, ()>>;

    #[derive(Clone)]
    struct Add(i32);

    impl ContextFreeMutator<i32> for Add {
        fn perturb(&self, genotype: i32, _: &mut RandomNumberGenerator) -> i32 {
            genotype + self.0
        }
    }

    fn add(n: i32) -> MutDesc {
        Arc::new(Stateless(Broadcast::context_free(Add(n))))
    }

    fn instantiate(
        description: MultiMutator<i32, Unconstrained, ()>,
    ) -> Arc<dyn Mutator<i32, Unconstrained, ()>> {
        let description: MutDesc = Arc::new(description);
        InstanceRegistry::new().mutator(&description).unwrap()
    }

    #[test]
    fn test_weight_validation() {
        assert!(MultiMutator::new(vec![add(1)], vec![]).is_err());
        assert!(MultiMutator::new(vec![add(1)], vec![-1.0]).is_err());
        assert!(MultiMutator::new(vec![add(1), add(2)], vec![0.0, 0.0]).is_err());
        assert!(matches!(
            MultiMutator::new(vec![add(1)], vec![f64::NAN]),
            Err(GeneticError::InvalidNumericValue(_))
        ));
        assert!(MultiMutator::<i32, Unconstrained, ()>::new(vec![], vec![]).is_err());
        assert!(MultiMutator::new(vec![add(1), add(2)], vec![0.0, 1.0]).is_ok());
    }

    #[test]
    fn test_rate_validation() {
        assert!(MultiMutator::with_rate(add(1), 1.5).is_err());
        assert!(MultiMutator::with_rate(add(1), -0.1).is_err());
        assert!(MultiMutator::with_rate(add(1), f64::INFINITY).is_err());
        assert!(MultiMutator::with_rate(add(1), 0.0).is_ok());
        assert!(MultiMutator::with_rate(add(1), 1.0).is_ok());
    }

    #[test]
    fn test_rate_extremes() {
        let mut rng = RandomNumberGenerator::from_seed(9);
        let input: Vec<i32> = (0..100).collect();

        let always = instantiate(MultiMutator::with_rate(add(1000), 1.0).unwrap());
        let result = always.mutate(input.clone(), &mut rng, &Unconstrained, &()).unwrap();
        assert!(result.iter().zip(&input).all(|(r, i)| *r == i + 1000));

        let never = instantiate(MultiMutator::with_rate(add(1000), 0.0).unwrap());
        let result = never.mutate(input.clone(), &mut rng, &Unconstrained, &()).unwrap();
        assert_eq!(result, input);
    }

    #[test]
    fn test_positions_are_preserved() {
        let mut rng = RandomNumberGenerator::from_seed(2);
        let input: Vec<i32> = (0..200).map(|i| i * 1000).collect();

        let multi = instantiate(
            MultiMutator::new(vec![add(1), add(2), add(3)], vec![1.0, 1.0, 1.0]).unwrap(),
        );
        let result = multi.mutate(input.clone(), &mut rng, &Unconstrained, &()).unwrap();

        assert_eq!(result.len(), input.len());
        let mut used = std::collections::HashSet::new();
        for (r, i) in result.iter().zip(&input) {
            let delta = r - i;
            assert!((1..=3).contains(&delta));
            used.insert(delta);
        }
        assert_eq!(used.len(), 3);
    }

    #[test]
    fn test_multi_crossover_is_positional() {
        let mut rng = RandomNumberGenerator::from_seed(2);
        let first: Arc<dyn CrossoverDescription<i32, Unconstrained, ()>> =
            Arc::new(Stateless(FirstParentCrossover));
        let second: Arc<dyn CrossoverDescription<i32, Unconstrained, ()>> =
            Arc::new(Stateless(FirstParentCrossover));
        let description: Arc<dyn CrossoverDescription<i32, Unconstrained, ()>> =
            Arc::new(MultiCrossover::new(vec![first, second], vec![0.5, 0.5]).unwrap());

        let crossover = InstanceRegistry::new().crossover(&description).unwrap();
        let parents: Vec<(i32, i32)> = (0..50).map(|i| (i, -i)).collect();
        let offspring = crossover.cross(parents, &mut rng, &Unconstrained, &()).unwrap();

        assert_eq!(offspring, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn test_pipeline() {
        let mut rng = RandomNumberGenerator::from_seed(2);
        let description: MutDesc = Arc::new(PipelineMutator::new(vec![add(1), add(10)]).unwrap());

        let pipeline = InstanceRegistry::new().mutator(&description).unwrap();
        let result = pipeline.mutate(vec![0, 5], &mut rng, &Unconstrained, &()).unwrap();

        assert_eq!(result, vec![11, 16]);
    }

    #[test]
    fn test_empty_pipeline_is_rejected() {
        let result = PipelineMutator::<i32, Unconstrained, ()>::new(Vec::new());
        assert!(matches!(result, Err(GeneticError::Configuration(_))));
    }

    #[test]
    fn test_shared_child_is_instantiated_once() {
        let shared = add(1);
        let description: MutDesc = Arc::new(
            PipelineMutator::new(vec![Arc::clone(&shared), Arc::clone(&shared)]).unwrap(),
        );

        let mut registry = InstanceRegistry::new();
        registry.mutator(&description).unwrap();

        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_deterministic() {
        let input: Vec<i32> = (0..64).collect();
        let run = || {
            let mut rng = RandomNumberGenerator::from_seed(17);
            instantiate(MultiMutator::new(vec![add(1), add(2)], vec![0.3, 0.7]).unwrap())
                .mutate(input.clone(), &mut rng, &Unconstrained, &())
                .unwrap()
        };
        assert_eq!(run(), run());
    }
}
