//! # Termination
//!
//! A [`Terminator`] inspects the state produced by the latest step (and the
//! one before it) and decides whether the run is over. Terminators are
//! generic over the algorithm state `St`, so a criterion written once works
//! for every algorithm whose state exposes what it needs.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::error::{GeneticError, Result};
use crate::registry::{self_describing, InstanceRegistry, TerminatorDescription};

/// Decides when an iterative run stops.
pub trait Terminator<St, S: ?Sized, P: ?Sized>: Send + Sync {
    fn should_terminate(&self, current: &St, previous: Option<&St>, space: &S, problem: &P) -> bool;
}

/// States that count their generations.
///
/// The initial population is generation 0; every further step adds one.
pub trait GenerationCount {
    fn generation(&self) -> usize;
}

/// Stops once `max_generations` generations have been bred.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaxGenerationTerminator {
    max_generations: usize,
}

impl MaxGenerationTerminator {
    pub fn new(max_generations: usize) -> Self {
        Self { max_generations }
    }

    pub fn max_generations(&self) -> usize {
        self.max_generations
    }
}

impl<St, S, P> Terminator<St, S, P> for MaxGenerationTerminator
where
    St: GenerationCount,
    S: ?Sized,
    P: ?Sized,
{
    fn should_terminate(&self, current: &St, _previous: Option<&St>, _: &S, _: &P) -> bool {
        current.generation() >= self.max_generations
    }
}

self_describing!(MaxGenerationTerminator => TerminatorDescription, Terminator);

/// Never stops on its own; the run ends through cancellation.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NeverTerminator;

impl<St, S: ?Sized, P: ?Sized> Terminator<St, S, P> for NeverTerminator {
    fn should_terminate(&self, _: &St, _: Option<&St>, _: &S, _: &P) -> bool {
        false
    }
}

self_describing!(NeverTerminator => TerminatorDescription, Terminator);

/// Stops once a wall-clock budget is spent.
///
/// The clock starts when the run's instance is created, not when the
/// description is.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AfterDurationTerminator {
    duration: Duration,
}

impl AfterDurationTerminator {
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }
}

#[derive(Debug)]
struct Deadline {
    at: Instant,
}

impl<St, S: ?Sized, P: ?Sized> Terminator<St, S, P> for Deadline {
    fn should_terminate(&self, _: &St, _: Option<&St>, _: &S, _: &P) -> bool {
        Instant::now() >= self.at
    }
}

impl<St, S, P> TerminatorDescription<St, S, P> for AfterDurationTerminator
where
    St: 'static,
    S: ?Sized + 'static,
    P: ?Sized + 'static,
{
    fn create_instance(
        &self,
        _registry: &mut InstanceRegistry,
    ) -> Result<Arc<dyn Terminator<St, S, P>>> {
        Ok(Arc::new(Deadline {
            at: Instant::now() + self.duration,
        }))
    }
}

/// Stops as soon as any child terminator does.
pub struct AnyTerminator<St, S: ?Sized, P: ?Sized> {
    children: Vec<Arc<dyn TerminatorDescription<St, S, P>>>,
}

impl<St, S: ?Sized, P: ?Sized> AnyTerminator<St, S, P> {
    pub fn new(children: Vec<Arc<dyn TerminatorDescription<St, S, P>>>) -> Result<Self> {
        if children.is_empty() {
            return Err(GeneticError::Configuration(
                "AnyTerminator needs at least one child".to_string(),
            ));
        }
        Ok(Self { children })
    }
}

impl<St, S: ?Sized, P: ?Sized> Clone for AnyTerminator<St, S, P> {
    fn clone(&self) -> Self {
        Self {
            children: self.children.clone(),
        }
    }
}

impl<St, S: ?Sized, P: ?Sized> fmt::Debug for AnyTerminator<St, S, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnyTerminator")
            .field("children", &self.children.len())
            .finish()
    }
}

struct AnyInstance<St, S: ?Sized, P: ?Sized> {
    children: Vec<Arc<dyn Terminator<St, S, P>>>,
}

impl<St, S: ?Sized, P: ?Sized> Terminator<St, S, P> for AnyInstance<St, S, P> {
    fn should_terminate(
        &self,
        current: &St,
        previous: Option<&St>,
        space: &S,
        problem: &P,
    ) -> bool {
        self.children
            .iter()
            .any(|child| child.should_terminate(current, previous, space, problem))
    }
}

impl<St, S, P> TerminatorDescription<St, S, P> for AnyTerminator<St, S, P>
where
    St: 'static,
    S: ?Sized + 'static,
    P: ?Sized + 'static,
{
    fn create_instance(
        &self,
        registry: &mut InstanceRegistry,
    ) -> Result<Arc<dyn Terminator<St, S, P>>> {
        let children = self
            .children
            .iter()
            .map(|child| registry.terminator(child))
            .collect::<Result<Vec<_>>>()?;

        Ok(Arc::new(AnyInstance { children }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::Unconstrained;

    struct Counter(usize);

    impl GenerationCount for Counter {
        fn generation(&self) -> usize {
            self.0
        }
    }

    type Desc = Arc<dyn TerminatorDescription<Counter, Unconstrained, ()>>;

    #[test]
    fn test_max_generations() {
        let terminator = MaxGenerationTerminator::new(3);

        assert!(!terminator.should_terminate(&Counter(2), None, &Unconstrained, &()));
        assert!(terminator.should_terminate(&Counter(3), Some(&Counter(2)), &Unconstrained, &()));
        assert!(terminator.should_terminate(&Counter(4), None, &Unconstrained, &()));
    }

    #[test]
    fn test_never() {
        assert!(!NeverTerminator.should_terminate(&Counter(1_000_000), None, &Unconstrained, &()));
    }

    #[test]
    fn test_after_duration_clock_starts_at_instantiation() {
        let description: Desc = Arc::new(AfterDurationTerminator::new(Duration::from_millis(500)));

        std::thread::sleep(Duration::from_millis(600));
        let terminator = InstanceRegistry::new().terminator(&description).unwrap();
        assert!(!terminator.should_terminate(&Counter(0), None, &Unconstrained, &()));

        std::thread::sleep(Duration::from_millis(600));
        assert!(terminator.should_terminate(&Counter(0), None, &Unconstrained, &()));
    }

    #[test]
    fn test_zero_duration() {
        let description: Desc = Arc::new(AfterDurationTerminator::new(Duration::ZERO));
        let terminator = InstanceRegistry::new().terminator(&description).unwrap();
        assert!(terminator.should_terminate(&Counter(0), None, &Unconstrained, &()));
    }

    #[test]
    fn test_any() {
        let description: Desc = Arc::new(
            AnyTerminator::new(vec![
                Arc::new(NeverTerminator) as Desc,
                Arc::new(MaxGenerationTerminator::new(5)) as Desc,
            ])
            .unwrap(),
        );
        let terminator = InstanceRegistry::new().terminator(&description).unwrap();

        assert!(!terminator.should_terminate(&Counter(4), None, &Unconstrained, &()));
        assert!(terminator.should_terminate(&Counter(5), None, &Unconstrained, &()));
    }

    #[test]
    fn test_any_requires_children() {
        assert!(AnyTerminator::<Counter, Unconstrained, ()>::new(vec![]).is_err());
    }
}
