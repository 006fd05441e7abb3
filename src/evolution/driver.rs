//! # AlgorithmDriver
//!
//! Runs an [`IterativeAlgorithm`] until its terminator says stop or the
//! run is cancelled. Cancellation is cooperative and only observed between
//! steps.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{info, warn};

use crate::error::Result;
use crate::evolution::algorithm::{Interceptor, IterativeAlgorithm};
use crate::rng::RandomNumberGenerator;
use crate::termination::Terminator;

/// Why a run ended.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Terminated,
    Cancelled,
}

/// The last state of a run.
#[derive(Debug, Clone)]
pub struct RunOutcome<St> {
    pub state: St,
    /// Number of steps executed, initialization included.
    pub steps: usize,
    pub stop_reason: StopReason,
}

pub struct AlgorithmDriver<A, S: ?Sized, P: ?Sized>
where
    A: IterativeAlgorithm<S, P>,
{
    algorithm: A,
    terminator: Arc<dyn Terminator<A::State, S, P>>,
    interceptor: Option<Arc<dyn Interceptor<A::State, S, P>>>,
    cancellation: Option<Arc<AtomicBool>>,
}

impl<A, S: ?Sized, P: ?Sized> AlgorithmDriver<A, S, P>
where
    A: IterativeAlgorithm<S, P>,
{
    pub fn new(algorithm: A, terminator: Arc<dyn Terminator<A::State, S, P>>) -> Self {
        Self {
            algorithm,
            terminator,
            interceptor: None,
            cancellation: None,
        }
    }

    pub fn with_interceptor(mut self, interceptor: Arc<dyn Interceptor<A::State, S, P>>) -> Self {
        self.interceptor = Some(interceptor);
        self
    }

    /// Stops the run after the current step once `flag` is set.
    pub fn with_cancellation(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancellation = Some(flag);
        self
    }

    pub fn algorithm(&self) -> &A {
        &self.algorithm
    }

    fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }

    /// Steps the algorithm until termination or cancellation.
    ///
    /// Errors from any step, the interceptor or an operator abort the run
    /// and are returned unchanged.
    pub fn run(
        &self,
        rng: &mut RandomNumberGenerator,
        space: &S,
        problem: &P,
    ) -> Result<RunOutcome<A::State>> {
        info!(
            interceptor = self.interceptor.is_some(),
            cancellable = self.cancellation.is_some(),
            "Starting run"
        );

        let mut previous: Option<A::State> = None;
        let mut steps = 0;

        loop {
            let mut state = self
                .algorithm
                .execute_step(previous.as_ref(), rng, space, problem)?;
            steps += 1;

            if let Some(interceptor) = &self.interceptor {
                state = interceptor.transform(state, previous.as_ref(), space, problem)?;
            }

            if self
                .terminator
                .should_terminate(&state, previous.as_ref(), space, problem)
            {
                info!(steps, "Run terminated");
                return Ok(RunOutcome {
                    state,
                    steps,
                    stop_reason: StopReason::Terminated,
                });
            }

            if self.is_cancelled() {
                warn!(steps, "Run cancelled");
                return Ok(RunOutcome {
                    state,
                    steps,
                    stop_reason: StopReason::Cancelled,
                });
            }

            previous = Some(state);
        }
    }
}

impl<A, S: ?Sized, P: ?Sized> fmt::Debug for AlgorithmDriver<A, S, P>
where
    A: IterativeAlgorithm<S, P>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlgorithmDriver")
            .field("interceptor", &self.interceptor.is_some())
            .field("cancellation", &self.cancellation.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GeneticError;
    use crate::termination::{GenerationCount, MaxGenerationTerminator, NeverTerminator};
    use rand::RngCore;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    struct Count {
        generation: usize,
        value: u64,
    }

    impl GenerationCount for Count {
        fn generation(&self) -> usize {
            self.generation
        }
    }

    struct Counter;

    impl IterativeAlgorithm<(), ()> for Counter {
        type State = Count;

        fn execute_step(
            &self,
            previous: Option<&Count>,
            rng: &mut RandomNumberGenerator,
            _: &(),
            _: &(),
        ) -> Result<Count> {
            let value = rng.next_u64();
            Ok(match previous {
                None => Count {
                    generation: 0,
                    value,
                },
                Some(p) => Count {
                    generation: p.generation + 1,
                    value,
                },
            })
        }
    }

    struct Failing;

    impl IterativeAlgorithm<(), ()> for Failing {
        type State = Count;

        fn execute_step(
            &self,
            previous: Option<&Count>,
            _: &mut RandomNumberGenerator,
            _: &(),
            _: &(),
        ) -> Result<Count> {
            match previous {
                None => Ok(Count {
                    generation: 0,
                    value: 0,
                }),
                Some(_) => Err(GeneticError::FitnessCalculation("boom".to_string())),
            }
        }
    }

    struct Doubler;

    impl Interceptor<Count, (), ()> for Doubler {
        fn transform(
            &self,
            mut current: Count,
            _: Option<&Count>,
            _: &(),
            _: &(),
        ) -> Result<Count> {
            current.generation *= 2;
            Ok(current)
        }
    }

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<(usize, Option<usize>)>>,
    }

    impl Interceptor<Count, (), ()> for Recorder {
        fn transform(
            &self,
            current: Count,
            previous: Option<&Count>,
            _: &(),
            _: &(),
        ) -> Result<Count> {
            if let Ok(mut seen) = self.seen.lock() {
                seen.push((current.generation, previous.map(|p| p.generation)));
            }
            Ok(current)
        }
    }

    /// Flips the cancellation flag from inside the run.
    struct CancelAt {
        generation: usize,
        flag: Arc<AtomicBool>,
    }

    impl Interceptor<Count, (), ()> for CancelAt {
        fn transform(&self, current: Count, _: Option<&Count>, _: &(), _: &()) -> Result<Count> {
            if current.generation >= self.generation {
                self.flag.store(true, Ordering::SeqCst);
            }
            Ok(current)
        }
    }

    #[test]
    fn test_runs_until_terminated() {
        let driver = AlgorithmDriver::new(Counter, Arc::new(MaxGenerationTerminator::new(3)));
        let mut rng = RandomNumberGenerator::from_seed(1);

        let outcome = driver.run(&mut rng, &(), &()).unwrap();

        assert_eq!(outcome.state.generation, 3);
        assert_eq!(outcome.steps, 4);
        assert_eq!(outcome.stop_reason, StopReason::Terminated);
    }

    #[test]
    fn test_terminator_checked_after_initialization() {
        let driver = AlgorithmDriver::new(Counter, Arc::new(MaxGenerationTerminator::new(0)));
        let mut rng = RandomNumberGenerator::from_seed(1);

        let outcome = driver.run(&mut rng, &(), &()).unwrap();

        assert_eq!(outcome.steps, 1);
        assert_eq!(outcome.state.generation, 0);
    }

    #[test]
    fn test_same_seed_same_outcome() {
        let driver = AlgorithmDriver::new(Counter, Arc::new(MaxGenerationTerminator::new(5)));

        let a = driver.run(&mut RandomNumberGenerator::from_seed(9), &(), &()).unwrap();
        let b = driver.run(&mut RandomNumberGenerator::from_seed(9), &(), &()).unwrap();

        assert_eq!(a.state, b.state);
    }

    #[test]
    fn test_interceptor_sees_previous_state() {
        let recorder = Arc::new(Recorder::default());
        let driver = AlgorithmDriver::new(Counter, Arc::new(MaxGenerationTerminator::new(2)))
            .with_interceptor(recorder.clone());

        driver
            .run(&mut RandomNumberGenerator::from_seed(1), &(), &())
            .unwrap();

        let seen = recorder.seen.lock().unwrap().clone();
        assert_eq!(seen, vec![(0, None), (1, Some(0)), (2, Some(1))]);
    }

    #[test]
    fn test_interceptor_output_is_what_terminator_sees() {
        let driver = AlgorithmDriver::new(Counter, Arc::new(MaxGenerationTerminator::new(4)))
            .with_interceptor(Arc::new(Doubler));

        let outcome = driver
            .run(&mut RandomNumberGenerator::from_seed(1), &(), &())
            .unwrap();

        // 0 -> 0, 1 -> 2, 3 -> 6
        assert_eq!(outcome.steps, 3);
        assert_eq!(outcome.state.generation, 6);
    }

    #[test]
    fn test_cancellation_between_steps() {
        let flag = Arc::new(AtomicBool::new(false));
        let driver = AlgorithmDriver::new(Counter, Arc::new(NeverTerminator))
            .with_interceptor(Arc::new(CancelAt {
                generation: 3,
                flag: Arc::clone(&flag),
            }))
            .with_cancellation(flag);

        let outcome = driver
            .run(&mut RandomNumberGenerator::from_seed(1), &(), &())
            .unwrap();

        assert_eq!(outcome.stop_reason, StopReason::Cancelled);
        assert_eq!(outcome.state.generation, 3);
        assert_eq!(outcome.steps, 4);
    }

    #[test]
    fn test_step_errors_propagate_unchanged() {
        let driver = AlgorithmDriver::new(Failing, Arc::new(NeverTerminator));

        let result = driver.run(&mut RandomNumberGenerator::from_seed(1), &(), &());

        assert!(matches!(result, Err(GeneticError::FitnessCalculation(_))));
    }
}
