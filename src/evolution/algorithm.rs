use crate::error::Result;
use crate::rng::RandomNumberGenerator;

/// An algorithm expressed as a single step function.
///
/// `previous == None` asks for initialization; otherwise the algorithm
/// advances one generation from `previous`. States are immutable snapshots:
/// a step never modifies the state it was given.
pub trait IterativeAlgorithm<S: ?Sized, P: ?Sized>: Send + Sync {
    type State;

    fn execute_step(
        &self,
        previous: Option<&Self::State>,
        rng: &mut RandomNumberGenerator,
        space: &S,
        problem: &P,
    ) -> Result<Self::State>;
}

/// Rewrites the state between two steps.
///
/// Interceptors may be handed a state they produced themselves and must
/// cope with that.
pub trait Interceptor<St, S: ?Sized, P: ?Sized>: Send + Sync {
    fn transform(&self, current: St, previous: Option<&St>, space: &S, problem: &P) -> Result<St>;
}
