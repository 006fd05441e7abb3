pub mod alps;
pub mod error;
pub mod evolution;
pub mod metrics;
pub mod objective;
pub mod operators;
pub mod parallel;
pub mod population;
pub mod problem;
pub mod registry;
pub mod replacement;
pub mod rng;
pub mod selection;
pub mod termination;

// Re-export commonly used types for convenience
pub use alps::{AgedGenotype, Alps, AlpsOptions, AlpsState};
pub use error::{GeneticError, OptionExt, Result, ResultExt};
pub use evolution::{
    AlgorithmDriver, EvolutionOptions, GeneticAlgorithm, Interceptor, IterativeAlgorithm,
    PopulationState, RunOutcome, StopReason,
};
pub use objective::{Direction, Objective, ObjectiveVector};
pub use population::{Population, Solution, Survivor};
pub use problem::{Problem, SearchSpace, Unconstrained};
pub use registry::{InstanceRegistry, Stateless};
pub use rng::RandomNumberGenerator;
