//! # Iterative execution
//!
//! An algorithm is a step function ([`IterativeAlgorithm`]) producing
//! immutable states; the [`AlgorithmDriver`] calls it until a terminator
//! stops the run. [`GenerationalEngine`] implements the generational step
//! shared by [`GeneticAlgorithm`] and ALPS.

pub mod algorithm;
pub mod driver;
pub mod engine;
pub mod genetic;
pub mod options;
pub mod state;

pub use algorithm::{Interceptor, IterativeAlgorithm};
pub use driver::{AlgorithmDriver, RunOutcome, StopReason};
pub use engine::{EngineOperators, GenerationalEngine};
pub use genetic::{GeneticAlgorithm, GeneticAlgorithmBuilder, GeneticAlgorithmInstance};
pub use options::{EvolutionOptions, EvolutionOptionsBuilder};
pub use state::PopulationState;
