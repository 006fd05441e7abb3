//! # Selection
//!
//! Selectors choose members of a population and report them as indices.
//! The same member may be chosen more than once unless a selector says
//! otherwise.

pub mod best;
pub mod random;
pub mod tournament;

pub use best::{best_indices, BestSelector};
pub use random::RandomSelector;
pub use tournament::TournamentSelector;
