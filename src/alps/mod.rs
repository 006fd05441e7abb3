//! # ALPS
//!
//! The Age-Layered Population Structure algorithm tracks, for every
//! individual, how many generations its genetic material has been bred for.
//! It is built as a specialization of the generic [`GenerationalEngine`]:
//! every operator is configured over plain genotypes `G` and lifted into
//! [`AgedGenotype<G>`] by the wrappers in [`lifting`], which maintain ages
//! without the operators knowing about them.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use genalps::alps::{Alps, AlpsOptions};
//! use genalps::error::Result;
//! use genalps::objective::{Objective, ObjectiveVector};
//! use genalps::operators::{
//!     Broadcast, ContextFreeCreator, ContextFreeCrossover, ContextFreeMutator,
//! };
//! use genalps::problem::{Problem, Unconstrained};
//! use genalps::replacement::ElitismReplacer;
//! use genalps::rng::RandomNumberGenerator;
//! use genalps::selection::TournamentSelector;
//! use genalps::termination::MaxGenerationTerminator;
//! use rand::Rng;
//!
//! struct OnesMax(Objective);
//!
//! impl Problem<Vec<bool>> for OnesMax {
//!     fn objective(&self) -> &Objective {
//!         &self.0
//!     }
//!
//!     fn evaluate(
//!         &self,
//!         bits: &Vec<bool>,
//!         _: &mut RandomNumberGenerator,
//!     ) -> Result<ObjectiveVector> {
//!         Ok(ObjectiveVector::from(bits.iter().filter(|b| **b).count() as f64))
//!     }
//! }
//!
//! #[derive(Clone)]
//! struct RandomBits;
//!
//! impl ContextFreeCreator<Vec<bool>> for RandomBits {
//!     fn generate(&self, rng: &mut RandomNumberGenerator) -> Vec<bool> {
//!         (0..16).map(|_| rng.gen_bool(0.5)).collect()
//!     }
//! }
//!
//! #[derive(Clone)]
//! struct Uniform;
//!
//! impl ContextFreeCrossover<Vec<bool>> for Uniform {
//!     fn recombine(
//!         &self,
//!         a: &Vec<bool>,
//!         b: &Vec<bool>,
//!         rng: &mut RandomNumberGenerator,
//!     ) -> Vec<bool> {
//!         a.iter().zip(b).map(|(x, y)| if rng.gen_bool(0.5) { *x } else { *y }).collect()
//!     }
//! }
//!
//! #[derive(Clone)]
//! struct Flip;
//!
//! impl ContextFreeMutator<Vec<bool>> for Flip {
//!     fn perturb(&self, mut bits: Vec<bool>, rng: &mut RandomNumberGenerator) -> Vec<bool> {
//!         let i = rng.gen_range(0..bits.len());
//!         bits[i] = !bits[i];
//!         bits
//!     }
//! }
//!
//! let alps = Alps::<Vec<bool>, Unconstrained, OnesMax>::builder()
//!     .with_options(AlpsOptions::new(30, 0.2))
//!     .with_creator(Arc::new(Broadcast::context_free(RandomBits)))
//!     .with_crossover(Arc::new(Broadcast::context_free(Uniform)))
//!     .with_mutator(Arc::new(Broadcast::context_free(Flip)))
//!     .with_selector(Arc::new(TournamentSelector::new(3).unwrap()))
//!     .with_replacer(Arc::new(ElitismReplacer::new(2)))
//!     .with_terminator(Arc::new(MaxGenerationTerminator::new(20)))
//!     .build()
//!     .unwrap();
//!
//! let problem = OnesMax(Objective::maximize());
//! let mut rng = RandomNumberGenerator::from_seed(42);
//! let outcome = alps.execute(&mut rng, &Unconstrained, &problem).unwrap();
//!
//! assert_eq!(outcome.state.generation(), 20);
//! assert!(outcome.state.max_age() <= 20);
//! ```
//!
//! [`GenerationalEngine`]: crate::evolution::GenerationalEngine

pub mod algorithm;
pub mod genotype;
pub mod lifting;
pub mod state;

pub use algorithm::{Alps, AlpsBuilder, AlpsInstance};
pub use genotype::AgedGenotype;
pub use lifting::{
    AgingCreator, AgingCrossover, AgingEvaluator, AgingMutator, AgingReplacer, AgingSelector,
    AgingTerminator,
};
pub use state::AlpsState;

/// Hyperparameters of an ALPS run.
pub type AlpsOptions = crate::evolution::options::EvolutionOptions;
