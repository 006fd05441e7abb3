//! # EvolutionOptions
//!
//! The `EvolutionOptions` struct holds the hyperparameters shared by the
//! generational algorithms: population size, mutation rate and the batch
//! size from which operators run in parallel.
//!
//! ## Example
//!
//! ```rust
//! use genalps::evolution::options::EvolutionOptions;
//!
//! // Create a new EvolutionOptions instance with custom parameters
//! let custom_options = EvolutionOptions::new(50, 0.1);
//! assert_eq!(custom_options.get_population_size(), 50);
//!
//! // Or through the builder
//! let built = EvolutionOptions::builder()
//!     .population_size(200)
//!     .parallel_threshold(64)
//!     .build();
//! assert_eq!(built.get_mutation_rate(), 0.05);
//! assert!(built.validate().is_ok());
//! ```

use crate::error::{GeneticError, Result};
use crate::parallel::DEFAULT_PARALLEL_THRESHOLD;

const DEFAULT_POPULATION_SIZE: usize = 100;
const DEFAULT_MUTATION_RATE: f64 = 0.05;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "OptionFields"))]
#[derive(Debug, Clone, PartialEq)]
pub struct EvolutionOptions {
    population_size: usize,
    /// Probability that an offspring is routed to the mutator.
    mutation_rate: f64,
    /// Minimum number of items to process in parallel
    parallel_threshold: usize,
}

impl EvolutionOptions {
    pub fn new(population_size: usize, mutation_rate: f64) -> Self {
        Self {
            population_size,
            mutation_rate,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }

    pub fn new_with_threshold(
        population_size: usize,
        mutation_rate: f64,
        parallel_threshold: usize,
    ) -> Self {
        Self {
            population_size,
            mutation_rate,
            parallel_threshold,
        }
    }

    pub fn get_population_size(&self) -> usize {
        self.population_size
    }

    pub fn get_mutation_rate(&self) -> f64 {
        self.mutation_rate
    }

    /// Returns the minimum number of items to process in parallel.
    pub fn get_parallel_threshold(&self) -> usize {
        self.parallel_threshold
    }

    pub fn set_population_size(&mut self, population_size: usize) {
        self.population_size = population_size;
    }

    pub fn set_mutation_rate(&mut self, mutation_rate: f64) {
        self.mutation_rate = mutation_rate;
    }

    pub fn set_parallel_threshold(&mut self, threshold: usize) {
        self.parallel_threshold = threshold;
    }

    /// Checks the options before a run.
    ///
    /// # Errors
    ///
    /// - `Configuration` if the population size is zero or the mutation
    ///   rate is outside of `[0, 1]`.
    /// - `InvalidNumericValue` if the mutation rate is not finite.
    pub fn validate(&self) -> Result<()> {
        if self.population_size == 0 {
            return Err(GeneticError::Configuration(
                "Population size cannot be zero".to_string(),
            ));
        }
        if !self.mutation_rate.is_finite() {
            return Err(GeneticError::InvalidNumericValue(format!(
                "Mutation rate {} is not finite",
                self.mutation_rate
            )));
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(GeneticError::Configuration(format!(
                "Mutation rate {} is outside of [0, 1]",
                self.mutation_rate
            )));
        }
        Ok(())
    }

    /// Returns a builder for creating an `EvolutionOptions` instance.
    pub fn builder() -> EvolutionOptionsBuilder {
        EvolutionOptionsBuilder::default()
    }
}

/// Deserialized form; options read from a file go through [`EvolutionOptions::validate`].
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct OptionFields {
    population_size: usize,
    mutation_rate: f64,
    parallel_threshold: usize,
}

#[cfg(feature = "serde")]
impl TryFrom<OptionFields> for EvolutionOptions {
    type Error = GeneticError;

    fn try_from(fields: OptionFields) -> Result<Self> {
        let options = Self::new_with_threshold(
            fields.population_size,
            fields.mutation_rate,
            fields.parallel_threshold,
        );
        options.validate()?;
        Ok(options)
    }
}

impl Default for EvolutionOptions {
    fn default() -> Self {
        Self {
            population_size: DEFAULT_POPULATION_SIZE,
            mutation_rate: DEFAULT_MUTATION_RATE,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

/// Builder for `EvolutionOptions`.
#[derive(Debug, Clone, Default)]
pub struct EvolutionOptionsBuilder {
    population_size: Option<usize>,
    mutation_rate: Option<f64>,
    parallel_threshold: Option<usize>,
}

impl EvolutionOptionsBuilder {
    pub fn population_size(mut self, value: usize) -> Self {
        self.population_size = Some(value);
        self
    }

    pub fn mutation_rate(mut self, value: f64) -> Self {
        self.mutation_rate = Some(value);
        self
    }

    pub fn parallel_threshold(mut self, value: usize) -> Self {
        self.parallel_threshold = Some(value);
        self
    }

    /// Builds the `EvolutionOptions`, filling unset fields with defaults.
    pub fn build(self) -> EvolutionOptions {
        EvolutionOptions {
            population_size: self.population_size.unwrap_or(DEFAULT_POPULATION_SIZE),
            mutation_rate: self.mutation_rate.unwrap_or(DEFAULT_MUTATION_RATE),
            parallel_threshold: self
                .parallel_threshold
                .unwrap_or(DEFAULT_PARALLEL_THRESHOLD),
        }
    }
}
