//! # Error Types
//!
//! This module defines the error type shared by every operator, algorithm and
//! driver in the crate. Construction-time validation failures, runtime
//! invariant violations and errors raised by user problems all travel through
//! [`GeneticError`].
//!
//! ## Examples
//!
//! Using the `Result` type:
//!
//! ```rust
//! use genalps::error::{GeneticError, Result};
//!
//! fn validate_population_size(size: usize) -> Result<usize> {
//!     if size == 0 {
//!         return Err(GeneticError::Configuration(
//!             "Population size cannot be zero".to_string(),
//!         ));
//!     }
//!     Ok(size)
//! }
//!
//! assert!(validate_population_size(0).is_err());
//! assert_eq!(validate_population_size(10).unwrap(), 10);
//! ```
//!
//! Using the `OptionExt` trait to convert `Option` to `Result`:
//!
//! ```rust
//! use genalps::error::{GeneticError, OptionExt};
//!
//! fn first_index(indices: &[usize]) -> genalps::error::Result<usize> {
//!     indices.first().copied().ok_or_else_genetic(|| GeneticError::EmptyPopulation)
//! }
//!
//! assert!(first_index(&[]).is_err());
//! ```

use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;

/// Represents errors that can occur while composing or running an algorithm.
#[derive(Error, Debug)]
pub enum GeneticError {
    /// An invalid configuration was provided when building an operator or algorithm.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// An operator that needs at least one individual received an empty population.
    #[error("Empty population error: Cannot operate on an empty population")]
    EmptyPopulation,

    /// `Objective::compare` was called on an objective without a total order.
    #[error("Objective has no total order: use dominance or the lexicographic fallback")]
    NoTotalOrder,

    /// A lifted operator could not recover the metadata of an individual.
    #[error("Lifting error: {0}")]
    Lifting(String),

    /// A genotype outside of the search space reached evaluation.
    #[error("Bounds error: Genotype is outside of the search space - {0}")]
    OutOfBounds(String),

    /// An objective vector did not match the dimensions of its objective.
    #[error("Fitness calculation error: {0}")]
    FitnessCalculation(String),

    /// NaN or infinite values where finite values are required.
    #[error("Invalid numeric value: {0}")]
    InvalidNumericValue(String),

    /// A step or driver level failure.
    #[error("Evolution error: {0}")]
    Evolution(String),

    /// A generic error with a custom message.
    #[error("{0}")]
    Other(String),
}

/// A specialized Result type for operator and algorithm calls.
pub type Result<T> = std::result::Result<T, GeneticError>;

/// Extension trait for Result to add context to errors.
///
/// Problems that call into foreign libraries can use it to surface their
/// failures as [`GeneticError::Other`].
///
/// ## Examples
///
/// ```rust
/// use genalps::error::ResultExt;
///
/// fn parse_weight(raw: &str) -> genalps::error::Result<f64> {
///     raw.parse::<f64>().context("Failed to parse weight")
/// }
///
/// assert!(parse_weight("abc").is_err());
/// ```
pub trait ResultExt<T, E> {
    /// Adds context to an error, converting it to a `GeneticError`.
    fn context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static;
}

impl<T, E> ResultExt<T, E> for std::result::Result<T, E>
where
    E: StdError + Send + Sync + 'static,
{
    fn context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|e| GeneticError::Other(format!("{}: {}", context, e)))
    }
}

/// Extension trait for Option to convert to Result with a custom error.
pub trait OptionExt<T> {
    /// Converts an `Option<T>` to a `Result<T, GeneticError>` using `err_fn`.
    fn ok_or_else_genetic<F>(self, err_fn: F) -> Result<T>
    where
        F: FnOnce() -> GeneticError;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_else_genetic<F>(self, err_fn: F) -> Result<T>
    where
        F: FnOnce() -> GeneticError,
    {
        self.ok_or_else(err_fn)
    }
}
