//! # Objectives
//!
//! An [`Objective`] pairs one optimization [`Direction`] per dimension with a
//! [`Comparator`]. Single objectives and user supplied scalarizations form a
//! total order, so [`Objective::compare`] is valid on them. Genuine
//! multi-objective problems carry [`Comparator::NoTotalOrder`]: callers must use
//! [`Objective::dominates`] or the documented lexicographic fallback
//! ([`Objective::rank_cmp`]) instead.
//!
//! Throughout the crate `Ordering::Less` means "left is better".
//!
//! ```rust
//! use genalps::objective::{Direction, Objective, ObjectiveVector};
//!
//! let objective = Objective::multi(vec![Direction::Minimize, Direction::Maximize]);
//! let a = ObjectiveVector::from(vec![1.0, 5.0]);
//! let b = ObjectiveVector::from(vec![2.0, 4.0]);
//!
//! assert!(objective.dominates(&a, &b));
//! assert!(!objective.dominates(&b, &a));
//! assert!(objective.compare(&a, &b).is_err());
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::ops::Index;
use std::sync::Arc;

use crate::error::{GeneticError, Result};

/// Optimization direction of a single dimension.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Minimize,
    Maximize,
}

impl Direction {
    /// Compares two values of this dimension. `Less` means `a` is better.
    ///
    /// NaN is worse than every number.
    pub fn compare(self, a: f64, b: f64) -> Ordering {
        match (a.is_nan(), b.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => {
                let ord = a.partial_cmp(&b).unwrap_or(Ordering::Equal);
                match self {
                    Direction::Minimize => ord,
                    Direction::Maximize => ord.reverse(),
                }
            }
        }
    }
}

/// Evaluated quality of a genotype, one value per dimension.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectiveVector(Vec<f64>);

impl ObjectiveVector {
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    pub fn values(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<f64> for ObjectiveVector {
    fn from(value: f64) -> Self {
        Self(vec![value])
    }
}

impl From<Vec<f64>> for ObjectiveVector {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}

impl Index<usize> for ObjectiveVector {
    type Output = f64;

    fn index(&self, index: usize) -> &f64 {
        &self.0[index]
    }
}

/// A user supplied total order over objective vectors (e.g. a weighted sum).
pub type ScalarizationFn = dyn Fn(&ObjectiveVector, &ObjectiveVector) -> Ordering + Send + Sync;

/// How objective vectors are ordered.
#[derive(Clone)]
pub enum Comparator {
    /// Compare the first (and only) dimension.
    SingleObjective,
    /// Dimension by dimension, first difference wins. An explicit total order.
    Lexicographic,
    /// A user supplied total order.
    Custom(Arc<ScalarizationFn>),
    /// No total order exists; use dominance.
    NoTotalOrder,
}

impl fmt::Debug for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Comparator::SingleObjective => write!(f, "SingleObjective"),
            Comparator::Lexicographic => write!(f, "Lexicographic"),
            Comparator::Custom(_) => write!(f, "Custom(..)"),
            Comparator::NoTotalOrder => write!(f, "NoTotalOrder"),
        }
    }
}

/// Per-dimension directions plus the comparator used to rank solutions.
#[derive(Debug, Clone)]
pub struct Objective {
    directions: Vec<Direction>,
    comparator: Comparator,
}

impl Objective {
    /// A single objective in the given direction.
    pub fn single(direction: Direction) -> Self {
        Self {
            directions: vec![direction],
            comparator: Comparator::SingleObjective,
        }
    }

    pub fn minimize() -> Self {
        Self::single(Direction::Minimize)
    }

    pub fn maximize() -> Self {
        Self::single(Direction::Maximize)
    }

    /// Several objectives without a total order (Pareto semantics).
    ///
    /// A single direction still yields a total order.
    pub fn multi(directions: Vec<Direction>) -> Self {
        let comparator = if directions.len() == 1 {
            Comparator::SingleObjective
        } else {
            Comparator::NoTotalOrder
        };
        Self {
            directions,
            comparator,
        }
    }

    /// Several objectives ranked lexicographically.
    pub fn lexicographic(directions: Vec<Direction>) -> Self {
        Self {
            directions,
            comparator: Comparator::Lexicographic,
        }
    }

    /// Several objectives ranked by a user supplied total order.
    pub fn with_comparator<F>(directions: Vec<Direction>, comparator: F) -> Self
    where
        F: Fn(&ObjectiveVector, &ObjectiveVector) -> Ordering + Send + Sync + 'static,
    {
        Self {
            directions,
            comparator: Comparator::Custom(Arc::new(comparator)),
        }
    }

    pub fn directions(&self) -> &[Direction] {
        &self.directions
    }

    pub fn dimensions(&self) -> usize {
        self.directions.len()
    }

    pub fn comparator(&self) -> &Comparator {
        &self.comparator
    }

    pub fn is_total_order(&self) -> bool {
        !matches!(self.comparator, Comparator::NoTotalOrder)
    }

    /// Checks that `vector` has one value per direction.
    pub fn validate(&self, vector: &ObjectiveVector) -> Result<()> {
        if vector.len() != self.directions.len() {
            return Err(GeneticError::FitnessCalculation(format!(
                "Objective vector has {} values but the objective has {} dimensions",
                vector.len(),
                self.directions.len()
            )));
        }
        Ok(())
    }

    /// Total-order comparison. Fails on [`Comparator::NoTotalOrder`].
    pub fn compare(&self, a: &ObjectiveVector, b: &ObjectiveVector) -> Result<Ordering> {
        match &self.comparator {
            Comparator::SingleObjective => Ok(self.directions[0].compare(a[0], b[0])),
            Comparator::Lexicographic => Ok(self.compare_lexicographic(a, b)),
            Comparator::Custom(compare) => Ok(compare(a, b)),
            Comparator::NoTotalOrder => Err(GeneticError::NoTotalOrder),
        }
    }

    /// Pareto dominance: `a` is no worse in every dimension and strictly
    /// better in at least one.
    pub fn dominates(&self, a: &ObjectiveVector, b: &ObjectiveVector) -> bool {
        if a.len() != self.directions.len() || b.len() != self.directions.len() {
            return false;
        }

        let mut strictly_better = false;
        for (i, direction) in self.directions.iter().enumerate() {
            match direction.compare(a[i], b[i]) {
                Ordering::Greater => return false,
                Ordering::Less => strictly_better = true,
                Ordering::Equal => {}
            }
        }
        strictly_better
    }

    /// Lexicographic order respecting each dimension's direction.
    pub fn compare_lexicographic(&self, a: &ObjectiveVector, b: &ObjectiveVector) -> Ordering {
        self.directions
            .iter()
            .zip(a.values().iter().zip(b.values()))
            .map(|(direction, (x, y))| direction.compare(*x, *y))
            .find(|ord| *ord != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    }

    /// The ordering used when a single ranking is unavoidable (elitism,
    /// best-of-k, progress reporting): the total order when one exists,
    /// the lexicographic order otherwise.
    pub fn rank_cmp(&self, a: &ObjectiveVector, b: &ObjectiveVector) -> Ordering {
        match &self.comparator {
            Comparator::SingleObjective => self.directions[0].compare(a[0], b[0]),
            Comparator::Lexicographic | Comparator::NoTotalOrder => {
                self.compare_lexicographic(a, b)
            }
            Comparator::Custom(compare) => compare(a, b),
        }
    }
}
