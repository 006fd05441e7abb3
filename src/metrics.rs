//! # Operator metrics
//!
//! Every step records, per phase, how many times an operator was invoked
//! and how long it took. Metrics are additive, so a run's totals are the
//! sum of its generations.

use std::ops::{Add, AddAssign};
use std::time::{Duration, Instant};

/// Invocation count and accumulated wall-clock time of one operator role.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OperatorMetric {
    pub count: u64,
    pub duration: Duration,
}

impl OperatorMetric {
    pub fn new(count: u64, duration: Duration) -> Self {
        Self { count, duration }
    }

    /// Runs `f` once and records it.
    pub fn measure<T>(&mut self, f: impl FnOnce() -> T) -> T {
        let start = Instant::now();
        let result = f();
        *self += OperatorMetric::new(1, start.elapsed());
        result
    }
}

impl Add for OperatorMetric {
    type Output = OperatorMetric;

    fn add(self, other: OperatorMetric) -> OperatorMetric {
        OperatorMetric {
            count: self.count + other.count,
            duration: self.duration + other.duration,
        }
    }
}

impl AddAssign for OperatorMetric {
    fn add_assign(&mut self, other: OperatorMetric) {
        *self = *self + other;
    }
}

/// Metrics of every phase of a generation.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerationMetrics {
    pub creation: OperatorMetric,
    pub evaluation: OperatorMetric,
    pub selection: OperatorMetric,
    pub crossover: OperatorMetric,
    pub mutation: OperatorMetric,
    pub replacement: OperatorMetric,
}

impl GenerationMetrics {
    /// Total time across all phases.
    pub fn total_duration(&self) -> Duration {
        self.creation.duration
            + self.evaluation.duration
            + self.selection.duration
            + self.crossover.duration
            + self.mutation.duration
            + self.replacement.duration
    }
}

impl Add for GenerationMetrics {
    type Output = GenerationMetrics;

    fn add(self, other: GenerationMetrics) -> GenerationMetrics {
        GenerationMetrics {
            creation: self.creation + other.creation,
            evaluation: self.evaluation + other.evaluation,
            selection: self.selection + other.selection,
            crossover: self.crossover + other.crossover,
            mutation: self.mutation + other.mutation,
            replacement: self.replacement + other.replacement,
        }
    }
}

impl AddAssign for GenerationMetrics {
    fn add_assign(&mut self, other: GenerationMetrics) {
        *self = *self + other;
    }
}
