//! # Solutions and populations
//!
//! A [`Solution`] is an immutable pairing of a genotype with the objective
//! vector produced by evaluating it. A [`Population`] is an immutable, cheaply
//! clonable collection of solutions: every generation creates a new one and
//! nothing mutates an existing one in place.

use std::sync::Arc;

use crate::error::{GeneticError, Result};
use crate::objective::{Objective, ObjectiveVector};

/// An evaluated genotype.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Solution<G> {
    genotype: G,
    objectives: ObjectiveVector,
}

impl<G> Solution<G> {
    pub fn new(genotype: G, objectives: ObjectiveVector) -> Self {
        Self {
            genotype,
            objectives,
        }
    }

    pub fn genotype(&self) -> &G {
        &self.genotype
    }

    pub fn objectives(&self) -> &ObjectiveVector {
        &self.objectives
    }

    pub fn into_parts(self) -> (G, ObjectiveVector) {
        (self.genotype, self.objectives)
    }

    /// Rewraps the genotype, keeping the objective vector.
    pub fn map_genotype<H>(self, f: impl FnOnce(G) -> H) -> Solution<H> {
        Solution {
            genotype: f(self.genotype),
            objectives: self.objectives,
        }
    }
}

/// Where a member of a replaced population came from.
///
/// Replacers report survivors through this identity channel instead of
/// returning copies, so wrappers can carry metadata across replacement
/// without comparing genotypes by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Survivor {
    /// Index into the previous population.
    Previous(usize),
    /// Index into the evaluated offspring.
    Offspring(usize),
}

/// An immutable collection of solutions.
#[derive(Debug, PartialEq)]
pub struct Population<G> {
    solutions: Arc<[Solution<G>]>,
}

impl<G> Clone for Population<G> {
    fn clone(&self) -> Self {
        Self {
            solutions: Arc::clone(&self.solutions),
        }
    }
}

impl<G> Population<G> {
    pub fn new(solutions: Vec<Solution<G>>) -> Self {
        Self {
            solutions: Arc::from(solutions),
        }
    }

    /// Zips genotypes with their objective vectors.
    pub fn from_parts(genotypes: Vec<G>, objectives: Vec<ObjectiveVector>) -> Result<Self> {
        if genotypes.len() != objectives.len() {
            return Err(GeneticError::FitnessCalculation(format!(
                "Received {} objective vectors for {} genotypes",
                objectives.len(),
                genotypes.len()
            )));
        }

        Ok(Self::new(
            genotypes
                .into_iter()
                .zip(objectives)
                .map(|(genotype, objectives)| Solution::new(genotype, objectives))
                .collect(),
        ))
    }

    pub fn len(&self) -> usize {
        self.solutions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.solutions.is_empty()
    }

    pub fn solutions(&self) -> &[Solution<G>] {
        &self.solutions
    }

    pub fn get(&self, index: usize) -> Option<&Solution<G>> {
        self.solutions.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Solution<G>> {
        self.solutions.iter()
    }

    /// Whether both handles share the same storage.
    pub fn ptr_eq(&self, other: &Population<G>) -> bool {
        Arc::ptr_eq(&self.solutions, &other.solutions)
    }

    /// The best solution under [`Objective::rank_cmp`].
    pub fn best(&self, objective: &Objective) -> Option<&Solution<G>> {
        self.solutions
            .iter()
            .min_by(|a, b| objective.rank_cmp(a.objectives(), b.objectives()))
    }

    /// Builds a new population by transforming every genotype.
    pub fn map_genotypes<H>(&self, f: impl Fn(&G) -> H) -> Population<H> {
        Population::new(
            self.solutions
                .iter()
                .map(|s| Solution::new(f(&s.genotype), s.objectives.clone()))
                .collect(),
        )
    }
}

impl<G: Clone> Population<G> {
    /// Copies out the solutions at `indices` (duplicates allowed).
    pub fn pick(&self, indices: &[usize]) -> Result<Vec<Solution<G>>> {
        indices
            .iter()
            .map(|&i| {
                self.solutions.get(i).cloned().ok_or_else(|| {
                    GeneticError::Evolution(format!(
                        "Selected index {} is outside of a population of {}",
                        i,
                        self.solutions.len()
                    ))
                })
            })
            .collect()
    }

    /// Materializes the population described by a replacer's survivors.
    pub fn assemble(
        previous: &Population<G>,
        offspring: &Population<G>,
        survivors: &[Survivor],
    ) -> Result<Population<G>> {
        let solutions = survivors
            .iter()
            .map(|survivor| {
                let (source, index, name) = match *survivor {
                    Survivor::Previous(i) => (previous, i, "previous population"),
                    Survivor::Offspring(i) => (offspring, i, "offspring"),
                };
                source.get(index).cloned().ok_or_else(|| {
                    GeneticError::Evolution(format!(
                        "Survivor index {} is outside of the {} ({} members)",
                        index,
                        name,
                        source.len()
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Population::new(solutions))
    }
}

impl<'a, G> IntoIterator for &'a Population<G> {
    type Item = &'a Solution<G>;
    type IntoIter = std::slice::Iter<'a, Solution<G>>;

    fn into_iter(self) -> Self::IntoIter {
        self.solutions.iter()
    }
}
