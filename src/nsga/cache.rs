//! Objective-evaluation cache.
//!
//! The evaluator is the expensive part of a search (typically training and
//! scoring a model), so every distinct chromosome is evaluated at most once
//! per run. [`EvaluationCache`] maps chromosomes to their objective vectors
//! and never evicts.

use super::chromosome::Chromosome;
use super::objective::ObjectiveVector;
use super::types::{Individual, ObjectiveEvaluator};
use crate::error::{Result, SearchError};
use std::collections::{HashMap, HashSet};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Run-scoped memo of evaluated chromosomes.
#[derive(Debug, Default)]
pub struct EvaluationCache {
    table: HashMap<Chromosome, ObjectiveVector>,
    evaluations: usize,
}

impl EvaluationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct chromosomes stored.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Number of evaluator invocations so far.
    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    pub fn get(&self, chromosome: &Chromosome) -> Option<&ObjectiveVector> {
        self.table.get(chromosome)
    }

    /// Returns the cached objectives of `chromosome`, evaluating and storing
    /// them first on a miss.
    ///
    /// On evaluator failure nothing is stored.
    pub fn lookup_or_insert<E: ObjectiveEvaluator>(
        &mut self,
        chromosome: &Chromosome,
        evaluator: &E,
    ) -> Result<ObjectiveVector> {
        if let Some(v) = self.table.get(chromosome) {
            return Ok(v.clone());
        }
        self.evaluations += 1;
        let v = evaluate_checked(evaluator, chromosome)?;
        self.table.insert(chromosome.clone(), v.clone());
        Ok(v)
    }

    /// Fills the objectives of every individual in `pool`.
    ///
    /// Misses are collected first (each distinct chromosome once), evaluated
    /// (in parallel when `parallel` is set and the `parallel` feature is
    /// enabled), and only inserted once all of them succeeded. Returns the
    /// number of evaluator invocations made.
    pub fn resolve_pool<E: ObjectiveEvaluator>(
        &mut self,
        pool: &mut [Individual],
        evaluator: &E,
        parallel: bool,
    ) -> Result<usize> {
        let mut seen = HashSet::new();
        let misses: Vec<&Chromosome> = pool
            .iter()
            .map(|ind| &ind.chromosome)
            .filter(|c| !self.table.contains_key(*c) && seen.insert(*c))
            .collect();

        let new_evaluations = misses.len();
        self.evaluations += new_evaluations;
        let results = evaluate_all(evaluator, &misses, parallel);
        let evaluated: Vec<(Chromosome, ObjectiveVector)> = misses
            .into_iter()
            .zip(results)
            .map(|(c, r)| r.map(|v| (c.clone(), v)))
            .collect::<Result<_>>()?;
        self.table.extend(evaluated);

        for ind in pool.iter_mut() {
            if let Some(v) = self.table.get(&ind.chromosome) {
                ind.objectives = v.clone();
            }
        }
        Ok(new_evaluations)
    }
}

/// Evaluates one chromosome and checks the vector length and that every
/// value is finite.
fn evaluate_checked<E: ObjectiveEvaluator>(
    evaluator: &E,
    chromosome: &Chromosome,
) -> Result<ObjectiveVector> {
    let v = evaluator
        .evaluate(chromosome)
        .map_err(|e| SearchError::Evaluation {
            genes: chromosome.to_sorted_indices(),
            source: Box::new(e),
        })?;
    let expected = evaluator.objective_count();
    if v.len() != expected {
        return Err(SearchError::ObjectiveCount {
            expected,
            actual: v.len(),
            genes: chromosome.to_sorted_indices(),
        });
    }
    if v.any_non_finite() {
        return Err(SearchError::NonFiniteObjective {
            values: v.as_slice().to_vec(),
            genes: chromosome.to_sorted_indices(),
        });
    }
    Ok(v)
}

#[cfg(feature = "parallel")]
fn evaluate_all<E: ObjectiveEvaluator>(
    evaluator: &E,
    chromosomes: &[&Chromosome],
    parallel: bool,
) -> Vec<Result<ObjectiveVector>> {
    if parallel {
        chromosomes
            .par_iter()
            .map(|c| evaluate_checked(evaluator, c))
            .collect()
    } else {
        chromosomes
            .iter()
            .map(|c| evaluate_checked(evaluator, c))
            .collect()
    }
}

#[cfg(not(feature = "parallel"))]
fn evaluate_all<E: ObjectiveEvaluator>(
    evaluator: &E,
    chromosomes: &[&Chromosome],
    _parallel: bool,
) -> Vec<Result<ObjectiveVector>> {
    chromosomes
        .iter()
        .map(|c| evaluate_checked(evaluator, c))
        .collect()
}
