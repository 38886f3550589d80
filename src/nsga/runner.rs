//! NSGA-II generational loop.
//!
//! [`NsgaRunner`] orchestrates the complete search:
//! initial pool → deduplicate → evaluate → scale → rank and truncate,
//! then for every generation: assemble pool → deduplicate → evaluate →
//! scale → rank and truncate. The loop runs a fixed number of generations.

use super::cache::EvaluationCache;
use super::config::NsgaConfig;
use super::multi_objective::truncate;
use super::objective::ObjectiveVector;
use super::operators::{deduplicate, fill_distinct, initial_pool, next_pool};
use super::scaling::{compute_statistics, scale_population};
use super::types::{GeneSpace, Individual, ObjectiveEvaluator};
use crate::error::{Result, SearchError};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// One member of the returned Pareto front.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParetoSolution {
    /// Selected gene indices, ascending.
    pub genes: Vec<usize>,

    /// Raw objective values reported by the evaluator.
    pub objectives: Vec<f64>,
}

/// Bookkeeping for one generation.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GenerationStats {
    /// 0 for the initial population.
    pub generation: usize,

    /// Distinct individuals in the combined pool before truncation.
    pub pool_size: usize,

    /// Evaluator invocations made this generation.
    pub new_evaluations: usize,

    /// Distinct chromosomes cached so far.
    pub cache_size: usize,

    /// Rank-0 individuals in the surviving population.
    pub front_size: usize,

    /// Whether scaling fell back to raw objectives.
    pub degenerate_scaling: bool,
}

/// Result of an NSGA-II run.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NsgaResult {
    /// Gene lists of the final non-dominated front, shorter lists first,
    /// then lexicographic.
    pub front: Vec<Vec<usize>>,

    /// Same order as `front`, with objective values attached.
    pub solutions: Vec<ParetoSolution>,

    pub objective_names: Vec<String>,

    /// Generations completed after the initial population.
    pub generations: usize,

    /// Whether the run was cancelled externally.
    pub cancelled: bool,

    /// Total evaluator invocations.
    pub evaluations: usize,

    /// One entry for the initial population plus one per generation.
    pub history: Vec<GenerationStats>,
}

/// Executes the NSGA-II loop.
///
/// # Usage
///
/// ```
/// use std::convert::Infallible;
/// use u_featsel::nsga::{Chromosome, FnEvaluator, GeneSpace, NsgaConfig, NsgaRunner, ObjectiveVector};
///
/// // Trade subset size against the number of genes left out.
/// let evaluator = FnEvaluator::new(2, |c: &Chromosome| {
///     let k = c.count_set() as f64;
///     Ok::<_, Infallible>(ObjectiveVector::new(vec![k, 6.0 - k]))
/// });
/// let config = NsgaConfig::default()
///     .with_population_size(8)
///     .with_generations(5)
///     .with_seed(42);
///
/// let result = NsgaRunner::run(&GeneSpace::new(6), &evaluator, &config).unwrap();
/// assert_eq!(result.front.len(), 8);
/// ```
pub struct NsgaRunner;

impl NsgaRunner {
    /// Runs the search to completion.
    ///
    /// # Errors
    /// Returns an error if the configuration or gene space is invalid, or
    /// if the evaluator fails. Configuration errors are reported before the
    /// evaluator is first called.
    pub fn run<E: ObjectiveEvaluator>(
        space: &GeneSpace,
        evaluator: &E,
        config: &NsgaConfig,
    ) -> Result<NsgaResult> {
        Self::run_with_cancel(space, evaluator, config, None)
    }

    /// Runs the search with an optional cancellation token.
    ///
    /// If `cancel` is `Some` and the flag is set to `true`, the search stops
    /// before the next generation and returns the current front.
    pub fn run_with_cancel<E: ObjectiveEvaluator>(
        space: &GeneSpace,
        evaluator: &E,
        config: &NsgaConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<NsgaResult> {
        config.validate()?;
        space.validate(config.population_size)?;
        let objective_count = evaluator.objective_count();
        if objective_count == 0 {
            return Err(SearchError::NoObjectives);
        }
        let objective_names = evaluator.objective_names();

        info!(
            "nsga: starting search over {} genes, {} objectives {:?}, population {}, {} generations, seed {}",
            space.num_genes,
            objective_count,
            objective_names,
            config.population_size,
            config.generations,
            config.seed
        );

        let mut rng = StdRng::seed_from_u64(config.seed);
        let mut cache = EvaluationCache::new();
        let mut history = Vec::with_capacity(config.generations + 1);

        // 1. Generation zero
        let pool = initial_pool(space, objective_count, config.population_size, &mut rng)?;
        let pool = deduplicate(pool);
        let pool = fill_distinct(pool, space, objective_count, config.population_size, &mut rng);
        let (mut population, mut sum_fitness, stats) =
            evaluate_and_rank(pool, 0, &mut cache, evaluator, config)?;
        history.push(stats);

        // 2. Generational loop
        let mut completed = 0;
        let mut cancelled = false;
        for gen in 1..=config.generations {
            if let Some(ref flag) = cancel {
                if flag.load(Ordering::Relaxed) {
                    cancelled = true;
                    break;
                }
            }

            let pool = next_pool(&population, &sum_fitness, space, config, &mut rng);
            let pool = deduplicate(pool);
            let pool = fill_distinct(pool, space, objective_count, config.population_size, &mut rng);
            let (next, next_sum, stats) =
                evaluate_and_rank(pool, gen, &mut cache, evaluator, config)?;
            population = next;
            sum_fitness = next_sum;
            history.push(stats);
            completed = gen;
        }

        let solutions = extract_front(&population);
        info!(
            "nsga: finished after {} generations{}, front of {}, {} evaluations",
            completed,
            if cancelled { " (cancelled)" } else { "" },
            solutions.len(),
            cache.evaluations()
        );

        Ok(NsgaResult {
            front: solutions.iter().map(|s| s.genes.clone()).collect(),
            solutions,
            objective_names,
            generations: completed,
            cancelled,
            evaluations: cache.evaluations(),
            history,
        })
    }
}

/// Evaluates a deduplicated pool, scales it and truncates it to the
/// population size. Returns the survivors and the selection sum.
fn evaluate_and_rank<E: ObjectiveEvaluator>(
    mut pool: Vec<Individual>,
    generation: usize,
    cache: &mut EvaluationCache,
    evaluator: &E,
    config: &NsgaConfig,
) -> Result<(Vec<Individual>, ObjectiveVector, GenerationStats)> {
    let new_evaluations = cache.resolve_pool(&mut pool, evaluator, config.parallel)?;

    let stats = compute_statistics(&pool);
    let outcome = scale_population(&mut pool, &stats);
    let pool_size = pool.len();

    let population = truncate(pool, config.population_size);
    let front_size = population.iter().filter(|i| i.rank == Some(0)).count();

    debug!(
        "nsga: generation {generation}: pool {pool_size}, {new_evaluations} new evaluations, cache {}, front {front_size}{}",
        cache.len(),
        if outcome.degenerate { ", scaling fell back to raw objectives" } else { "" }
    );

    let stats = GenerationStats {
        generation,
        pool_size,
        new_evaluations,
        cache_size: cache.len(),
        front_size,
        degenerate_scaling: outcome.degenerate,
    };
    Ok((population, outcome.sum_fitness, stats))
}

/// Rank-0 members as distinct gene lists, shorter lists first, then
/// lexicographic.
fn extract_front(population: &[Individual]) -> Vec<ParetoSolution> {
    let mut solutions: Vec<ParetoSolution> = population
        .iter()
        .filter(|ind| ind.rank == Some(0))
        .map(|ind| ParetoSolution {
            genes: ind.chromosome.to_sorted_indices(),
            objectives: ind.objectives.as_slice().to_vec(),
        })
        .collect();

    solutions.sort_by(|a, b| {
        a.genes
            .len()
            .cmp(&b.genes.len())
            .then_with(|| a.genes.cmp(&b.genes))
    });
    solutions.dedup_by(|a, b| a.genes == b.genes);
    solutions
}

// ============================================================================
// Tests
// ============================================================================
