//! Population statistics and linear fitness scaling.
//!
//! Raw objectives are turned into selection fitness by Goldberg-style
//! linear scaling, applied independently to every objective component:
//! `fitness = |raw * a + b|`, with `a` and `b` chosen so that the average is
//! preserved and the best individual gets [`FITNESS_MULTIPLE`] times the
//! average.
//!
//! # References
//!
//! - Goldberg (1989), *Genetic Algorithms in Search, Optimization, and
//!   Machine Learning*, ch. 3 (linear scaling with `C_mult = 2`)

use super::objective::ObjectiveVector;
use super::types::Individual;

/// Expected number of copies of the best individual after scaling.
pub const FITNESS_MULTIPLE: f64 = 2.0;

/// Component-wise summary of a population's raw objectives.
#[derive(Debug, Clone)]
pub struct PopulationStats {
    pub min: ObjectiveVector,
    pub max: ObjectiveVector,
    pub avg: ObjectiveVector,
    pub sum: ObjectiveVector,
}

/// Result of scaling a population.
#[derive(Debug, Clone)]
pub struct ScalingOutcome {
    /// Sum of the scaled fitness over the population; proportional
    /// selection in the next generation draws against it.
    pub sum_fitness: ObjectiveVector,

    /// `true` if the coefficients were non-finite and fitness fell back to
    /// the raw objectives.
    pub degenerate: bool,
}

/// Computes min, max, average and sum of the raw objectives.
///
/// # Panics
/// Panics if `population` is empty.
pub fn compute_statistics(population: &[Individual]) -> PopulationStats {
    let first = &population
        .first()
        .expect("cannot compute statistics of an empty population")
        .objectives;

    let mut min = first.clone();
    let mut max = first.clone();
    let mut sum = first.clone();
    for ind in &population[1..] {
        min = min.min_with(&ind.objectives);
        max = max.max_with(&ind.objectives);
        sum.add_assign(&ind.objectives);
    }
    let avg = sum.div_scalar(population.len() as f64);

    PopulationStats { min, max, avg, sum }
}

/// Linear scaling coefficients `(a, b)` for the given statistics.
///
/// Returns `None` when any component of either coefficient is infinite or
/// NaN, which happens whenever a component has zero spread.
pub fn scaling_coefficients(stats: &PopulationStats) -> Option<(ObjectiveVector, ObjectiveVector)> {
    let PopulationStats { min, max, avg, .. } = stats;

    let threshold = avg
        .scale(FITNESS_MULTIPLE)
        .sub(max)
        .div_scalar(FITNESS_MULTIPLE - 1.0);

    let (a, b) = if min.dominates_all(&threshold) {
        // Normal case: stretch so that max maps to FITNESS_MULTIPLE * avg
        let delta = max.sub(avg);
        let a = avg.scale(FITNESS_MULTIPLE - 1.0).div(&delta);
        let b = avg.mul(&max.sub(&avg.scale(FITNESS_MULTIPLE))).div(&delta);
        (a, b)
    } else {
        // Stretch as far as possible while keeping min at zero
        let delta = avg.sub(min);
        let a = avg.div(&delta);
        let b = min.mul(avg).div(&delta).neg();
        (a, b)
    };

    if a.any_non_finite() || b.any_non_finite() {
        None
    } else {
        Some((a, b))
    }
}

/// Writes scaled fitness into every individual and returns the new fitness sum.
pub fn scale_population(population: &mut [Individual], stats: &PopulationStats) -> ScalingOutcome {
    let coefficients = scaling_coefficients(stats);
    let objective_count = stats.sum.len();
    let mut sum_fitness = ObjectiveVector::zeros(objective_count);

    for ind in population.iter_mut() {
        ind.fitness = match &coefficients {
            Some((a, b)) => ind.objectives.mul(a).add(b).abs(),
            None => ind.objectives.clone(),
        };
        sum_fitness.add_assign(&ind.fitness);
    }

    ScalingOutcome {
        sum_fitness,
        degenerate: coefficients.is_none(),
    }
}
