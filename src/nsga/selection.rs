//! Multi-objective proportional selection.
//!
//! Roulette-wheel selection generalized component-wise: one threshold is
//! drawn per objective, and the wheel stops at the first individual whose
//! cumulative fitness exceeds the thresholds in **every** objective at once.
//! With more than one objective this is stricter than independent
//! per-objective roulette and biases the draw toward later indices.
//!
//! # References
//!
//! - Goldberg (1989), *Genetic Algorithms in Search, Optimization, and
//!   Machine Learning*, roulette-wheel selection

use super::objective::ObjectiveVector;
use super::types::Individual;
use rand::Rng;

/// Selects a parent index from `population`.
///
/// `sum_fitness` is the selection sum produced by the last scaling pass.
/// Falls back to the last index when no prefix exceeds every threshold.
///
/// # Panics
/// Panics if `population` is empty.
pub fn select<R: Rng>(population: &[Individual], sum_fitness: &ObjectiveVector, rng: &mut R) -> usize {
    assert!(
        !population.is_empty(),
        "cannot select from empty population"
    );
    let n = population.len();

    let thresholds = ObjectiveVector::new(
        sum_fitness
            .iter()
            .map(|&total| rng.random::<f64>() * total)
            .collect(),
    );

    let mut cumulative = ObjectiveVector::zeros(sum_fitness.len());
    for (i, ind) in population.iter().enumerate() {
        cumulative.add_assign(&ind.fitness);
        if cumulative.dominates_all(&thresholds) {
            return i;
        }
    }

    n - 1 // floating-point fallback
}
