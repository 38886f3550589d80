//! Pareto ranking for NSGA-II.
//!
//! All objectives are **maximized**: larger values are better.
//!
//! # Algorithms
//!
//! - [`dominate`]: three-way dominance test
//! - [`non_dominated_sort`]: Fast non-dominated sorting (Deb et al., 2002)
//! - [`crowding_distance`]: Crowding distance for diversity preservation
//! - [`truncate`]: Front-by-front survivor selection down to a target size
//!
//! # Crowding distance at the extremes
//!
//! Canonical NSGA-II gives the two extreme members of every per-objective
//! ordering an infinite distance. Here the extremes simply receive no
//! contribution from that objective, so a member that is extreme in every
//! objective ends with distance 0 and is the first to be cut from a boundary
//! front. This biases truncation against extreme trade-offs and is kept
//! intentionally.
//!
//! # References
//!
//! - Deb et al. (2002), "A Fast and Elitist Multiobjective Genetic Algorithm: NSGA-II"
//! - IEEE Transactions on Evolutionary Computation, 6(2), 182-197

use super::objective::ObjectiveVector;
use super::types::Individual;
use std::cmp::Ordering;

/// Three-way dominance test.
///
/// Returns `1` if `a` dominates `b`, `-1` if `b` dominates `a`, and `0` if
/// neither does (including identical vectors).
///
/// The per-objective signs are folded into a running sign: a zero sign
/// adopts the next non-zero one, and two opposing non-zero signs make the
/// pair mutually non-dominated. A NaN component ties with anything, which
/// keeps the test antisymmetric.
///
/// # Example
///
/// ```
/// use u_featsel::nsga::ObjectiveVector;
/// use u_featsel::nsga::multi_objective::dominate;
///
/// let a = ObjectiveVector::new(vec![3.0, 2.0]);
/// let b = ObjectiveVector::new(vec![3.0, 1.0]);
/// assert_eq!(dominate(&a, &b), 1);
/// assert_eq!(dominate(&b, &a), -1);
/// assert_eq!(dominate(&a, &a), 0);
/// ```
pub fn dominate(a: &ObjectiveVector, b: &ObjectiveVector) -> i8 {
    // Incomparable values (NaN) count as a tie
    let sign = |x: f64, y: f64| -> i8 {
        match x.partial_cmp(&y) {
            Some(Ordering::Greater) => 1,
            Some(Ordering::Less) => -1,
            _ => 0,
        }
    };

    let mut running = 0i8;
    for (i, (&x, &y)) in a.iter().zip(b.iter()).enumerate() {
        let s = sign(x, y);
        if i == 0 || running == 0 {
            running = s;
        } else if s != 0 && s != running {
            return 0;
        }
    }
    running
}

/// Result of non-dominated sorting.
///
/// Each element of `ranks` corresponds to the Pareto rank of the solution
/// at the same index. Rank 0 is the Pareto front (non-dominated solutions).
#[derive(Debug, Clone)]
pub struct NondominatedSortResult {
    /// Pareto rank for each solution (0 = front).
    pub ranks: Vec<usize>,

    /// Indices grouped by front: `fronts[0]` contains rank-0 indices, etc.
    pub fronts: Vec<Vec<usize>>,
}

/// Domination bookkeeping over a pool, as index-based adjacency.
///
/// `dominated[i]` lists the indices `i` dominates; `domination_count[j]` is
/// how many indices dominate `j`.
#[derive(Debug, Clone)]
pub struct DominationGraph {
    pub domination_count: Vec<usize>,
    pub dominated: Vec<Vec<usize>>,
}

impl DominationGraph {
    /// Compares every pair once. O(m * n²).
    pub fn build(objectives: &[&ObjectiveVector]) -> Self {
        let n = objectives.len();
        let mut domination_count = vec![0usize; n];
        let mut dominated: Vec<Vec<usize>> = vec![Vec::new(); n];

        for i in 0..n {
            for j in (i + 1)..n {
                match dominate(objectives[i], objectives[j]) {
                    1 => {
                        dominated[i].push(j);
                        domination_count[j] += 1;
                    }
                    -1 => {
                        dominated[j].push(i);
                        domination_count[i] += 1;
                    }
                    _ => {}
                }
            }
        }

        Self {
            domination_count,
            dominated,
        }
    }
}

/// Fast non-dominated sorting.
///
/// Assigns a Pareto rank to each solution based on dominance relationships.
///
/// # Algorithm (Deb et al., 2002)
///
/// 1. For each pair of solutions, determine dominance
/// 2. Solutions dominated by no other belong to front 0 (rank 0)
/// 3. Peel front 0 by decrementing the counts of everything it dominates;
///    counts reaching zero form the next front. Repeat until a front is empty.
///
/// # Complexity
///
/// O(m * n²) where m = number of objectives, n = number of solutions
///
/// # Example
///
/// ```
/// use u_featsel::nsga::ObjectiveVector;
/// use u_featsel::nsga::multi_objective::non_dominated_sort;
///
/// let objectives: Vec<ObjectiveVector> = vec![
///     vec![5.0, 1.0],  // A
///     vec![3.0, 3.0],  // B
///     vec![1.0, 5.0],  // C
///     vec![2.0, 2.0],  // D, dominated by B
/// ]
/// .into_iter()
/// .map(ObjectiveVector::new)
/// .collect();
///
/// let result = non_dominated_sort(&objectives);
/// assert_eq!(result.ranks, vec![0, 0, 0, 1]);
/// ```
pub fn non_dominated_sort(objectives: &[ObjectiveVector]) -> NondominatedSortResult {
    let refs: Vec<&ObjectiveVector> = objectives.iter().collect();
    sort_refs(&refs)
}

fn sort_refs(objectives: &[&ObjectiveVector]) -> NondominatedSortResult {
    let n = objectives.len();
    if n == 0 {
        return NondominatedSortResult {
            ranks: Vec::new(),
            fronts: Vec::new(),
        };
    }

    let DominationGraph {
        mut domination_count,
        dominated,
    } = DominationGraph::build(objectives);

    let mut ranks = vec![0usize; n];
    let front_0: Vec<usize> = (0..n).filter(|&i| domination_count[i] == 0).collect();

    let mut fronts = vec![front_0];
    loop {
        let current = fronts.last().expect("fronts is initialized with front_0; never empty");
        let mut next_front = Vec::new();

        for &i in current {
            for &j in &dominated[i] {
                domination_count[j] -= 1;
                if domination_count[j] == 0 {
                    ranks[j] = fronts.len();
                    next_front.push(j);
                }
            }
        }

        if next_front.is_empty() {
            break;
        }
        fronts.push(next_front);
    }

    NondominatedSortResult { ranks, fronts }
}

/// Crowding distance of each member of one front.
///
/// For every objective the front is stably sorted (descending, starting
/// from the order left by the previous objective) and each interior member
/// adds `|next - prev|` in that objective. The first and last member of each
/// ordering get no contribution. Distances are not normalized.
///
/// # Example
///
/// ```
/// use u_featsel::nsga::ObjectiveVector;
/// use u_featsel::nsga::multi_objective::crowding_distance;
///
/// let a = ObjectiveVector::new(vec![5.0, 1.0]);
/// let b = ObjectiveVector::new(vec![3.0, 3.0]);
/// let c = ObjectiveVector::new(vec![1.0, 5.0]);
///
/// let d = crowding_distance(&[&a, &b, &c]);
/// assert_eq!(d, vec![0.0, 8.0, 0.0]);
/// ```
pub fn crowding_distance(objectives: &[&ObjectiveVector]) -> Vec<f64> {
    crowding_sort(objectives).1
}

/// Returns the member order after the last per-objective sort, and the
/// distances indexed by member.
fn crowding_sort(objectives: &[&ObjectiveVector]) -> (Vec<usize>, Vec<f64>) {
    let n = objectives.len();
    let mut order: Vec<usize> = (0..n).collect();
    let mut distances = vec![0.0f64; n];
    let m = objectives.first().map_or(0, |o| o.len());

    for obj_idx in 0..m {
        order.sort_by(|&a, &b| objectives[b][obj_idx].total_cmp(&objectives[a][obj_idx]));
        for k in 1..n.saturating_sub(1) {
            let prev = objectives[order[k - 1]][obj_idx];
            let next = objectives[order[k + 1]][obj_idx];
            distances[order[k]] += (next - prev).abs();
        }
    }

    (order, distances)
}

/// Ranks a combined pool and keeps the best `target` individuals.
///
/// Every individual gets its Pareto rank. Whole fronts are kept in rank
/// order while they fit; the first front that would overflow is ordered by
/// descending crowding distance and cut at exactly `target`. Crowding
/// distance is only computed for that boundary front.
///
/// Returns the whole ranked pool if it holds `target` or fewer individuals.
pub fn truncate(pool: Vec<Individual>, target: usize) -> Vec<Individual> {
    let sorted = {
        let refs: Vec<&ObjectiveVector> = pool.iter().map(|ind| &ind.objectives).collect();
        sort_refs(&refs)
    };

    let mut slots: Vec<Option<Individual>> = pool
        .into_iter()
        .zip(sorted.ranks.iter())
        .map(|(mut ind, &rank)| {
            ind.rank = Some(rank);
            ind.crowding_distance = 0.0;
            Some(ind)
        })
        .collect();

    let mut next = Vec::with_capacity(target);
    for front in &sorted.fronts {
        if next.len() + front.len() <= target {
            next.extend(front.iter().filter_map(|&i| slots[i].take()));
            continue;
        }

        let objectives: Vec<&ObjectiveVector> = front
            .iter()
            .map(|&i| {
                &slots[i]
                    .as_ref()
                    .expect("each pool index belongs to exactly one front")
                    .objectives
            })
            .collect();
        let (mut order, distances) = crowding_sort(&objectives);
        order.sort_by(|&a, &b| distances[b].total_cmp(&distances[a]));

        let room = target - next.len();
        for &k in order.iter().take(room) {
            if let Some(mut ind) = slots[front[k]].take() {
                ind.crowding_distance = distances[k];
                next.push(ind);
            }
        }
        break;
    }

    next
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nsga::chromosome::Chromosome;

    fn vectors(values: &[&[f64]]) -> Vec<ObjectiveVector> {
        values.iter().map(|v| ObjectiveVector::new(v.to_vec())).collect()
    }

    fn pool(values: &[&[f64]]) -> Vec<Individual> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let mut ind = Individual::new(Chromosome::from_indices(32, [i]), v.len());
                ind.objectives = ObjectiveVector::new(v.to_vec());
                ind
            })
            .collect()
    }

    fn genes(pop: &[Individual]) -> Vec<usize> {
        pop.iter().map(|i| i.chromosome.to_sorted_indices()[0]).collect()
    }

    // ---- Dominance ----

    #[test]
    fn test_dominate_signs() {
        let v = vectors(&[&[2.0, 2.0], &[1.0, 2.0], &[3.0, 1.0], &[2.0, 2.0]]);
        assert_eq!(dominate(&v[0], &v[1]), 1);
        assert_eq!(dominate(&v[1], &v[0]), -1);
        assert_eq!(dominate(&v[0], &v[2]), 0);
        assert_eq!(dominate(&v[0], &v[3]), 0);
    }

    #[test]
    fn test_dominate_leading_ties() {
        // Running sign stays 0 through ties, then adopts the first difference
        let a = ObjectiveVector::new(vec![1.0, 1.0, 4.0, 2.0]);
        let b = ObjectiveVector::new(vec![1.0, 1.0, 3.0, 2.0]);
        assert_eq!(dominate(&a, &b), 1);
        assert_eq!(dominate(&b, &a), -1);
    }

    #[test]
    fn test_dominate_conflict_after_tie() {
        let a = ObjectiveVector::new(vec![1.0, 2.0, 0.0]);
        let b = ObjectiveVector::new(vec![1.0, 1.0, 5.0]);
        assert_eq!(dominate(&a, &b), 0);
    }

    #[test]
    fn test_dominate_nan_is_antisymmetric() {
        let a = ObjectiveVector::new(vec![f64::NAN, 1.0]);
        let b = ObjectiveVector::new(vec![1.0, 1.0]);
        assert_eq!(dominate(&a, &b), 0);
        assert_eq!(dominate(&b, &a), 0);

        let c = ObjectiveVector::new(vec![f64::NAN, 2.0]);
        assert_eq!(dominate(&c, &b), 1);
        assert_eq!(dominate(&b, &c), -1);
    }

    // ---- Non-dominated sort ----

    #[test]
    fn test_single_solution() {
        let result = non_dominated_sort(&vectors(&[&[1.0, 2.0]]));
        assert_eq!(result.ranks, vec![0]);
        assert_eq!(result.fronts, vec![vec![0]]);
    }

    #[test]
    fn test_empty_input() {
        let result = non_dominated_sort(&[]);
        assert!(result.ranks.is_empty());
        assert!(result.fronts.is_empty());
    }

    #[test]
    fn test_two_non_dominated() {
        let result = non_dominated_sort(&vectors(&[&[1.0, 3.0], &[3.0, 1.0]]));
        assert_eq!(result.ranks, vec![0, 0]);
        assert_eq!(result.fronts.len(), 1);
    }

    #[test]
    fn test_clear_dominance() {
        let result = non_dominated_sort(&vectors(&[&[1.0, 1.0], &[3.0, 3.0], &[2.0, 2.0]]));
        assert_eq!(result.ranks, vec![2, 0, 1]);
        assert_eq!(result.fronts, vec![vec![1], vec![2], vec![0]]);
    }

    #[test]
    fn test_mixed_fronts() {
        let result = non_dominated_sort(&vectors(&[
            &[5.0, 1.0], // front 0
            &[3.0, 3.0], // front 0
            &[1.0, 5.0], // front 0
            &[2.0, 2.0], // dominated by [1] → front 1
            &[0.0, 0.0], // dominated by [3] too → front 2
        ]));
        assert_eq!(result.ranks, vec![0, 0, 0, 1, 2]);
    }

    #[test]
    fn test_all_equal() {
        let result = non_dominated_sort(&vectors(&[&[2.0, 2.0], &[2.0, 2.0], &[2.0, 2.0]]));
        // Identical solutions don't dominate each other
        assert!(result.ranks.iter().all(|&r| r == 0));
    }

    #[test]
    fn test_three_objectives() {
        let result = non_dominated_sort(&vectors(&[
            &[1.0, 5.0, 3.0],
            &[3.0, 1.0, 5.0],
            &[5.0, 3.0, 1.0],
            &[4.0, 4.0, 4.0], // trades off against each of the above
            &[0.5, 0.5, 0.5], // dominated by all
        ]));
        assert_eq!(result.ranks, vec![0, 0, 0, 0, 1]);
    }

    // ---- Crowding distance ----

    #[test]
    fn test_crowding_extremes_get_nothing() {
        let v = vectors(&[&[5.0, 1.0], &[3.0, 3.0], &[1.0, 5.0]]);
        let refs: Vec<&ObjectiveVector> = v.iter().collect();
        let d = crowding_distance(&refs);
        assert_eq!(d, vec![0.0, 8.0, 0.0]);
    }

    #[test]
    fn test_crowding_small_fronts() {
        let v = vectors(&[&[1.0, 3.0], &[3.0, 1.0]]);
        let refs: Vec<&ObjectiveVector> = v.iter().collect();
        assert_eq!(crowding_distance(&refs), vec![0.0, 0.0]);
        assert!(crowding_distance(&[]).is_empty());
    }

    #[test]
    fn test_crowding_evenly_spaced() {
        let v = vectors(&[
            &[0.0, 4.0],
            &[1.0, 3.0],
            &[2.0, 2.0],
            &[3.0, 1.0],
            &[4.0, 0.0],
        ]);
        let refs: Vec<&ObjectiveVector> = v.iter().collect();
        let d = crowding_distance(&refs);
        assert_eq!(d[0], 0.0);
        assert_eq!(d[4], 0.0);
        assert!((d[1] - 4.0).abs() < 1e-12);
        assert!((d[2] - 4.0).abs() < 1e-12);
        assert!((d[3] - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_crowding_not_normalized() {
        let v = vectors(&[&[0.0], &[10.0], &[100.0]]);
        let refs: Vec<&ObjectiveVector> = v.iter().collect();
        assert_eq!(crowding_distance(&refs), vec![0.0, 100.0, 0.0]);
    }

    #[test]
    fn test_crowding_with_nan_does_not_panic() {
        let mut rows: Vec<ObjectiveVector> = Vec::new();
        for i in 0..60 {
            let x = if i % 3 == 0 { f64::NAN } else { (i * 7 % 11) as f64 };
            let y = if i % 5 == 0 { f64::NAN } else { (i * 3 % 13) as f64 };
            rows.push(ObjectiveVector::new(vec![x, y, i as f64]));
        }
        let refs: Vec<&ObjectiveVector> = rows.iter().collect();
        let d = crowding_distance(&refs);
        assert_eq!(d.len(), 60);

        let p: Vec<Individual> = rows
            .iter()
            .enumerate()
            .map(|(i, o)| {
                let mut ind = Individual::new(Chromosome::from_indices(64, [i]), 3);
                ind.objectives = o.clone();
                ind
            })
            .collect();
        assert_eq!(truncate(p, 17).len(), 17);
    }

    // ---- Truncation ----

    #[test]
    fn test_truncate_exact_fill_skips_crowding() {
        let p = pool(&[&[5.0, 1.0], &[3.0, 3.0], &[1.0, 5.0], &[2.0, 2.0], &[0.0, 0.0]]);
        let out = truncate(p, 4);
        assert_eq!(genes(&out), vec![0, 1, 2, 3]);
        assert_eq!(
            out.iter().map(|i| i.rank).collect::<Vec<_>>(),
            vec![Some(0), Some(0), Some(0), Some(1)]
        );
        assert!(out.iter().all(|i| i.crowding_distance == 0.0));
    }

    #[test]
    fn test_truncate_boundary_front_by_crowding() {
        let p = pool(&[&[5.0, 1.0], &[3.0, 3.0], &[1.0, 5.0], &[2.0, 2.0]]);
        let out = truncate(p, 2);
        // Interior member first; ties keep the order left by the last objective sort
        assert_eq!(genes(&out), vec![1, 2]);
        assert_eq!(out[0].crowding_distance, 8.0);
        assert_eq!(out[1].crowding_distance, 0.0);
    }

    #[test]
    fn test_truncate_second_front_boundary() {
        let p = pool(&[
            &[10.0, 10.0], // front 0
            &[6.0, 1.0],   // front 1
            &[4.0, 4.0],   // front 1
            &[3.0, 5.0],   // front 1
            &[1.0, 6.0],   // front 1
        ]);
        let out = truncate(p, 3);
        assert_eq!(out.len(), 3);
        assert_eq!(genes(&out)[0], 0);
        // [2] and [3] are interior in both objectives
        let mut kept = genes(&out)[1..].to_vec();
        kept.sort();
        assert_eq!(kept, vec![2, 3]);
    }

    #[test]
    fn test_truncate_small_pool_keeps_all() {
        let p = pool(&[&[1.0], &[2.0]]);
        let out = truncate(p, 4);
        assert_eq!(out.len(), 2);
        assert_eq!(genes(&out), vec![1, 0]);
    }
}
