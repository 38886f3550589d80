//! Bit-set genetic operators.
//!
//! Initialization, one-point crossover, per-gene mutation, empty-subset
//! repair, elitist pool assembly and duplicate elimination for
//! [`Chromosome`]-encoded gene subsets.
//!
//! # Operators
//!
//! - [`random_chromosome`]: random non-empty subset avoiding the excluded gene
//! - [`initial_pool`]: `2P` individuals, optionally seeded with a start subset
//! - [`one_point_crossover`]: each child absorbs the *other* parent's prefix
//! - [`bit_flip_mutation`]: independent per-gene flip
//! - [`breed_pair`]: selection + crossover + mutation + repair
//! - [`next_pool`]: elitism + offspring + previous generation
//! - [`deduplicate`] / [`fill_distinct`]: set semantics over chromosomes
//!
//! # References
//!
//! - Goldberg (1989), *Genetic Algorithms in Search, Optimization, and
//!   Machine Learning*, simple GA operators

use super::chromosome::Chromosome;
use super::config::NsgaConfig;
use super::objective::ObjectiveVector;
use super::selection::select;
use super::types::{GeneSpace, Individual};
use crate::error::Result;
use log::trace;
use rand::Rng;
use std::collections::BTreeMap;

/// Draws after which [`breed_pair`] gives up and returns the parents unchanged.
pub const MAX_REPAIR_ATTEMPTS: usize = 1000;

// ============================================================================
// Initialization
// ============================================================================

/// Draws one gene uniformly, redrawing the excluded gene.
pub fn random_selectable_gene<R: Rng>(space: &GeneSpace, rng: &mut R) -> usize {
    loop {
        let gene = rng.random_range(0..space.num_genes);
        if !space.is_excluded(gene) {
            return gene;
        }
    }
}

/// Creates a random non-empty chromosome.
///
/// The gene count is `k = |m - 1|` for a signed draw `m` in
/// `-(n-1)..=(n-1)` (a zero becomes one), so `k` spans `1..=n`. Then `k`
/// genes are drawn with replacement, so the subset can hold fewer than `k`
/// genes.
pub fn random_chromosome<R: Rng>(space: &GeneSpace, rng: &mut R) -> Chromosome {
    let span = space.num_genes as i64 - 1;
    let m = rng.random_range(-span..=span);
    let k = ((m - 1).unsigned_abs() as usize).max(1);
    let mut c = Chromosome::new(space.num_genes);
    for _ in 0..k {
        c.set(random_selectable_gene(space, rng));
    }
    c
}

/// Builds the generation-zero candidate pool of `2 * population_size`.
///
/// If the space carries a starting subset it becomes individual 0.
pub fn initial_pool<R: Rng>(
    space: &GeneSpace,
    objective_count: usize,
    population_size: usize,
    rng: &mut R,
) -> Result<Vec<Individual>> {
    let size = population_size * 2;
    let mut pool = Vec::with_capacity(size);
    if let Some(start) = space.starting_chromosome()? {
        pool.push(Individual::new(start, objective_count));
    }
    while pool.len() < size {
        pool.push(Individual::new(random_chromosome(space, rng), objective_count));
    }
    Ok(pool)
}

// ============================================================================
// Crossover and mutation
// ============================================================================

/// One-point crossover at `point`: `child_a` takes `parent_b`'s genes
/// `0..point`, `child_b` takes `parent_a`'s.
pub fn one_point_crossover(
    child_a: &mut Chromosome,
    child_b: &mut Chromosome,
    parent_a: &Chromosome,
    parent_b: &Chromosome,
    point: usize,
) {
    child_a.copy_prefix_from(parent_b, point);
    child_b.copy_prefix_from(parent_a, point);
}

/// Flips every non-excluded gene with probability `rate`.
///
/// One uniform draw is consumed per gene, including the excluded one.
pub fn bit_flip_mutation<R: Rng>(c: &mut Chromosome, space: &GeneSpace, rate: f64, rng: &mut R) {
    for gene in 0..space.num_genes {
        let r: f64 = rng.random();
        if r < rate && !space.is_excluded(gene) {
            c.flip(gene);
        }
    }
}

/// Produces two non-empty offspring from two proportionally selected parents.
///
/// Identical parent indices flip one random gene of the first child instead
/// of recombining. Otherwise one-point crossover fires with probability
/// `crossover_rate` (only with at least 3 genes), followed by bit-flip
/// mutation of both children. If either child ends up empty the whole draw
/// is repeated; after [`MAX_REPAIR_ATTEMPTS`] the last selected parents are
/// returned unchanged.
pub fn breed_pair<R: Rng>(
    population: &[Individual],
    sum_fitness: &ObjectiveVector,
    space: &GeneSpace,
    config: &NsgaConfig,
    rng: &mut R,
) -> (Individual, Individual) {
    let n = space.num_genes;
    let mut parents = (0, 0);

    for attempt in 0..MAX_REPAIR_ATTEMPTS {
        let p1 = select(population, sum_fitness, rng);
        let p2 = select(population, sum_fitness, rng);
        parents = (p1, p2);

        let mut a = population[p1].offspring();
        let mut b = population[p2].offspring();

        if p1 == p2 {
            let gene = random_selectable_gene(space, rng);
            a.chromosome.flip(gene);
        } else {
            let r: f64 = rng.random();
            if n >= 3 && r < config.crossover_rate {
                let point = rng.random_range(1..=n - 2);
                one_point_crossover(
                    &mut a.chromosome,
                    &mut b.chromosome,
                    &population[p1].chromosome,
                    &population[p2].chromosome,
                    point,
                );
            }
            bit_flip_mutation(&mut a.chromosome, space, config.mutation_rate, rng);
            bit_flip_mutation(&mut b.chromosome, space, config.mutation_rate, rng);
        }

        if !a.chromosome.is_empty() && !b.chromosome.is_empty() {
            return (a, b);
        }
        trace!("empty offspring from parents {p1} and {p2}, redrawing (attempt {attempt})");
    }

    (
        population[parents.0].offspring(),
        population[parents.1].offspring(),
    )
}

// ============================================================================
// Pool assembly
// ============================================================================

/// Index of the best individual by scaled fitness.
///
/// An individual replaces the incumbent if its fitness is greater in every
/// component, or equal in every component with fewer genes selected.
///
/// # Panics
/// Panics if `population` is empty.
pub fn best_by_fitness(population: &[Individual]) -> usize {
    assert!(!population.is_empty(), "population must not be empty");
    let objective_count = population[0].fitness.len();
    let mut best = 0;
    let mut best_fit = ObjectiveVector::filled(objective_count, f64::MIN);
    let mut best_count = 0;

    for (i, ind) in population.iter().enumerate() {
        if ind.fitness.dominates_all(&best_fit) {
            best = i;
            best_fit = ind.fitness.clone();
            best_count = ind.gene_count();
        } else if ind.fitness.equals_all(&best_fit) {
            let count = ind.gene_count();
            if count < best_count {
                best = i;
                best_fit = ind.fitness.clone();
                best_count = count;
            }
        }
    }
    best
}

/// Assembles the next combined pool from the ranked `population`.
///
/// Layout: two copies of the elite, offspring pairs up to
/// `population_size`, then the previous generation, `2 * population_size`
/// in total.
pub fn next_pool<R: Rng>(
    population: &[Individual],
    sum_fitness: &ObjectiveVector,
    space: &GeneSpace,
    config: &NsgaConfig,
    rng: &mut R,
) -> Vec<Individual> {
    let size = config.population_size;
    let mut pool = Vec::with_capacity(size * 2);

    let elite = &population[best_by_fitness(population)];
    pool.push(elite.offspring());
    pool.push(elite.offspring());

    while pool.len() < size {
        let (a, b) = breed_pair(population, sum_fitness, space, config, rng);
        pool.push(a);
        pool.push(b);
    }

    pool.extend(population.iter().map(Individual::offspring));
    pool
}

// ============================================================================
// Duplicate elimination
// ============================================================================

/// Keeps the first individual of every distinct chromosome.
///
/// The result is ordered by chromosome order.
pub fn deduplicate(pool: Vec<Individual>) -> Vec<Individual> {
    let mut distinct = BTreeMap::new();
    for ind in pool {
        distinct.entry(ind.chromosome.clone()).or_insert(ind);
    }
    distinct.into_values().collect()
}

/// Adds random individuals to a deduplicated `pool` until it holds `target`
/// distinct chromosomes.
///
/// The space must hold at least `target` distinct non-empty subsets
/// (checked by [`GeneSpace::validate`]).
pub fn fill_distinct<R: Rng>(
    pool: Vec<Individual>,
    space: &GeneSpace,
    objective_count: usize,
    target: usize,
    rng: &mut R,
) -> Vec<Individual> {
    if pool.len() >= target {
        return pool;
    }
    let mut distinct: BTreeMap<Chromosome, Individual> = pool
        .into_iter()
        .map(|ind| (ind.chromosome.clone(), ind))
        .collect();
    while distinct.len() < target {
        let c = random_chromosome(space, rng);
        distinct
            .entry(c.clone())
            .or_insert_with(|| Individual::new(c, objective_count));
    }
    distinct.into_values().collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn individual(num_genes: usize, genes: &[usize], fitness: &[f64]) -> Individual {
        let mut ind = Individual::new(
            Chromosome::from_indices(num_genes, genes.iter().copied()),
            fitness.len(),
        );
        ind.objectives = ObjectiveVector::new(fitness.to_vec());
        ind.fitness = ObjectiveVector::new(fitness.to_vec());
        ind
    }

    fn sum_of(pop: &[Individual]) -> ObjectiveVector {
        let mut sum = ObjectiveVector::zeros(pop[0].fitness.len());
        for ind in pop {
            sum.add_assign(&ind.fitness);
        }
        sum
    }

    // ---- Initialization ----

    #[test]
    fn test_random_chromosome_non_empty_and_avoids_excluded() {
        let space = GeneSpace::new(6).with_excluded_gene(5);
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..500 {
            let c = random_chromosome(&space, &mut rng);
            assert!(!c.is_empty());
            assert!(!c.get(5));
            assert!(c.count_set() < 6);
        }
    }

    #[test]
    fn test_initial_pool_size_and_seed() {
        let space = GeneSpace::new(8)
            .with_excluded_gene(7)
            .with_starting_genes([0, 2, 7]);
        let mut rng = StdRng::seed_from_u64(1);
        let pool = initial_pool(&space, 2, 10, &mut rng).unwrap();
        assert_eq!(pool.len(), 20);
        assert_eq!(pool[0].chromosome.to_sorted_indices(), vec![0, 2]);
        assert!(pool.iter().all(|i| !i.chromosome.is_empty()));
        assert!(pool.iter().all(|i| i.objectives.len() == 2));
    }

    // ---- Crossover / mutation ----

    #[test]
    fn test_one_point_crossover_swaps_prefixes() {
        let p1 = Chromosome::from_indices(6, [0, 1, 2]);
        let p2 = Chromosome::from_indices(6, [3, 4, 5]);
        let mut a = p1.clone();
        let mut b = p2.clone();
        one_point_crossover(&mut a, &mut b, &p1, &p2, 2);
        // a keeps its own suffix {2} and takes p2's empty prefix
        assert_eq!(a.to_sorted_indices(), vec![2]);
        // b keeps {3,4,5} and takes p1's prefix {0,1}
        assert_eq!(b.to_sorted_indices(), vec![0, 1, 3, 4, 5]);
    }

    #[test]
    fn test_mutation_rate_extremes() {
        let space = GeneSpace::new(5).with_excluded_gene(1);
        let mut rng = StdRng::seed_from_u64(5);

        let mut c = Chromosome::from_indices(5, [0, 2]);
        bit_flip_mutation(&mut c, &space, 0.0, &mut rng);
        assert_eq!(c.to_sorted_indices(), vec![0, 2]);

        bit_flip_mutation(&mut c, &space, 1.0, &mut rng);
        assert_eq!(c.to_sorted_indices(), vec![3, 4]);
    }

    #[test]
    fn test_breed_pair_never_empty() {
        let space = GeneSpace::new(4);
        let pop = vec![
            individual(4, &[0], &[1.0]),
            individual(4, &[1], &[1.0]),
            individual(4, &[2], &[1.0]),
            individual(4, &[3], &[1.0]),
        ];
        let sum = sum_of(&pop);
        let config = NsgaConfig::default()
            .with_crossover_rate(1.0)
            .with_mutation_rate(0.5);
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..500 {
            let (a, b) = breed_pair(&pop, &sum, &space, &config, &mut rng);
            assert!(!a.chromosome.is_empty());
            assert!(!b.chromosome.is_empty());
            assert_eq!(a.rank, None);
        }
    }

    #[test]
    fn test_breed_pair_without_operators_copies_parents() {
        let space = GeneSpace::new(6);
        let pop = vec![
            individual(6, &[0, 1], &[1.0]),
            individual(6, &[2, 3], &[1.0]),
            individual(6, &[4, 5], &[1.0]),
        ];
        let sum = sum_of(&pop);
        let config = NsgaConfig::default()
            .with_crossover_rate(0.0)
            .with_mutation_rate(0.0);
        let mut rng = StdRng::seed_from_u64(21);
        let parents: Vec<Vec<usize>> = pop.iter().map(|i| i.chromosome.to_sorted_indices()).collect();
        for _ in 0..200 {
            let (a, b) = breed_pair(&pop, &sum, &space, &config, &mut rng);
            let a = a.chromosome.to_sorted_indices();
            let b = b.chromosome.to_sorted_indices();
            // Either both are parent copies, or a is one flip away from a parent
            if parents.contains(&a) {
                assert!(parents.contains(&b));
            } else {
                assert!(parents.iter().any(|p| {
                    let diff = p.iter().filter(|g| !a.contains(g)).count()
                        + a.iter().filter(|g| !p.contains(g)).count();
                    diff == 1
                }));
            }
        }
    }

    #[test]
    fn test_breed_pair_gives_up_on_hopeless_repair() {
        // A single one-gene parent: identical selections always flip that gene off.
        let space = GeneSpace::new(1);
        let pop = vec![individual(1, &[0], &[1.0])];
        let sum = sum_of(&pop);
        let mut rng = StdRng::seed_from_u64(0);
        let (a, b) = breed_pair(&pop, &sum, &space, &NsgaConfig::default(), &mut rng);
        assert_eq!(a.chromosome.to_sorted_indices(), vec![0]);
        assert_eq!(b.chromosome.to_sorted_indices(), vec![0]);
    }

    // ---- Pool assembly ----

    #[test]
    fn test_best_by_fitness_prefers_fewer_genes_on_tie() {
        let pop = vec![
            individual(6, &[0, 1, 2], &[2.0, 2.0]),
            individual(6, &[3], &[2.0, 2.0]),
            individual(6, &[4], &[1.0, 3.0]),
        ];
        assert_eq!(best_by_fitness(&pop), 1);
    }

    #[test]
    fn test_best_by_fitness_requires_all_components() {
        let pop = vec![
            individual(6, &[0], &[1.0, 1.0]),
            individual(6, &[1], &[5.0, 1.0]), // not better in every component
            individual(6, &[2], &[2.0, 2.0]),
        ];
        assert_eq!(best_by_fitness(&pop), 2);
    }

    #[test]
    fn test_next_pool_layout() {
        let space = GeneSpace::new(6);
        let pop = vec![
            individual(6, &[0], &[1.0]),
            individual(6, &[1, 2], &[9.0]),
            individual(6, &[3], &[2.0]),
            individual(6, &[4, 5], &[3.0]),
        ];
        let sum = sum_of(&pop);
        let config = NsgaConfig::default().with_population_size(4);
        let mut rng = StdRng::seed_from_u64(4);
        let pool = next_pool(&pop, &sum, &space, &config, &mut rng);

        assert_eq!(pool.len(), 8);
        assert_eq!(pool[0].chromosome, pop[1].chromosome);
        assert_eq!(pool[1].chromosome, pop[1].chromosome);
        for (tail, prev) in pool[4..].iter().zip(pop.iter()) {
            assert_eq!(tail.chromosome, prev.chromosome);
        }
        assert!(pool.iter().all(|i| !i.chromosome.is_empty()));
    }

    // ---- Duplicate elimination ----

    #[test]
    fn test_deduplicate_keeps_first_and_orders() {
        let pool = vec![
            individual(6, &[2], &[1.0]),
            individual(6, &[0], &[2.0]),
            individual(6, &[2], &[3.0]),
        ];
        let out = deduplicate(pool);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].chromosome.to_sorted_indices(), vec![0]);
        assert_eq!(out[1].objectives[0], 1.0);
    }

    #[test]
    fn test_fill_distinct_reaches_target() {
        let space = GeneSpace::new(3);
        let pool = vec![individual(3, &[0], &[1.0])];
        let mut rng = StdRng::seed_from_u64(8);
        // 3 genes give exactly 7 non-empty subsets
        let out = fill_distinct(pool, &space, 1, 7, &mut rng);
        assert_eq!(out.len(), 7);
        assert!(out.iter().any(|i| i.chromosome.count_set() == 3));
        assert!(out.windows(2).all(|w| w[0].chromosome < w[1].chromosome));
    }
}
