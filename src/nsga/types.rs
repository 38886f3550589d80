//! Core types shared by the search engine.
//!
//! [`GeneSpace`] and [`ObjectiveEvaluator`] form the contract between the
//! generic engine and the host that owns the data: the host says how many
//! genes exist (and which one is off limits), and supplies the objective
//! computation. [`Individual`] is the engine's own population member.

use super::chromosome::Chromosome;
use super::objective::ObjectiveVector;
use crate::error::{Result, SearchError};
use std::marker::PhantomData;

/// The set of candidate genes a search may select from.
///
/// # Examples
///
/// ```
/// use u_featsel::nsga::GeneSpace;
///
/// // 10 attributes, attribute 9 is the class and can never be selected,
/// // and the search starts from {0, 3}.
/// let space = GeneSpace::new(10)
///     .with_excluded_gene(9)
///     .with_starting_genes([0, 3]);
/// assert_eq!(space.selectable_genes(), 9);
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeneSpace {
    /// Total number of genes.
    pub num_genes: usize,

    /// A gene that must never be selected (e.g. the class attribute).
    pub excluded_gene: Option<usize>,

    /// Genes of the subset seeded into generation zero, if any.
    pub starting_genes: Option<Vec<usize>>,
}

impl GeneSpace {
    /// Creates a space of `num_genes` genes with no exclusion and no seed.
    pub fn new(num_genes: usize) -> Self {
        Self {
            num_genes,
            excluded_gene: None,
            starting_genes: None,
        }
    }

    pub fn with_excluded_gene(mut self, gene: usize) -> Self {
        self.excluded_gene = Some(gene);
        self
    }

    pub fn with_starting_genes<I: IntoIterator<Item = usize>>(mut self, genes: I) -> Self {
        self.starting_genes = Some(genes.into_iter().collect());
        self
    }

    /// `true` if `gene` is the excluded gene.
    pub fn is_excluded(&self, gene: usize) -> bool {
        self.excluded_gene == Some(gene)
    }

    /// Number of genes a chromosome may actually set.
    pub fn selectable_genes(&self) -> usize {
        self.num_genes - usize::from(self.excluded_gene.is_some())
    }

    /// Builds the starting chromosome, dropping the excluded gene.
    ///
    /// Returns `Ok(None)` if no starting subset was given.
    pub fn starting_chromosome(&self) -> Result<Option<Chromosome>> {
        let Some(genes) = &self.starting_genes else {
            return Ok(None);
        };
        let mut c = Chromosome::new(self.num_genes);
        for &g in genes {
            if g >= self.num_genes {
                return Err(SearchError::InvalidGeneSpace(format!(
                    "starting gene {g} out of range for {} genes",
                    self.num_genes
                )));
            }
            if !self.is_excluded(g) {
                c.set(g);
            }
        }
        if c.is_empty() {
            return Err(SearchError::InvalidGeneSpace(
                "starting subset is empty after removing the excluded gene".into(),
            ));
        }
        Ok(Some(c))
    }

    /// Validates the space against a target population size.
    ///
    /// The space must hold at least `population_size` distinct non-empty
    /// subsets, otherwise the population could never be filled.
    pub fn validate(&self, population_size: usize) -> Result<()> {
        if self.num_genes == 0 {
            return Err(SearchError::InvalidGeneSpace(
                "num_genes must be at least 1".into(),
            ));
        }
        if let Some(ex) = self.excluded_gene {
            if ex >= self.num_genes {
                return Err(SearchError::InvalidGeneSpace(format!(
                    "excluded gene {ex} out of range for {} genes",
                    self.num_genes
                )));
            }
        }
        let selectable = self.selectable_genes();
        if selectable == 0 {
            return Err(SearchError::InvalidGeneSpace(
                "no selectable gene left after exclusion".into(),
            ));
        }
        // 2^selectable - 1 non-empty subsets
        let subsets = u32::try_from(selectable)
            .ok()
            .and_then(|s| 1u128.checked_shl(s))
            .map_or(u128::MAX, |s| s - 1);
        if subsets < population_size as u128 {
            return Err(SearchError::InvalidGeneSpace(format!(
                "{selectable} selectable genes give only {subsets} distinct subsets, \
                 fewer than population_size {population_size}"
            )));
        }
        self.starting_chromosome()?;
        Ok(())
    }
}

/// Computes objective values for gene subsets.
///
/// Every objective is **maximized**. The vector returned by
/// [`evaluate`](ObjectiveEvaluator::evaluate) must always have
/// [`objective_count`](ObjectiveEvaluator::objective_count) components.
///
/// # Thread Safety
///
/// `ObjectiveEvaluator` must be `Send + Sync` because cache misses of one
/// generation may be evaluated in parallel using rayon.
pub trait ObjectiveEvaluator: Send + Sync {
    /// Error type of a failed evaluation.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Number of objectives, fixed for the whole run.
    fn objective_count(&self) -> usize;

    /// Human-readable objective names, used for logging and in results.
    fn objective_names(&self) -> Vec<String> {
        (0..self.objective_count())
            .map(|i| format!("objective_{i}"))
            .collect()
    }

    /// Evaluates one gene subset.
    ///
    /// Called at most once per distinct chromosome in a run.
    fn evaluate(&self, chromosome: &Chromosome) -> std::result::Result<ObjectiveVector, Self::Error>;
}

/// Adapts a closure into an [`ObjectiveEvaluator`].
///
/// ```
/// use std::convert::Infallible;
/// use u_featsel::nsga::{FnEvaluator, ObjectiveEvaluator, ObjectiveVector, Chromosome};
///
/// let size = FnEvaluator::new(1, |c: &Chromosome| {
///     Ok::<_, Infallible>(ObjectiveVector::new(vec![c.count_set() as f64]))
/// });
/// let v = size.evaluate(&Chromosome::from_indices(4, [0, 2])).unwrap();
/// assert_eq!(v[0], 2.0);
/// ```
pub struct FnEvaluator<F, E> {
    objective_count: usize,
    names: Option<Vec<String>>,
    f: F,
    _error: PhantomData<fn() -> E>,
}

impl<F, E> FnEvaluator<F, E>
where
    F: Fn(&Chromosome) -> std::result::Result<ObjectiveVector, E> + Send + Sync,
    E: std::error::Error + Send + Sync + 'static,
{
    pub fn new(objective_count: usize, f: F) -> Self {
        Self {
            objective_count,
            names: None,
            f,
            _error: PhantomData,
        }
    }

    /// Attaches objective names.
    pub fn with_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names = Some(names.into_iter().map(Into::into).collect());
        self
    }
}

impl<F, E> ObjectiveEvaluator for FnEvaluator<F, E>
where
    F: Fn(&Chromosome) -> std::result::Result<ObjectiveVector, E> + Send + Sync,
    E: std::error::Error + Send + Sync + 'static,
{
    type Error = E;

    fn objective_count(&self) -> usize {
        self.objective_count
    }

    fn objective_names(&self) -> Vec<String> {
        match &self.names {
            Some(names) => names.clone(),
            None => (0..self.objective_count)
                .map(|i| format!("objective_{i}"))
                .collect(),
        }
    }

    fn evaluate(&self, chromosome: &Chromosome) -> std::result::Result<ObjectiveVector, E> {
        (self.f)(chromosome)
    }
}

/// A population member.
///
/// Holds a chromosome, its raw objectives, its scaled selection fitness and
/// the ranking metadata assigned by non-dominated sorting.
#[derive(Debug, Clone)]
pub struct Individual {
    pub chromosome: Chromosome,

    /// Raw objective values from the evaluator.
    pub objectives: ObjectiveVector,

    /// Scaled fitness used by proportional selection.
    pub fitness: ObjectiveVector,

    /// Pareto rank (0 = non-dominated front). `None` until ranked.
    pub rank: Option<usize>,

    pub crowding_distance: f64,
}

impl Individual {
    /// Creates an unevaluated individual with zeroed objectives.
    pub fn new(chromosome: Chromosome, objective_count: usize) -> Self {
        Self {
            chromosome,
            objectives: ObjectiveVector::zeros(objective_count),
            fitness: ObjectiveVector::zeros(objective_count),
            rank: None,
            crowding_distance: 0.0,
        }
    }

    /// Copy for the next generation: keeps chromosome, objectives and
    /// fitness, resets rank and crowding distance.
    pub fn offspring(&self) -> Self {
        Self {
            chromosome: self.chromosome.clone(),
            objectives: self.objectives.clone(),
            fitness: self.fitness.clone(),
            rank: None,
            crowding_distance: 0.0,
        }
    }

    /// Number of genes selected.
    pub fn gene_count(&self) -> usize {
        self.chromosome.count_set()
    }
}
