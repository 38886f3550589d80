//! Search configuration.
//!
//! [`NsgaConfig`] holds all parameters that control the generational loop.

use crate::error::{Result, SearchError};

/// Configuration for the NSGA-II feature-subset search.
///
/// # Defaults
///
/// ```
/// use u_featsel::nsga::NsgaConfig;
///
/// let config = NsgaConfig::default();
/// assert_eq!(config.population_size, 20);
/// assert_eq!(config.generations, 20);
/// assert_eq!(config.seed, 1);
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_featsel::nsga::NsgaConfig;
///
/// let config = NsgaConfig::default()
///     .with_population_size(80)
///     .with_generations(30)
///     .with_crossover_rate(0.6)
///     .with_mutation_rate(0.033)
///     .with_seed(7);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NsgaConfig {
    /// Target population size `P`. Must be even and positive.
    ///
    /// Each generation builds a combined pool of up to `2P` candidates
    /// before truncating back to `P`.
    pub population_size: usize,

    /// Number of generations after generation zero.
    ///
    /// The loop always runs exactly this many generations; there is no
    /// convergence-based stop.
    pub generations: usize,

    /// Probability of one-point crossover for a pair of distinct parents (0.0–1.0).
    pub crossover_rate: f64,

    /// Per-gene bit-flip probability applied to every offspring (0.0–1.0).
    pub mutation_rate: f64,

    /// Random seed. Identical seeds give identical fronts.
    pub seed: u64,

    /// Whether to evaluate cache misses in parallel using rayon.
    ///
    /// Has no effect unless the `parallel` feature is enabled.
    pub parallel: bool,
}

impl Default for NsgaConfig {
    fn default() -> Self {
        Self {
            population_size: 20,
            generations: 20,
            crossover_rate: 0.6,
            mutation_rate: 0.033,
            seed: 1,
            parallel: true,
        }
    }
}

impl NsgaConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the number of generations.
    pub fn with_generations(mut self, n: usize) -> Self {
        self.generations = n;
        self
    }

    /// Sets the crossover rate.
    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the per-gene mutation rate.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Sets the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Enables or disables parallel evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Validates the configuration.
    ///
    /// Returns [`SearchError::InvalidConfig`] describing the first problem.
    pub fn validate(&self) -> Result<()> {
        if self.population_size == 0 {
            return Err(SearchError::InvalidConfig(
                "population_size must be at least 2".into(),
            ));
        }
        if self.population_size % 2 != 0 {
            return Err(SearchError::InvalidConfig(format!(
                "population_size must be even, got {}",
                self.population_size
            )));
        }
        if !(0.0..=1.0).contains(&self.crossover_rate) {
            return Err(SearchError::InvalidConfig(format!(
                "crossover_rate must be within [0, 1], got {}",
                self.crossover_rate
            )));
        }
        if !(0.0..=1.0).contains(&self.mutation_rate) {
            return Err(SearchError::InvalidConfig(format!(
                "mutation_rate must be within [0, 1], got {}",
                self.mutation_rate
            )));
        }
        Ok(())
    }
}
