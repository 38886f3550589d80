//! NSGA-II feature-subset search.
//!
//! A multi-objective genetic search over gene subsets. The host describes
//! the candidate genes with a [`GeneSpace`] and supplies the objective
//! computation through [`ObjectiveEvaluator`]; the engine returns the
//! non-dominated front of subsets it found.
//!
//! # Core Traits
//!
//! - [`ObjectiveEvaluator`]: Scores one gene subset on every objective (maximized)
//!
//! # Key Types
//!
//! - [`Chromosome`]: Bit-set gene subset with a total order
//! - [`ObjectiveVector`]: One value per objective, component-wise arithmetic
//! - [`NsgaConfig`]: Algorithm parameters (population size, rates, seed)
//! - [`NsgaRunner`]: Executes the generational loop
//! - [`NsgaResult`]: Final Pareto front with per-generation statistics
//!
//! # Submodules
//!
//! - [`multi_objective`]: Dominance, non-dominated sorting, crowding distance, truncation
//! - [`operators`]: Initialization, crossover, mutation and pool assembly
//! - [`scaling`]: Population statistics and linear fitness scaling
//!
//! # References
//!
//! - Goldberg (1989), *Genetic Algorithms in Search, Optimization, and Machine Learning*
//! - Deb et al. (2002), *A Fast and Elitist Multiobjective GA: NSGA-II*

mod cache;
mod chromosome;
mod config;
pub mod multi_objective;
mod objective;
pub mod operators;
mod runner;
pub mod scaling;
mod selection;
mod types;

pub use cache::EvaluationCache;
pub use chromosome::Chromosome;
pub use config::NsgaConfig;
pub use objective::ObjectiveVector;
pub use runner::{GenerationStats, NsgaResult, NsgaRunner, ParetoSolution};
pub use selection::select;
pub use types::{FnEvaluator, GeneSpace, Individual, ObjectiveEvaluator};
