//! Multi-objective feature-subset selection.
//!
//! Searches the space of attribute subsets with NSGA-II and returns the
//! Pareto front of subsets under several objectives at once (for example
//! accuracy against subset size):
//!
//! - **Search engine** ([`nsga`]): Bit-set chromosomes, proportional
//!   selection on linearly scaled fitness, one-point crossover, bit-flip
//!   mutation, and elitist truncation by non-dominated rank and crowding
//!   distance.
//! - **Evaluation cache**: Every distinct subset is scored once per run;
//!   cache misses of a generation can be scored in parallel.
//!
//! # Architecture
//!
//! The crate knows nothing about datasets or models. Scoring a subset is
//! delegated to an [`nsga::ObjectiveEvaluator`] supplied by the caller, so
//! the same engine drives wrapper selection with any learner.

pub mod error;
pub mod nsga;

pub use error::{Result, SearchError};
