//! Error types for the search engine.
//!
//! Every configuration problem is reported before the first evaluator call.
//! The only errors that can surface mid-run come from the evaluator (a
//! failure, a wrong-length vector or a non-finite value), and each aborts
//! the whole search.

use std::error::Error as StdError;

/// Errors produced while configuring or running a search.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The algorithm parameters are invalid.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The gene space (gene count, excluded gene, starting subset) is invalid.
    #[error("invalid gene space: {0}")]
    InvalidGeneSpace(String),

    /// The evaluator reports zero objectives.
    #[error("evaluator must report at least one objective")]
    NoObjectives,

    /// The evaluator returned a vector of the wrong length.
    #[error("evaluator returned {actual} objectives for genes {genes:?}, expected {expected}")]
    ObjectiveCount {
        expected: usize,
        actual: usize,
        genes: Vec<usize>,
    },

    /// The evaluator returned an infinite or NaN objective value.
    #[error("evaluator returned non-finite objectives {values:?} for genes {genes:?}")]
    NonFiniteObjective { values: Vec<f64>, genes: Vec<usize> },

    /// The evaluator failed on a chromosome.
    #[error("evaluation failed for genes {genes:?}: {source}")]
    Evaluation {
        genes: Vec<usize>,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
}

impl SearchError {
    /// Returns the gene subset that triggered an evaluation error, if any.
    pub fn genes(&self) -> Option<&[usize]> {
        match self {
            SearchError::ObjectiveCount { genes, .. }
            | SearchError::NonFiniteObjective { genes, .. }
            | SearchError::Evaluation { genes, .. } => Some(genes),
            _ => None,
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, SearchError>;
