//! Error types for SVM training and prediction

use crate::solver::SolverError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SVMError {
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error("QP solver failed: {0}")]
    Solver(#[from] SolverError),

    #[error("No Lagrange multiplier exceeds the support vector threshold")]
    EmptySupportSet,

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Empty dataset")]
    EmptyDataset,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, SVMError>;
