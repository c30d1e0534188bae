//! Quadratic program solvers
//!
//! Training hands the assembled [`DualProblem`](crate::dual::DualProblem) to
//! a [`QpSolver`] and keeps only the optimal primal point. The default
//! implementation is a primal-dual interior point method.

pub mod interior_point;

pub use self::interior_point::*;

use crate::dual::DualProblem;
use nalgebra::DVector;
use thiserror::Error;

/// Failure reported by a QP solver
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolverError {
    #[error("invalid problem: {0}")]
    InvalidProblem(String),

    #[error(
        "no convergence after {iterations} iterations \
         (gap {gap:.3e}, primal residual {primal_residual:.3e}, dual residual {dual_residual:.3e})"
    )]
    MaxIterations {
        iterations: usize,
        gap: f64,
        primal_residual: f64,
        dual_residual: f64,
    },

    #[error("KKT system is singular at iteration {0}")]
    SingularSystem(usize),

    #[error("iterates became non-finite at iteration {0}")]
    NonFinite(usize),
}

/// Optimal point returned by a solver
#[derive(Debug, Clone, PartialEq)]
pub struct QpSolution {
    /// Primal solution, one entry per variable
    pub x: DVector<f64>,
    /// Objective value `(1/2) x^T P x + q^T x`
    pub objective: f64,
    /// Number of iterations performed
    pub iterations: usize,
}

/// Convex QP solver in standard form
///
/// Implementations must return the primal optimum or fail; they never return
/// a point they did not certify as optimal.
pub trait QpSolver: Send + Sync {
    fn solve(&self, problem: &DualProblem) -> Result<QpSolution, SolverError>;
}
