//! SVM training through the dual quadratic program
//!
//! [`SVMTrainer`] computes the Gram matrix, assembles the dual problem for
//! the configured [`Formulation`], hands it to a [`QpSolver`] and turns the
//! resulting multipliers into a [`Predictor`].

pub mod construct;
pub mod observer;

pub use self::construct::*;
pub use self::observer::*;

use crate::core::{Formulation, Result, SolverConfig, TrainerConfig, TrainingSet};
use crate::dual::{build_dual_problem, UniformVMatrix, VMatrixGenerator};
use crate::kernel::{gram_matrix, Kernel};
use crate::predictor::Predictor;
use crate::solver::{InteriorPointSolver, QpSolver, SolverError};
use log::{debug, info, warn};
use nalgebra::DVector;
use std::sync::Arc;

/// Trains predictors for a fixed kernel and configuration
///
/// The trainer holds no per-training state, so `train` can be called any
/// number of times and from several threads.
pub struct SVMTrainer<K: Kernel> {
    kernel: Arc<K>,
    config: TrainerConfig,
    solver: Box<dyn QpSolver>,
    vmatrix: Box<dyn VMatrixGenerator>,
    observer: Option<Box<dyn PredictorObserver>>,
}

impl<K: Kernel> SVMTrainer<K> {
    /// Create a trainer with the interior point solver, the uniform V-matrix
    /// and a [`LogObserver`]
    pub fn new(kernel: K, config: TrainerConfig) -> Self {
        Self {
            kernel: Arc::new(kernel),
            config,
            solver: Box::new(InteriorPointSolver::default()),
            vmatrix: Box::new(UniformVMatrix::new()),
            observer: Some(Box::new(LogObserver)),
        }
    }

    /// Create a trainer with default configuration
    pub fn with_kernel(kernel: K) -> Self {
        Self::new(kernel, TrainerConfig::default())
    }

    /// Replace the QP solver
    pub fn with_solver<S: QpSolver + 'static>(mut self, solver: S) -> Self {
        self.solver = Box::new(solver);
        self
    }

    /// Use the interior point solver with custom settings
    pub fn with_solver_config(self, config: SolverConfig) -> Self {
        self.with_solver(InteriorPointSolver::new(config))
    }

    /// Replace the V-matrix generator used by the extended formulation
    pub fn with_vmatrix_generator<V: VMatrixGenerator + 'static>(mut self, generator: V) -> Self {
        self.vmatrix = Box::new(generator);
        self
    }

    /// Replace the predictor observer
    pub fn with_observer<O: PredictorObserver + 'static>(mut self, observer: O) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Stop reporting constructed predictors
    pub fn without_observer(mut self) -> Self {
        self.observer = None;
        self
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    /// Train a predictor on `training_set`
    pub fn train(&self, training_set: &TrainingSet) -> Result<Predictor<K>> {
        self.config.validate()?;
        info!(
            "Training {} formulation on {} samples (dim {}, C = {})",
            self.config.formulation,
            training_set.len(),
            training_set.dim(),
            self.config.c
        );

        let multipliers = self.compute_multipliers(training_set)?;
        construct_predictor(
            Arc::clone(&self.kernel),
            training_set,
            multipliers.as_slice(),
            self.observer.as_deref(),
        )
    }

    /// Solve the dual problem and return one Lagrange multiplier per sample
    pub fn compute_multipliers(&self, training_set: &TrainingSet) -> Result<DVector<f64>> {
        self.config.validate()?;
        let n = training_set.len();
        let formulation = self.config.formulation;

        // With one class the equality constraint pins every multiplier to zero.
        if training_set.is_single_class() && formulation != Formulation::ExtendedVMatrix {
            warn!("All {n} labels are identical; skipping the QP solve");
            return Ok(DVector::zeros(n));
        }

        let gram = gram_matrix(self.kernel.as_ref(), training_set.features());
        let problem = build_dual_problem(
            formulation,
            training_set,
            &gram,
            self.config.c,
            self.vmatrix.as_ref(),
        )?;
        problem.assert_shape(formulation, n);

        let solution = self.solver.solve(&problem)?;
        if solution.x.len() != n {
            return Err(SolverError::InvalidProblem(format!(
                "solver returned {} multipliers for {n} samples",
                solution.x.len()
            ))
            .into());
        }
        debug!(
            "QP solved in {} iterations, objective {:.6}",
            solution.iterations, solution.objective
        );
        Ok(solution.x)
    }
}
