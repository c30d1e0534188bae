//! Support Vector Machine training through the dual quadratic program
//!
//! Three dual formulations are supported: the classic soft margin with an
//! L1 slack penalty, the soft margin with an L2 slack penalty, and a
//! V-matrix formulation that weights sample interactions by a data-dependent
//! matrix. Each is assembled into a standard-form QP, solved by an interior
//! point method, and turned into a kernel expansion [`Predictor`].
//!
//! ```rust
//! use dualsvm::{Formulation, SVMModel, SVMTrainer, TrainerConfig, TrainingSet};
//! use dualsvm::kernel::LinearKernel;
//!
//! let data = TrainingSet::new(
//!     vec![vec![0.0, 0.0], vec![0.0, 1.0], vec![1.0, 0.0], vec![1.0, 1.0]],
//!     vec![-1.0, -1.0, 1.0, 1.0],
//! )?;
//! let config = TrainerConfig { c: 1.0, formulation: Formulation::StandardSoftMargin };
//! let predictor = SVMTrainer::new(LinearKernel::new(), config).train(&data)?;
//!
//! assert_eq!(predictor.predict(&[2.0, 0.0]).label, 1.0);
//! # Ok::<(), dualsvm::SVMError>(())
//! ```

pub mod api;
pub mod core;
pub mod data;
pub mod dual;
pub mod kernel;
pub mod persistence;
pub mod predictor;
pub mod solver;
pub mod trainer;

// Re-export main types for convenience
pub use crate::api::{EvaluationMetrics, ModelInfo, TrainedModel, SVM};
pub use crate::core::error::{Result, SVMError};
pub use crate::core::traits::*;
pub use crate::core::types::*;
pub use crate::data::{CSVDataset, LibSVMDataset};
pub use crate::dual::{DualProblem, UniformVMatrix, VMatrix, VMatrixGenerator};
pub use crate::kernel::{Kernel, KernelType, LinearKernel, PolynomialKernel, RBFKernel};
pub use crate::predictor::Predictor;
pub use crate::solver::{InteriorPointSolver, QpSolution, QpSolver, SolverError};
pub use crate::trainer::{construct_predictor, LogObserver, PredictorObserver, SVMTrainer};

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
