//! Serializable kernel selection
//!
//! Arbitrary closures cannot be written to disk, so saved models and the
//! CLI describe their kernel with [`KernelType`], which dispatches to the
//! concrete kernels of this module.

use crate::core::{Result, SVMError};
use crate::kernel::rbf::squared_euclidean_distance;
use crate::kernel::{Kernel, LinearKernel, PolynomialKernel, RBFKernel};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A concrete kernel together with its hyperparameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum KernelType {
    Linear,
    Polynomial { degree: u32, gamma: f64, coef0: f64 },
    Rbf { gamma: f64 },
}

impl Kernel for KernelType {
    fn compute(&self, x: &[f64], y: &[f64]) -> f64 {
        match *self {
            KernelType::Linear => LinearKernel.compute(x, y),
            KernelType::Polynomial {
                degree,
                gamma,
                coef0,
            } => PolynomialKernel {
                gamma,
                coef0,
                degree,
            }
            .compute(x, y),
            KernelType::Rbf { gamma } => (-gamma * squared_euclidean_distance(x, y)).exp(),
        }
    }
}

impl KernelType {
    /// Reject hyperparameters the concrete kernels would refuse
    pub fn validate(&self) -> Result<()> {
        match *self {
            KernelType::Linear => Ok(()),
            KernelType::Polynomial { gamma, coef0, .. } => {
                if gamma.is_finite() && coef0.is_finite() {
                    Ok(())
                } else {
                    Err(SVMError::Configuration(format!(
                        "polynomial kernel needs finite gamma and coef0, got {gamma} and {coef0}"
                    )))
                }
            }
            KernelType::Rbf { gamma } => {
                if gamma > 0.0 && gamma.is_finite() {
                    Ok(())
                } else {
                    Err(SVMError::Configuration(format!(
                        "Gamma must be positive, got {gamma}"
                    )))
                }
            }
        }
    }
}

impl From<LinearKernel> for KernelType {
    fn from(_: LinearKernel) -> Self {
        KernelType::Linear
    }
}

impl From<PolynomialKernel> for KernelType {
    fn from(k: PolynomialKernel) -> Self {
        KernelType::Polynomial {
            degree: k.degree,
            gamma: k.gamma,
            coef0: k.coef0,
        }
    }
}

impl From<RBFKernel> for KernelType {
    fn from(k: RBFKernel) -> Self {
        KernelType::Rbf { gamma: k.gamma() }
    }
}

impl fmt::Display for KernelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KernelType::Linear => write!(f, "linear"),
            KernelType::Polynomial {
                degree,
                gamma,
                coef0,
            } => write!(f, "polynomial(degree={degree}, gamma={gamma}, coef0={coef0})"),
            KernelType::Rbf { gamma } => write!(f, "rbf(gamma={gamma})"),
        }
    }
}
