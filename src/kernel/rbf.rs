//! Gaussian kernel

use crate::kernel::Kernel;

/// `K(x, y) = exp(-gamma * ||x - y||^2)`
///
/// Larger gamma gives narrower bumps around each support vector. The Gram
/// matrix is positive definite for distinct points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RBFKernel {
    gamma: f64,
}

impl RBFKernel {
    /// # Panics
    /// Panics if gamma is not positive
    pub fn new(gamma: f64) -> Self {
        assert!(gamma > 0.0, "Gamma must be positive, got: {}", gamma);
        Self { gamma }
    }

    /// `gamma = 1 / n_features`, the CLI default
    pub fn with_auto_gamma(n_features: usize) -> Self {
        assert!(n_features > 0, "Number of features must be positive");
        Self::new(1.0 / n_features as f64)
    }

    pub fn gamma(&self) -> f64 {
        self.gamma
    }
}

impl Default for RBFKernel {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Kernel for RBFKernel {
    fn compute(&self, x: &[f64], y: &[f64]) -> f64 {
        (-self.gamma * squared_euclidean_distance(x, y)).exp()
    }
}

/// Squared Euclidean distance; missing trailing components count as zero
pub(crate) fn squared_euclidean_distance(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len().max(y.len());
    (0..n)
        .map(|i| {
            let diff = x.get(i).copied().unwrap_or(0.0) - y.get(i).copied().unwrap_or(0.0);
            diff * diff
        })
        .sum()
}
