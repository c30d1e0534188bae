//! Polynomial kernel `K(x, y) = (gamma * <x, y> + coef0)^degree`

use crate::kernel::linear::dot_product;
use crate::kernel::traits::Kernel;

/// Polynomial kernel over dense feature vectors
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolynomialKernel {
    pub gamma: f64,
    pub coef0: f64,
    pub degree: u32,
}

impl PolynomialKernel {
    /// ```
    /// use dualsvm::kernel::{Kernel, PolynomialKernel};
    ///
    /// let kernel = PolynomialKernel::new(2, 1.0, 1.0);
    /// assert_eq!(kernel.compute(&[1.0, 0.0], &[2.0, 5.0]), 9.0);
    /// ```
    ///
    /// # Panics
    /// Panics if `degree` is zero or `gamma` is not positive
    pub fn new(degree: u32, gamma: f64, coef0: f64) -> Self {
        assert!(degree > 0, "Polynomial degree must be positive");
        assert!(gamma > 0.0, "Gamma must be positive");

        Self {
            gamma,
            coef0,
            degree,
        }
    }

    /// `(gamma * <x, y> + 1)^2`
    pub fn quadratic(gamma: f64) -> Self {
        Self::new(2, gamma, 1.0)
    }
}

impl Kernel for PolynomialKernel {
    fn compute(&self, x: &[f64], y: &[f64]) -> f64 {
        (self.gamma * dot_product(x, y) + self.coef0).powi(self.degree as i32)
    }
}
