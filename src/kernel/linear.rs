//! Linear kernel and the dense dot product shared by the other kernels

use crate::kernel::Kernel;

/// `K(x, y) = <x, y>`
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearKernel;

impl LinearKernel {
    pub fn new() -> Self {
        Self
    }
}

impl Kernel for LinearKernel {
    fn compute(&self, x: &[f64], y: &[f64]) -> f64 {
        dot_product(x, y)
    }
}

/// Dot product of two dense vectors
///
/// Extra trailing components of the longer vector are ignored.
pub(crate) fn dot_product(x: &[f64], y: &[f64]) -> f64 {
    x.iter().zip(y).map(|(a, b)| a * b).sum()
}
