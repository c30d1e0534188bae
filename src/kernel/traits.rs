//! Kernel trait definition

/// Kernel function trait
///
/// A kernel maps two feature vectors to a real scalar. Classical kernels are
/// symmetric, `K(x, y) == K(y, x)`, but this is not enforced. Any closure
/// `Fn(&[f64], &[f64]) -> f64` is a kernel, which makes deterministic stubs
/// easy to inject in tests.
pub trait Kernel: Send + Sync {
    /// Compute kernel value K(x, y)
    fn compute(&self, x: &[f64], y: &[f64]) -> f64;
}

impl<F> Kernel for F
where
    F: Fn(&[f64], &[f64]) -> f64 + Send + Sync,
{
    fn compute(&self, x: &[f64], y: &[f64]) -> f64 {
        self(x, y)
    }
}
