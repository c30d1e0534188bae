//! Gram (kernel) matrix construction
//!
//! Building the Gram matrix costs O(n²) kernel evaluations and dominates
//! training time for large training sets. Only the upper triangle is
//! evaluated; the lower triangle is mirrored from it, so the kernel is
//! assumed symmetric.

use crate::kernel::Kernel;
use log::debug;
use nalgebra::DMatrix;

/// Compute `K[i][j] = kernel(x_i, x_j)` for every pair of training points
pub fn gram_matrix<K: Kernel + ?Sized>(kernel: &K, features: &[Vec<f64>]) -> DMatrix<f64> {
    let n = features.len();
    debug!("Computing {n}x{n} Gram matrix");

    let mut gram = DMatrix::zeros(n, n);
    for i in 0..n {
        for j in i..n {
            let value = kernel.compute(&features[i], &features[j]);
            gram[(i, j)] = value;
            gram[(j, i)] = value;
        }
    }
    gram
}
