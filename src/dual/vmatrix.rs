//! V-matrix generation for the extended formulation
//!
//! The extended formulation replaces the plain kernel quadratic form with a
//! V-matrix that measures how strongly pairs of training points interact
//! under a reference measure on the feature space. Generators are injected
//! through [`VMatrixGenerator`], so callers can substitute their own
//! construction.

use crate::core::{Result, SVMError};
use log::debug;
use nalgebra::DMatrix;

/// Output of a V-matrix generator
#[derive(Debug, Clone, PartialEq)]
pub struct VMatrix {
    /// n x n matrix, transposed by the problem builder before use
    pub v: DMatrix<f64>,
    /// Generator specific scalar reported alongside V
    pub theta: f64,
}

/// Capability that produces a V-matrix for a training set
pub trait VMatrixGenerator: Send + Sync {
    fn calculate(&self, features: &[Vec<f64>], labels: &[f64]) -> Result<VMatrix>;
}

/// V-matrix of the uniform measure over the bounding box of the training data
///
/// `V[i][j] = Π_k (u_k - max(x_ik, x_jk)) / (u_k - l_k)` where `l_k` and
/// `u_k` are the smallest and largest observed values of feature `k`.
/// Constant features contribute a factor of one and `theta` is the number of
/// features that contributed a factor.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformVMatrix;

impl UniformVMatrix {
    pub fn new() -> Self {
        Self
    }
}

impl VMatrixGenerator for UniformVMatrix {
    fn calculate(&self, features: &[Vec<f64>], labels: &[f64]) -> Result<VMatrix> {
        let n = features.len();
        if n != labels.len() {
            return Err(SVMError::Configuration(format!(
                "{n} feature vectors but {} labels",
                labels.len()
            )));
        }
        if n == 0 {
            return Err(SVMError::EmptyDataset);
        }

        let dim = features[0].len();
        let mut bounds = Vec::with_capacity(dim);
        for k in 0..dim {
            let (lo, hi) = features.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), x| {
                (lo.min(x[k]), hi.max(x[k]))
            });
            if hi > lo {
                bounds.push((k, hi, hi - lo));
            }
        }

        let mut v = DMatrix::from_element(n, n, 1.0);
        for i in 0..n {
            for j in i..n {
                let value: f64 = bounds
                    .iter()
                    .map(|&(k, upper, range)| (upper - features[i][k].max(features[j][k])) / range)
                    .product();
                v[(i, j)] = value;
                v[(j, i)] = value;
            }
        }

        debug!(
            "Uniform V-matrix: {n}x{n}, {} of {dim} features non-constant",
            bounds.len()
        );
        Ok(VMatrix {
            v,
            theta: bounds.len() as f64,
        })
    }
}
