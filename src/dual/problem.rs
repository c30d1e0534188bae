//! Dual quadratic program assembly
//!
//! Every formulation produces a [`DualProblem`] in the standard form
//!
//! ```text
//! minimize    (1/2) x^T P x + q^T x
//! subject to  G x <= h
//!             A x  = b
//! ```
//!
//! where `x` is the vector of Lagrange multipliers, one per training sample.

use crate::core::{Formulation, Result, SVMError, TrainingSet};
use crate::dual::vmatrix::{VMatrix, VMatrixGenerator};
use log::debug;
use nalgebra::{DMatrix, DVector};

/// Singular values below this fraction of the largest Gram entry are
/// dropped when pseudo-inverting the Gram matrix.
const PINV_RELATIVE_TOLERANCE: f64 = 1e-10;

/// Coefficients of a convex QP in standard form
#[derive(Debug, Clone, PartialEq)]
pub struct DualProblem {
    pub p: DMatrix<f64>,
    pub q: DVector<f64>,
    pub g: DMatrix<f64>,
    pub h: DVector<f64>,
    pub a: DMatrix<f64>,
    pub b: DVector<f64>,
}

impl DualProblem {
    /// Number of optimization variables
    pub fn n_variables(&self) -> usize {
        self.q.len()
    }

    /// Panics unless the coefficient shapes match `formulation` for `n` variables.
    pub fn assert_shape(&self, formulation: Formulation, n: usize) {
        let rows = formulation.inequality_rows(n);
        assert_eq!(self.p.shape(), (n, n), "P must be {n}x{n}");
        assert_eq!(self.q.len(), n, "q must have {n} entries");
        assert_eq!(
            self.g.shape(),
            (rows, n),
            "G must be {rows}x{n} for the {formulation} formulation"
        );
        assert_eq!(self.h.len(), rows, "h must have {rows} entries");
        assert_eq!(self.a.shape(), (1, n), "A must be a single row");
        assert_eq!(self.b.len(), 1, "b must have one entry");
    }
}

/// Assemble the dual problem for `formulation`
///
/// The V-matrix generator is only consulted by the extended formulation.
pub fn build_dual_problem<V: VMatrixGenerator + ?Sized>(
    formulation: Formulation,
    training_set: &TrainingSet,
    gram: &DMatrix<f64>,
    c: f64,
    generator: &V,
) -> Result<DualProblem> {
    let labels = DVector::from_column_slice(training_set.labels());
    let problem = match formulation {
        Formulation::StandardSoftMargin => standard_soft_margin(gram, &labels, c),
        Formulation::L2SoftMargin => l2_soft_margin(gram, &labels, c),
        Formulation::ExtendedVMatrix => {
            let positives = training_set.positive_count();
            if positives == 0 || positives == training_set.len() {
                return Err(SVMError::Configuration(
                    "the V-matrix formulation needs both positive and negative labels".to_string(),
                ));
            }
            let vmatrix = generator.calculate(training_set.features(), training_set.labels())?;
            debug!("V-matrix theta: {}", vmatrix.theta);
            extended_vmatrix(gram, &labels, c, &vmatrix, positives)?
        }
    };

    debug!(
        "Built {formulation} dual problem: P {:?}, G {:?}",
        problem.p.shape(),
        problem.g.shape()
    );
    Ok(problem)
}

/// Soft margin with L1 slack penalty
///
/// `P = (y y^T) ⊙ K`, `q = -1`, `0 <= alpha_i <= C`, `y^T alpha = 0`.
pub fn standard_soft_margin(gram: &DMatrix<f64>, labels: &DVector<f64>, c: f64) -> DualProblem {
    let n = labels.len();
    let (g, h) = box_constraints(n, c);
    DualProblem {
        p: label_weighted_gram(gram, labels),
        q: DVector::from_element(n, -1.0),
        g,
        h,
        a: labels_row(labels),
        b: DVector::zeros(1),
    }
}

/// Soft margin with L2 slack penalty
///
/// The quadratic penalty shows up as `diag(1/(4C))` in `P` and removes the
/// upper bound on the multipliers, leaving only `alpha_i >= 0`.
pub fn l2_soft_margin(gram: &DMatrix<f64>, labels: &DVector<f64>, c: f64) -> DualProblem {
    let n = labels.len();
    let mut p = label_weighted_gram(gram, labels);
    for i in 0..n {
        p[(i, i)] += 1.0 / (4.0 * c);
    }
    DualProblem {
        p,
        q: DVector::from_element(n, -1.0),
        g: -DMatrix::identity(n, n),
        h: DVector::zeros(n),
        a: labels_row(labels),
        b: DVector::zeros(1),
    }
}

/// V-matrix formulation
///
/// With `V'` the transpose of the generator output:
/// `P = V' + C * pinv(K)^T`, `q = -(y^T V')^T`, `0 <= alpha_i <= 1` and
/// `sum(alpha) = positives`. The unit upper bound does not depend on `C`.
///
/// `q` is the full product `-V'^T y` rather than a product with the last
/// column of `V`: `q` needs one entry per sample, and `y^T V[:, n-1]` is a
/// single scalar.
pub fn extended_vmatrix(
    gram: &DMatrix<f64>,
    labels: &DVector<f64>,
    c: f64,
    vmatrix: &VMatrix,
    positives: usize,
) -> Result<DualProblem> {
    let n = labels.len();
    if vmatrix.v.shape() != (n, n) {
        return Err(SVMError::Configuration(format!(
            "V-matrix must be {n}x{n}, got {:?}",
            vmatrix.v.shape()
        )));
    }

    let tolerance = PINV_RELATIVE_TOLERANCE * gram.amax().max(1.0);
    let gram_pinv = gram
        .clone()
        .pseudo_inverse(tolerance)
        .map_err(|e| SVMError::Configuration(format!("cannot pseudo-invert Gram matrix: {e}")))?;

    let v = vmatrix.v.transpose();
    let q = -(labels.transpose() * &v).transpose();
    let p = v + gram_pinv.transpose() * c;
    let (g, h) = box_constraints(n, 1.0);

    Ok(DualProblem {
        p,
        q,
        g,
        h,
        a: DMatrix::from_element(1, n, 1.0),
        b: DVector::from_element(1, positives as f64),
    })
}

/// `(y y^T) ⊙ K`
fn label_weighted_gram(gram: &DMatrix<f64>, labels: &DVector<f64>) -> DMatrix<f64> {
    (labels * labels.transpose()).component_mul(gram)
}

/// Stacked `-alpha <= 0` and `alpha <= upper`
fn box_constraints(n: usize, upper: f64) -> (DMatrix<f64>, DVector<f64>) {
    let mut g = DMatrix::zeros(2 * n, n);
    let mut h = DVector::zeros(2 * n);
    for i in 0..n {
        g[(i, i)] = -1.0;
        g[(n + i, i)] = 1.0;
        h[n + i] = upper;
    }
    (g, h)
}

fn labels_row(labels: &DVector<f64>) -> DMatrix<f64> {
    DMatrix::from_row_slice(1, labels.len(), labels.as_slice())
}
