//! Trained SVM predictor
//!
//! A [`Predictor`] is immutable once built. Its kernel, bias, weights,
//! support vectors and support vector labels are everything needed to
//! evaluate or reconstruct it.

use crate::core::{Dataset, Prediction, SVMModel};
use crate::kernel::Kernel;
use std::sync::Arc;

/// Kernel expansion `f(x) = bias + Σ w_i y_i K(sv_i, x)` over the support vectors
#[derive(Debug)]
pub struct Predictor<K: Kernel> {
    kernel: Arc<K>,
    bias: f64,
    weights: Vec<f64>,
    support_vectors: Vec<Vec<f64>>,
    support_vector_labels: Vec<f64>,
}

impl<K: Kernel> Clone for Predictor<K> {
    fn clone(&self) -> Self {
        Self {
            kernel: Arc::clone(&self.kernel),
            bias: self.bias,
            weights: self.weights.clone(),
            support_vectors: self.support_vectors.clone(),
            support_vector_labels: self.support_vector_labels.clone(),
        }
    }
}

/// Borrowed view of a predictor's parameters
#[derive(Debug, Clone, Copy)]
pub struct PredictorReport<'a> {
    pub bias: f64,
    pub weights: &'a [f64],
    pub support_vectors: &'a [Vec<f64>],
    pub support_vector_labels: &'a [f64],
}

impl<K: Kernel> Predictor<K> {
    /// Create a predictor from its parameters
    ///
    /// # Panics
    /// Panics if `weights`, `support_vectors` and `support_vector_labels`
    /// differ in length.
    pub fn new(
        kernel: Arc<K>,
        bias: f64,
        weights: Vec<f64>,
        support_vectors: Vec<Vec<f64>>,
        support_vector_labels: Vec<f64>,
    ) -> Self {
        assert_eq!(
            support_vectors.len(),
            support_vector_labels.len(),
            "support vectors and labels must have the same length"
        );
        assert_eq!(
            weights.len(),
            support_vector_labels.len(),
            "weights and labels must have the same length"
        );

        Self {
            kernel,
            bias,
            weights,
            support_vectors,
            support_vector_labels,
        }
    }

    /// Raw decision value `bias + Σ w_i y_i K(sv_i, x)`
    pub fn decision_function(&self, x: &[f64]) -> f64 {
        self.weights
            .iter()
            .zip(&self.support_vectors)
            .zip(&self.support_vector_labels)
            .fold(self.bias, |acc, ((w, sv), y)| {
                acc + w * y * self.kernel.compute(sv, x)
            })
    }

    /// Fraction of `features` whose predicted label equals the true label
    ///
    /// An empty evaluation set scores 0.
    ///
    /// # Panics
    /// Panics if `features` and `labels` differ in length.
    pub fn score(&self, features: &[Vec<f64>], labels: &[f64]) -> f64 {
        assert_eq!(
            features.len(),
            labels.len(),
            "features and labels must have the same length"
        );
        if labels.is_empty() {
            return 0.0;
        }

        let correct = features
            .iter()
            .zip(labels)
            .filter(|(x, &y)| self.predict(x).label == y)
            .count();
        correct as f64 / labels.len() as f64
    }

    /// Accuracy on any dataset
    pub fn score_dataset<D: Dataset + ?Sized>(&self, dataset: &D) -> f64 {
        if dataset.is_empty() {
            return 0.0;
        }
        let correct = (0..dataset.len())
            .filter(|&i| self.predict(dataset.features(i)).label == dataset.label(i))
            .count();
        correct as f64 / dataset.len() as f64
    }

    /// Feature dimension of the support vectors, if there are any
    pub fn dim(&self) -> Option<usize> {
        self.support_vectors.first().map(Vec::len)
    }

    pub fn kernel(&self) -> &K {
        &self.kernel
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn support_vectors(&self) -> &[Vec<f64>] {
        &self.support_vectors
    }

    pub fn support_vector_labels(&self) -> &[f64] {
        &self.support_vector_labels
    }

    pub fn report(&self) -> PredictorReport<'_> {
        PredictorReport {
            bias: self.bias,
            weights: &self.weights,
            support_vectors: &self.support_vectors,
            support_vector_labels: &self.support_vector_labels,
        }
    }
}

impl<K: Kernel> SVMModel for Predictor<K> {
    /// A decision value of exactly zero predicts +1
    fn predict(&self, x: &[f64]) -> Prediction {
        Prediction::from_decision_value(self.decision_function(x))
    }

    fn n_support_vectors(&self) -> usize {
        self.support_vectors.len()
    }

    fn bias(&self) -> f64 {
        self.bias
    }
}
