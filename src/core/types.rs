//! Core type definitions for SVM training

use crate::core::{Result, SVMError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Multipliers at or below this value are treated as exactly zero
pub const MIN_SUPPORT_VECTOR_MULTIPLIER: f64 = 1e-7;

/// Prediction result containing label and decision value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    /// Predicted class label (+1 or -1)
    pub label: f64,
    /// Raw decision function value
    pub decision_value: f64,
}

impl Prediction {
    /// Create a prediction from a raw decision value.
    ///
    /// A decision value of exactly zero is classified as +1.
    pub fn from_decision_value(decision_value: f64) -> Self {
        let label = if decision_value >= 0.0 { 1.0 } else { -1.0 };
        Self {
            label,
            decision_value,
        }
    }

    /// Get confidence as absolute value of decision value
    pub fn confidence(&self) -> f64 {
        self.decision_value.abs()
    }
}

/// Dense feature vectors paired with binary labels
///
/// Construction validates the invariants every trainer relies on: at least
/// one sample, one label per feature vector, a common feature dimension and
/// labels drawn from {-1, +1}.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSet {
    features: Vec<Vec<f64>>,
    labels: Vec<f64>,
}

impl TrainingSet {
    /// Create a validated training set
    pub fn new(features: Vec<Vec<f64>>, labels: Vec<f64>) -> Result<Self> {
        if features.len() != labels.len() {
            return Err(SVMError::Configuration(format!(
                "{} feature vectors but {} labels",
                features.len(),
                labels.len()
            )));
        }
        if features.is_empty() {
            return Err(SVMError::Configuration(
                "training set must contain at least one sample".to_string(),
            ));
        }

        let dim = features[0].len();
        if let Some((i, row)) = features.iter().enumerate().find(|(_, r)| r.len() != dim) {
            return Err(SVMError::Configuration(format!(
                "sample {i} has {} features, expected {dim}",
                row.len()
            )));
        }
        if let Some(&bad) = labels.iter().find(|&&l| l != 1.0 && l != -1.0) {
            return Err(SVMError::Configuration(format!(
                "labels must be -1 or +1, got {bad}"
            )));
        }

        Ok(Self { features, labels })
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Always false for a validated set; provided for symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Feature dimension shared by every sample
    pub fn dim(&self) -> usize {
        self.features[0].len()
    }

    pub fn features(&self) -> &[Vec<f64>] {
        &self.features
    }

    pub fn labels(&self) -> &[f64] {
        &self.labels
    }

    /// Number of positively labelled samples
    pub fn positive_count(&self) -> usize {
        self.labels.iter().filter(|&&l| l > 0.0).count()
    }

    /// True when every label is identical
    pub fn is_single_class(&self) -> bool {
        let positives = self.positive_count();
        positives == 0 || positives == self.len()
    }

    /// Iterate over `(features, label)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&[f64], f64)> {
        self.features
            .iter()
            .map(Vec::as_slice)
            .zip(self.labels.iter().copied())
    }
}

/// Dual problem formulation used for training
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Formulation {
    /// Soft margin with L1 slack penalty: `0 <= alpha_i <= C`
    #[default]
    StandardSoftMargin,
    /// Soft margin with L2 slack penalty: `diag(1/(4C))` added to P, `alpha_i >= 0`
    L2SoftMargin,
    /// V-matrix formulation: `P = V + C * pinv(K)^T`, `0 <= alpha_i <= 1`
    ExtendedVMatrix,
}

impl Formulation {
    pub const ALL: [Formulation; 3] = [
        Formulation::StandardSoftMargin,
        Formulation::L2SoftMargin,
        Formulation::ExtendedVMatrix,
    ];

    /// Short name used on the command line and in saved models
    pub fn name(&self) -> &'static str {
        match self {
            Formulation::StandardSoftMargin => "l1",
            Formulation::L2SoftMargin => "l2",
            Formulation::ExtendedVMatrix => "vmatrix",
        }
    }

    /// Number of inequality rows the dual problem has for `n` samples
    pub fn inequality_rows(&self, n: usize) -> usize {
        match self {
            Formulation::StandardSoftMargin | Formulation::ExtendedVMatrix => 2 * n,
            Formulation::L2SoftMargin => n,
        }
    }
}

impl fmt::Display for Formulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Formulation {
    type Err = SVMError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "l1" | "standard" => Ok(Formulation::StandardSoftMargin),
            "l2" => Ok(Formulation::L2SoftMargin),
            "vmatrix" | "extended" => Ok(Formulation::ExtendedVMatrix),
            other => Err(SVMError::Configuration(format!(
                "unknown formulation: {other}"
            ))),
        }
    }
}

/// Configuration for the trainer
#[derive(Debug, Clone, PartialEq)]
pub struct TrainerConfig {
    /// Soft margin parameter (must be positive)
    pub c: f64,
    /// Which dual problem to solve
    pub formulation: Formulation,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            c: 1.0,
            formulation: Formulation::StandardSoftMargin,
        }
    }
}

impl TrainerConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.c > 0.0 && self.c.is_finite()) {
            return Err(SVMError::Configuration(format!(
                "C must be a positive finite number, got {}",
                self.c
            )));
        }
        Ok(())
    }
}

/// Configuration for the interior point QP solver
#[derive(Debug, Clone, PartialEq)]
pub struct SolverConfig {
    /// Maximum number of interior point iterations
    pub max_iterations: usize,
    /// Absolute duality gap tolerance
    pub abstol: f64,
    /// Relative duality gap tolerance
    pub reltol: f64,
    /// Primal and dual residual tolerance
    pub feastol: f64,
    /// Fraction of the distance to the boundary taken per step
    pub step_fraction: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            abstol: 1e-8,
            reltol: 1e-8,
            feastol: 1e-8,
            step_fraction: 0.99,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prediction_tie_break() {
        let pred = Prediction::from_decision_value(0.0);
        assert_eq!(pred.label, 1.0);
        assert_eq!(pred.confidence(), 0.0);

        let neg_pred = Prediction::from_decision_value(-1.8);
        assert_eq!(neg_pred.label, -1.0);
        assert_eq!(neg_pred.confidence(), 1.8);
    }

    #[test]
    fn test_training_set_creation() {
        let ts = TrainingSet::new(vec![vec![0.0, 1.0], vec![2.0, 3.0]], vec![1.0, -1.0])
            .expect("valid set");
        assert_eq!(ts.len(), 2);
        assert_eq!(ts.dim(), 2);
        assert_eq!(ts.positive_count(), 1);
        assert!(!ts.is_single_class());

        let pairs: Vec<_> = ts.iter().collect();
        assert_eq!(pairs[1], (&[2.0, 3.0][..], -1.0));
    }

    #[test]
    fn test_training_set_rejects_length_mismatch() {
        let result = TrainingSet::new(vec![vec![0.0]], vec![1.0, -1.0]);
        assert!(matches!(result, Err(SVMError::Configuration(_))));
    }

    #[test]
    fn test_training_set_rejects_empty() {
        let result = TrainingSet::new(Vec::new(), Vec::new());
        assert!(matches!(result, Err(SVMError::Configuration(_))));
    }

    #[test]
    fn test_training_set_rejects_ragged_rows() {
        let result = TrainingSet::new(vec![vec![0.0, 1.0], vec![2.0]], vec![1.0, -1.0]);
        assert!(matches!(result, Err(SVMError::Configuration(_))));
    }

    #[test]
    fn test_training_set_rejects_non_binary_labels() {
        let result = TrainingSet::new(vec![vec![0.0], vec![1.0]], vec![1.0, 0.0]);
        assert!(matches!(result, Err(SVMError::Configuration(_))));
    }

    #[test]
    fn test_single_class_detection() {
        let ts = TrainingSet::new(vec![vec![0.0], vec![1.0]], vec![-1.0, -1.0]).unwrap();
        assert!(ts.is_single_class());
        assert_eq!(ts.positive_count(), 0);
    }

    #[test]
    fn test_formulation_parsing() {
        for formulation in Formulation::ALL {
            let parsed: Formulation = formulation.to_string().parse().unwrap();
            assert_eq!(parsed, formulation);
        }
        assert!("l3".parse::<Formulation>().is_err());
        assert_eq!(Formulation::default(), Formulation::StandardSoftMargin);
    }

    #[test]
    fn test_inequality_rows() {
        assert_eq!(Formulation::StandardSoftMargin.inequality_rows(5), 10);
        assert_eq!(Formulation::L2SoftMargin.inequality_rows(5), 5);
        assert_eq!(Formulation::ExtendedVMatrix.inequality_rows(5), 10);
    }

    #[test]
    fn test_trainer_config_validation() {
        assert!(TrainerConfig::default().validate().is_ok());

        let config = TrainerConfig {
            c: 0.0,
            ..TrainerConfig::default()
        };
        assert!(matches!(config.validate(), Err(SVMError::Configuration(_))));

        let config = TrainerConfig {
            c: f64::NAN,
            ..TrainerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_solver_config_default() {
        let config = SolverConfig::default();
        assert_eq!(config.max_iterations, 100);
        assert_eq!(config.feastol, 1e-8);
        assert_eq!(config.step_fraction, 0.99);
    }
}
