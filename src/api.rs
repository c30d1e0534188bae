//! Builder facade over [`SVMTrainer`]
//!
//! [`SVM`] collects the kernel, C, formulation and solver settings, trains on
//! any [`Dataset`] and returns a [`TrainedModel`] that predicts and scores
//! files or in-memory data.
//!
//! ```rust,no_run
//! use dualsvm::api::SVM;
//! use dualsvm::core::Formulation;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let svm = SVM::new()
//!     .with_c(1.0)
//!     .with_formulation(Formulation::L2SoftMargin)
//!     .train_from_file("data.libsvm")?;
//!
//! let predictions = svm.predict_from_file("test.libsvm")?;
//! println!("Accuracy: {:.2}%", svm.evaluate_from_file("test.libsvm")? * 100.0);
//! # Ok(())
//! # }
//! ```

use crate::core::{
    Dataset, Formulation, Prediction, Result, SVMError, SVMModel, SolverConfig, TrainerConfig,
    TrainingSet,
};
use crate::data::{CSVDataset, LibSVMDataset};
use crate::kernel::{Kernel, LinearKernel};
use crate::predictor::Predictor;
use crate::trainer::SVMTrainer;
use std::path::Path;

/// High-level SVM interface with builder pattern
pub struct SVM<K: Kernel = LinearKernel> {
    kernel: K,
    config: TrainerConfig,
    solver: SolverConfig,
}

impl SVM<LinearKernel> {
    /// Create a new SVM with linear kernel and default parameters
    pub fn new() -> Self {
        Self::with_kernel(LinearKernel::new())
    }
}

impl Default for SVM<LinearKernel> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Kernel> SVM<K> {
    /// Create SVM with custom kernel
    pub fn with_kernel(kernel: K) -> Self {
        Self {
            kernel,
            config: TrainerConfig::default(),
            solver: SolverConfig::default(),
        }
    }

    /// Set regularization parameter C
    pub fn with_c(mut self, c: f64) -> Self {
        self.config.c = c;
        self
    }

    /// Select the dual formulation
    pub fn with_formulation(mut self, formulation: Formulation) -> Self {
        self.config.formulation = formulation;
        self
    }

    /// Replace the interior point solver settings
    pub fn with_solver_config(mut self, solver: SolverConfig) -> Self {
        self.solver = solver;
        self
    }

    /// Set maximum number of solver iterations
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.solver.max_iterations = max_iterations;
        self
    }

    /// Train on a dataset
    pub fn train<D: Dataset + ?Sized>(self, dataset: &D) -> Result<TrainedModel<K>> {
        let training_set = dataset.to_training_set()?;
        self.train_set(&training_set)
    }

    /// Train on an already validated training set
    pub fn train_set(self, training_set: &TrainingSet) -> Result<TrainedModel<K>> {
        let config = self.config.clone();
        let predictor = SVMTrainer::new(self.kernel, self.config)
            .with_solver_config(self.solver)
            .train(training_set)?;
        Ok(TrainedModel { predictor, config })
    }

    /// Train on the first `train_ratio` share of the rows and return the
    /// accuracy on the rest
    ///
    /// The split is sequential so repeated runs agree.
    pub fn validate_holdout<D: Dataset + ?Sized>(
        self,
        dataset: &D,
        train_ratio: f64,
    ) -> Result<f64> {
        if !(train_ratio > 0.0 && train_ratio < 1.0) {
            return Err(SVMError::Configuration(format!(
                "Train ratio must be between 0 and 1, got: {train_ratio}"
            )));
        }

        let n = dataset.len();
        let train_size = (n as f64 * train_ratio) as usize;
        let rows = |range: std::ops::Range<usize>| -> (Vec<Vec<f64>>, Vec<f64>) {
            range
                .map(|i| (dataset.features(i).to_vec(), dataset.label(i)))
                .unzip()
        };
        let (train_x, train_y) = rows(0..train_size);
        let (test_x, test_y) = rows(train_size..n);

        let model = self.train_set(&TrainingSet::new(train_x, train_y)?)?;
        Ok(model.inner().score(&test_x, &test_y))
    }

    /// Train from LibSVM format file
    pub fn train_from_file<P: AsRef<Path>>(self, path: P) -> Result<TrainedModel<K>> {
        let dataset = LibSVMDataset::from_file(path)?;
        self.train(&dataset)
    }

    /// Train from CSV file (automatically detects headers)
    pub fn train_from_csv<P: AsRef<Path>>(self, path: P) -> Result<TrainedModel<K>> {
        let dataset = CSVDataset::from_file(path)?;
        self.train(&dataset)
    }
}

/// Trained SVM model with high-level prediction interface
#[derive(Debug, Clone)]
pub struct TrainedModel<K: Kernel> {
    predictor: Predictor<K>,
    config: TrainerConfig,
}

impl<K: Kernel> TrainedModel<K> {
    /// Wrap a predictor together with the configuration that produced it
    pub fn from_predictor(predictor: Predictor<K>, config: TrainerConfig) -> Self {
        Self { predictor, config }
    }

    /// Predict a single feature vector
    pub fn predict(&self, x: &[f64]) -> Prediction {
        self.predictor.predict(x)
    }

    /// Predict multiple feature vectors
    pub fn predict_batch(&self, xs: &[Vec<f64>]) -> Vec<Prediction> {
        self.predictor.predict_batch(xs)
    }

    /// Predict every sample of a dataset
    ///
    /// Datasets with more features than the support vectors are rejected.
    pub fn predict_dataset<D: Dataset + ?Sized>(&self, dataset: &D) -> Result<Vec<Prediction>> {
        self.check_dimension(dataset)?;
        Ok((0..dataset.len())
            .map(|i| self.predictor.predict(dataset.features(i)))
            .collect())
    }

    /// Predict from LibSVM file
    pub fn predict_from_file<P: AsRef<Path>>(&self, path: P) -> Result<Vec<Prediction>> {
        let dataset = LibSVMDataset::from_file(path)?;
        self.predict_dataset(&dataset)
    }

    /// Predict from CSV file
    pub fn predict_from_csv<P: AsRef<Path>>(&self, path: P) -> Result<Vec<Prediction>> {
        let dataset = CSVDataset::from_file(path)?;
        self.predict_dataset(&dataset)
    }

    /// Accuracy on a dataset, 0 when it is empty
    pub fn evaluate<D: Dataset + ?Sized>(&self, dataset: &D) -> Result<f64> {
        self.check_dimension(dataset)?;
        Ok(self.predictor.score_dataset(dataset))
    }

    /// Evaluate accuracy from LibSVM file
    pub fn evaluate_from_file<P: AsRef<Path>>(&self, path: P) -> Result<f64> {
        let dataset = LibSVMDataset::from_file(path)?;
        self.evaluate(&dataset)
    }

    /// Evaluate accuracy from CSV file
    pub fn evaluate_from_csv<P: AsRef<Path>>(&self, path: P) -> Result<f64> {
        let dataset = CSVDataset::from_file(path)?;
        self.evaluate(&dataset)
    }

    /// Get detailed evaluation metrics
    pub fn evaluate_detailed<D: Dataset + ?Sized>(&self, dataset: &D) -> Result<EvaluationMetrics> {
        let predictions = self.predict_dataset(dataset)?;
        Ok(EvaluationMetrics::from_outcomes(
            predictions
                .iter()
                .zip(dataset.get_labels())
                .map(|(pred, actual)| (pred.label > 0.0, actual > 0.0)),
        ))
    }

    /// Get model information
    pub fn info(&self) -> ModelInfo {
        ModelInfo {
            n_support_vectors: self.predictor.n_support_vectors(),
            bias: self.predictor.bias(),
            formulation: self.config.formulation,
            c: self.config.c,
        }
    }

    /// Training configuration the model was built with
    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    /// Get the underlying predictor
    pub fn inner(&self) -> &Predictor<K> {
        &self.predictor
    }

    fn check_dimension<D: Dataset + ?Sized>(&self, dataset: &D) -> Result<()> {
        match self.predictor.dim() {
            Some(expected) if dataset.dim() > expected => Err(SVMError::DimensionMismatch {
                expected,
                actual: dataset.dim(),
            }),
            _ => Ok(()),
        }
    }
}

/// Confusion counts with the +1 class as positive
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvaluationMetrics {
    pub true_positives: usize,
    pub true_negatives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
}

impl EvaluationMetrics {
    /// Tally `(predicted_positive, actually_positive)` pairs
    fn from_outcomes(outcomes: impl IntoIterator<Item = (bool, bool)>) -> Self {
        outcomes
            .into_iter()
            .fold(Self::default(), |mut m, outcome| {
                match outcome {
                    (true, true) => m.true_positives += 1,
                    (false, false) => m.true_negatives += 1,
                    (true, false) => m.false_positives += 1,
                    (false, true) => m.false_negatives += 1,
                }
                m
            })
    }

    fn total(&self) -> usize {
        self.true_positives + self.true_negatives + self.false_positives + self.false_negatives
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.true_positives + self.true_negatives, self.total())
    }

    /// TP / (TP + FP)
    pub fn precision(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_positives)
    }

    /// TP / (TP + FN)
    pub fn recall(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_negatives)
    }

    /// Harmonic mean of precision and recall
    pub fn f1_score(&self) -> f64 {
        let p = self.precision();
        let r = self.recall();
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * (p * r) / (p + r)
        }
    }

    /// TN / (TN + FP)
    pub fn specificity(&self) -> f64 {
        ratio(self.true_negatives, self.true_negatives + self.false_positives)
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Model information
#[derive(Debug, Clone)]
pub struct ModelInfo {
    pub n_support_vectors: usize,
    pub bias: f64,
    pub formulation: Formulation,
    pub c: f64,
}

/// Convenience functions for quick operations
pub mod quick {
    use super::*;

    /// Train a linear SVM on LibSVM data with default parameters
    pub fn train_libsvm<P: AsRef<Path>>(path: P) -> Result<TrainedModel<LinearKernel>> {
        SVM::new().train_from_file(path)
    }

    /// Train a linear SVM on CSV data with default parameters
    pub fn train_csv<P: AsRef<Path>>(path: P) -> Result<TrainedModel<LinearKernel>> {
        SVM::new().train_from_csv(path)
    }

    /// Hold-out validation of a linear SVM on a sequential split
    pub fn simple_validation<D: Dataset + ?Sized>(
        dataset: &D,
        train_ratio: f64,
        c: f64,
    ) -> Result<f64> {
        SVM::new().with_c(c).validate_holdout(dataset, train_ratio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::RBFKernel;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn line_set() -> TrainingSet {
        TrainingSet::new(
            vec![vec![2.0], vec![-2.0], vec![1.5], vec![-1.5]],
            vec![1.0, -1.0, 1.0, -1.0],
        )
        .unwrap()
    }

    #[test]
    fn test_svm_builder_pattern() {
        let svm = SVM::new()
            .with_c(2.0)
            .with_formulation(Formulation::L2SoftMargin)
            .with_max_iterations(50);

        assert_eq!(svm.config.c, 2.0);
        assert_eq!(svm.config.formulation, Formulation::L2SoftMargin);
        assert_eq!(svm.solver.max_iterations, 50);
    }

    #[test]
    fn test_quick_training() {
        let model = SVM::new()
            .train(&line_set())
            .expect("Training should succeed");

        assert_eq!(model.predict(&[1.0]).label, 1.0);
        assert_eq!(model.predict(&[-0.5]).label, -1.0);

        let info = model.info();
        assert!(info.n_support_vectors > 0);
        assert_eq!(info.formulation, Formulation::StandardSoftMargin);
        assert_eq!(info.c, 1.0);
    }

    #[test]
    fn test_every_formulation_trains() {
        for formulation in Formulation::ALL {
            let model = SVM::with_kernel(RBFKernel::new(0.5))
                .with_formulation(formulation)
                .train(&line_set())
                .unwrap_or_else(|e| panic!("{formulation}: {e}"));
            assert!(model.info().n_support_vectors > 0, "{formulation}");
        }
    }

    #[test]
    fn test_dimension_mismatch() {
        let model = SVM::new().train(&line_set()).unwrap();
        let wide = TrainingSet::new(vec![vec![1.0, 2.0]], vec![1.0]).unwrap();

        assert!(matches!(
            model.evaluate(&wide),
            Err(SVMError::DimensionMismatch {
                expected: 1,
                actual: 2
            })
        ));
    }

    #[test]
    fn test_evaluation_metrics() {
        let outcomes = [((true, true), 10), ((false, false), 5), ((true, false), 2), ((false, true), 3)];
        let metrics = EvaluationMetrics::from_outcomes(
            outcomes
                .iter()
                .flat_map(|&(outcome, count)| std::iter::repeat(outcome).take(count)),
        );
        assert_eq!(metrics.false_negatives, 3);

        assert_eq!(metrics.accuracy(), 0.75); // (10+5)/(10+5+2+3)
        assert_eq!(metrics.precision(), 10.0 / 12.0); // 10/(10+2)
        assert_eq!(metrics.recall(), 10.0 / 13.0); // 10/(10+3)
        assert!(metrics.f1_score() > 0.0);
        assert_eq!(metrics.specificity(), 5.0 / 7.0); // 5/(5+2)
    }

    #[test]
    fn test_evaluate_detailed() {
        let model = SVM::new().train(&line_set()).unwrap();
        let metrics = model.evaluate_detailed(&line_set()).unwrap();

        assert_eq!(metrics.true_positives, 2);
        assert_eq!(metrics.true_negatives, 2);
        assert_eq!(metrics.accuracy(), 1.0);
    }

    #[test]
    fn test_file_operations() {
        let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
        writeln!(temp_file, "+1 1:2.0").expect("Failed to write");
        writeln!(temp_file, "-1 1:-2.0").expect("Failed to write");
        writeln!(temp_file, "+1 1:1.5").expect("Failed to write");
        writeln!(temp_file, "-1 1:-1.5").expect("Failed to write");
        temp_file.flush().expect("Failed to flush");

        let model = SVM::new()
            .train_from_file(temp_file.path())
            .expect("Training should succeed");

        let accuracy = model
            .evaluate_from_file(temp_file.path())
            .expect("Evaluation should succeed");
        assert_eq!(accuracy, 1.0);

        let model2 = quick::train_libsvm(temp_file.path()).expect("Quick training should succeed");
        assert!(model2.info().n_support_vectors > 0);
    }

    #[test]
    fn test_simple_validation() {
        let dataset = TrainingSet::new(
            vec![
                vec![2.0],
                vec![-2.0],
                vec![1.5],
                vec![-1.5],
                vec![1.8],
                vec![-1.8],
            ],
            vec![1.0, -1.0, 1.0, -1.0, 1.0, -1.0],
        )
        .unwrap();

        let accuracy =
            quick::simple_validation(&dataset, 0.7, 1.0).expect("Validation should succeed");
        assert_eq!(accuracy, 1.0);

        assert!(quick::simple_validation(&dataset, 1.0, 1.0).is_err());
        assert!(quick::simple_validation(&dataset, f64::NAN, 1.0).is_err());
    }

    #[test]
    fn test_validate_holdout_uses_builder_settings() {
        // Rows alternate between two clusters so both halves hold both classes
        let features: Vec<Vec<f64>> = (0..10)
            .map(|i| {
                let side = if i % 2 == 0 { 1.0 } else { -1.0 };
                vec![side * (2.0 + 0.1 * i as f64), 0.3 * i as f64]
            })
            .collect();
        let labels = (0..10).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        let dataset = TrainingSet::new(features, labels).unwrap();

        let accuracy = SVM::with_kernel(RBFKernel::new(0.5))
            .with_formulation(Formulation::L2SoftMargin)
            .validate_holdout(&dataset, 0.6)
            .unwrap();
        assert_eq!(accuracy, 1.0);

        // One training row is a single class, which the V-matrix form rejects
        assert!(matches!(
            SVM::new()
                .with_formulation(Formulation::ExtendedVMatrix)
                .validate_holdout(&dataset, 0.1),
            Err(SVMError::Configuration(_))
        ));
    }
}
