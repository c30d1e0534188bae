//! Core traits for SVM training

use crate::core::{Prediction, Result, TrainingSet};

/// Dataset abstraction for labelled dense samples
pub trait Dataset {
    /// Number of samples in the dataset
    fn len(&self) -> usize;

    /// Number of features (dimensionality)
    fn dim(&self) -> usize;

    /// Feature vector of sample `i`
    ///
    /// # Panics
    /// Panics if index >= len()
    fn features(&self, i: usize) -> &[f64];

    /// Label of sample `i`
    fn label(&self, i: usize) -> f64;

    /// Get all labels as a vector
    fn get_labels(&self) -> Vec<f64> {
        (0..self.len()).map(|i| self.label(i)).collect()
    }

    /// Check if the dataset is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy the dataset into a validated training set
    fn to_training_set(&self) -> Result<TrainingSet> {
        let features = (0..self.len()).map(|i| self.features(i).to_vec()).collect();
        TrainingSet::new(features, self.get_labels())
    }
}

impl Dataset for TrainingSet {
    fn len(&self) -> usize {
        TrainingSet::len(self)
    }

    fn dim(&self) -> usize {
        TrainingSet::dim(self)
    }

    fn features(&self, i: usize) -> &[f64] {
        &TrainingSet::features(self)[i]
    }

    fn label(&self, i: usize) -> f64 {
        self.labels()[i]
    }

    fn to_training_set(&self) -> Result<TrainingSet> {
        Ok(self.clone())
    }
}

/// Trained SVM model
pub trait SVMModel {
    /// Predict a single feature vector
    fn predict(&self, x: &[f64]) -> Prediction;

    /// Predict multiple feature vectors
    fn predict_batch(&self, xs: &[Vec<f64>]) -> Vec<Prediction> {
        xs.iter().map(|x| self.predict(x)).collect()
    }

    /// Get the number of support vectors
    fn n_support_vectors(&self) -> usize;

    /// Get the bias term
    fn bias(&self) -> f64;
}
