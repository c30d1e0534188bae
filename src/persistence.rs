//! Model serialization and persistence
//!
//! Saved models are JSON documents holding the kernel, the bias and the
//! support vector expansion, which is everything a [`Predictor`] needs.

use crate::api::TrainedModel;
use crate::core::{Formulation, Result, SVMError, SVMModel, TrainerConfig};
use crate::kernel::KernelType;
use crate::predictor::Predictor;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::sync::Arc;

/// Serializable representation of a trained SVM model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerializableModel {
    /// Kernel and its hyperparameters
    pub kernel: KernelType,
    /// Bias term
    pub bias: f64,
    /// Lagrange multiplier of each support vector
    pub weights: Vec<f64>,
    /// Support vectors
    pub support_vectors: Vec<Vec<f64>>,
    /// Labels of the support vectors
    pub support_vector_labels: Vec<f64>,
    /// Model metadata
    pub metadata: ModelMetadata,
}

/// Model metadata for tracking and validation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Library version used to create the model
    pub library_version: String,
    /// Number of support vectors
    pub n_support_vectors: usize,
    /// Training parameters used
    pub training_params: TrainingParams,
    /// Creation timestamp
    pub created_at: String,
}

/// Training parameters for reference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingParams {
    pub c: f64,
    pub formulation: Formulation,
}

impl SerializableModel {
    /// Create a serializable model from a trained model
    pub fn from_trained_model(model: &TrainedModel<KernelType>) -> Self {
        Self::from_predictor(model.inner(), model.config())
    }

    /// Create a serializable model from a predictor and its configuration
    pub fn from_predictor(predictor: &Predictor<KernelType>, config: &TrainerConfig) -> Self {
        Self {
            kernel: *predictor.kernel(),
            bias: predictor.bias(),
            weights: predictor.weights().to_vec(),
            support_vectors: predictor.support_vectors().to_vec(),
            support_vector_labels: predictor.support_vector_labels().to_vec(),
            metadata: ModelMetadata {
                library_version: env!("CARGO_PKG_VERSION").to_string(),
                n_support_vectors: predictor.n_support_vectors(),
                training_params: TrainingParams {
                    c: config.c,
                    formulation: config.formulation,
                },
                created_at: chrono::Utc::now().to_rfc3339(),
            },
        }
    }

    /// Save model to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| SVMError::Serialization(e.to_string()))?;
        Ok(())
    }

    /// Load model from file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let model = serde_json::from_reader(reader)
            .map_err(|e| SVMError::Serialization(e.to_string()))?;
        Ok(model)
    }

    /// Rebuild the predictor, checking that the stored parts agree
    pub fn to_predictor(&self) -> Result<Predictor<KernelType>> {
        self.kernel.validate()?;

        let n = self.support_vectors.len();
        if self.weights.len() != n || self.support_vector_labels.len() != n {
            return Err(SVMError::Serialization(format!(
                "{n} support vectors but {} weights and {} labels",
                self.weights.len(),
                self.support_vector_labels.len()
            )));
        }
        if let Some(first) = self.support_vectors.first() {
            if let Some(bad) = self.support_vectors.iter().find(|sv| sv.len() != first.len()) {
                return Err(SVMError::DimensionMismatch {
                    expected: first.len(),
                    actual: bad.len(),
                });
            }
        }
        if !self.bias.is_finite() {
            return Err(SVMError::Serialization(format!(
                "bias must be finite, got {}",
                self.bias
            )));
        }

        Ok(Predictor::new(
            Arc::new(self.kernel),
            self.bias,
            self.weights.clone(),
            self.support_vectors.clone(),
            self.support_vector_labels.clone(),
        ))
    }

    /// Rebuild the high-level model
    pub fn to_trained_model(&self) -> Result<TrainedModel<KernelType>> {
        let params = &self.metadata.training_params;
        Ok(TrainedModel::from_predictor(
            self.to_predictor()?,
            TrainerConfig {
                c: params.c,
                formulation: params.formulation,
            },
        ))
    }

    /// Print model summary
    pub fn print_summary(&self) {
        println!("=== SVM Model Summary ===");
        println!("Kernel: {}", self.kernel);
        println!("Support Vectors: {}", self.metadata.n_support_vectors);
        println!("Bias: {:.6}", self.bias);
        println!("Library Version: {}", self.metadata.library_version);
        println!("Created: {}", self.metadata.created_at);
        println!("Training Parameters:");
        println!("  C: {}", self.metadata.training_params.c);
        println!("  Formulation: {}", self.metadata.training_params.formulation);
    }
}
