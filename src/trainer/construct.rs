//! Predictor construction from solved Lagrange multipliers

use crate::core::{Result, SVMError, TrainingSet, MIN_SUPPORT_VECTOR_MULTIPLIER};
use crate::kernel::Kernel;
use crate::predictor::Predictor;
use crate::trainer::PredictorObserver;
use log::{debug, warn};
use std::sync::Arc;

/// Build a predictor from the multipliers of a solved dual problem
///
/// Samples whose multiplier exceeds [`MIN_SUPPORT_VECTOR_MULTIPLIER`] become
/// support vectors. The bias is the mean, over the support vectors, of
/// `y_k` minus the zero-bias decision value at `x_k`.
///
/// A training set with a single class and no support vectors yields a
/// predictor that always returns that class. Mixed labels without any
/// support vector are an [`SVMError::EmptySupportSet`].
///
/// # Panics
/// Panics if `multipliers` and `training_set` differ in length.
pub fn construct_predictor<K: Kernel>(
    kernel: Arc<K>,
    training_set: &TrainingSet,
    multipliers: &[f64],
    observer: Option<&dyn PredictorObserver>,
) -> Result<Predictor<K>> {
    assert_eq!(
        multipliers.len(),
        training_set.len(),
        "one multiplier per training sample"
    );

    let mut weights = Vec::new();
    let mut support_vectors = Vec::new();
    let mut support_vector_labels = Vec::new();
    for ((x, y), &alpha) in training_set.iter().zip(multipliers) {
        if alpha > MIN_SUPPORT_VECTOR_MULTIPLIER {
            weights.push(alpha);
            support_vectors.push(x.to_vec());
            support_vector_labels.push(y);
        }
    }

    if support_vectors.is_empty() {
        if training_set.is_single_class() {
            let label = training_set.labels()[0];
            warn!("Training set has a single class; predictor always returns {label}");
            let predictor = Predictor::new(kernel, label, vec![], vec![], vec![]);
            notify(observer, &predictor);
            return Ok(predictor);
        }
        return Err(SVMError::EmptySupportSet);
    }

    let unbiased = Predictor::new(
        Arc::clone(&kernel),
        0.0,
        weights,
        support_vectors,
        support_vector_labels,
    );
    let bias = unbiased
        .support_vectors()
        .iter()
        .zip(unbiased.support_vector_labels())
        .map(|(x, y)| y - unbiased.decision_function(x))
        .sum::<f64>()
        / unbiased.support_vectors().len() as f64;

    debug!(
        "{} of {} samples are support vectors",
        unbiased.support_vectors().len(),
        training_set.len()
    );

    let predictor = Predictor::new(
        kernel,
        bias,
        unbiased.weights().to_vec(),
        unbiased.support_vectors().to_vec(),
        unbiased.support_vector_labels().to_vec(),
    );
    notify(observer, &predictor);
    Ok(predictor)
}

fn notify<K: Kernel>(observer: Option<&dyn PredictorObserver>, predictor: &Predictor<K>) {
    if let Some(observer) = observer {
        observer.predictor_constructed(&predictor.report());
    }
}
