//! Reporting hook for constructed predictors

use crate::predictor::PredictorReport;
use log::info;

/// Receives the parameters of every predictor the trainer builds
pub trait PredictorObserver: Send + Sync {
    fn predictor_constructed(&self, report: &PredictorReport<'_>);
}

impl<F> PredictorObserver for F
where
    F: Fn(&PredictorReport<'_>) + Send + Sync,
{
    fn predictor_constructed(&self, report: &PredictorReport<'_>) {
        self(report)
    }
}

/// Writes predictor parameters to the `log` facade at info level
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl PredictorObserver for LogObserver {
    fn predictor_constructed(&self, report: &PredictorReport<'_>) {
        info!("Bias: {}", report.bias);
        info!("Weights: {:?}", report.weights);
        info!("Support vectors: {:?}", report.support_vectors);
        info!("Support vector labels: {:?}", report.support_vector_labels);
    }
}
