//! Batch input for the F-score metrics.

use burn::{prelude::*, tensor::backend::Backend};
use derive_new::new;

/// One batch of labels and model scores.
#[derive(new, Debug, Clone)]
pub struct FScoreInput<B: Backend> {
    /// Binary class membership with shape `[batch_size, num_classes]`.
    pub targets: Tensor<B, 2>,
    /// Model scores with shape `[batch_size, num_classes]`.
    pub predictions: Tensor<B, 2>,
    /// Optional per-row weights with shape `[batch_size]`.
    #[new(default)]
    pub weights: Option<Tensor<B, 1>>,
}

impl<B: Backend> FScoreInput<B> {
    /// Attaches per-row sample weights.
    pub fn with_weights(mut self, weights: Tensor<B, 1>) -> Self {
        self.weights = Some(weights);
        self
    }
}

impl<B: Backend> From<(Tensor<B, 2>, Tensor<B, 2>)> for FScoreInput<B> {
    fn from((targets, predictions): (Tensor<B, 2>, Tensor<B, 2>)) -> Self {
        Self::new(targets, predictions)
    }
}
