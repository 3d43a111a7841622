//! # Labeler Metrics
//!
//! Streaming F-beta and F1 metrics for multi-label data-labeling models,
//! implemented in Rust using the Burn framework.
//!
//! A metric absorbs batches of label and score matrices, keeps weighted
//! per-class true positive, false positive and false negative counts, and
//! derives a weighted harmonic mean of precision and recall on demand.
//!
//! ## Implemented Metrics
//!
//! - [`FBetaScore`]: F-beta score with a configurable `beta`
//! - [`F1Score`]: the `beta = 1` specialization
//!
//! Both aggregate classes with one of the [`Average`] modes (`none`, `micro`,
//! `macro`, `weighted`), accept optional per-row sample weights, and
//! binarize scores either against a threshold or by per-row argmax.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use burn::prelude::*;
//! use labeler_metric::{Average, FBetaScoreConfig, FScoreInput, StreamingMetric};
//!
//! # fn example<B: burn::tensor::backend::Backend>() -> labeler_metric::MetricResult<()> {
//! let device = Default::default();
//! let mut metric = FBetaScoreConfig::new(3)
//!     .with_average(Average::Macro)
//!     .with_beta(0.5)
//!     .with_threshold(Some(0.66))
//!     .init::<B>()?;
//!
//! // 2D tensors: [batch, classes]
//! let targets = Tensor::<B, 2>::from_floats([[1.0, 0.0, 1.0]], &device);
//! let predictions = Tensor::<B, 2>::from_floats([[0.9, 0.1, 0.7]], &device);
//! metric.update(&FScoreInput::new(targets, predictions))?;
//!
//! println!("F0.5: {}", metric.result().mean());
//!
//! // The configuration, not the running counts, survives a round trip.
//! let json = metric.get_config().to_string();
//! let restored = FBetaScoreConfig::from_json(&json)?.init::<B>()?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod f_score;
pub mod input;
pub mod stats;

pub use config::{Average, F1ScoreConfig, FBetaScoreConfig};
pub use error::{MetricError, MetricResult};
pub use f_score::{F1Score, FBetaScore, StreamingMetric};
pub use input::FScoreInput;
pub use stats::{ConfusionStats, FScoreValue};

#[cfg(test)]
mod tests {
    use burn::backend::NdArray;

    pub type TestBackend = NdArray<f32>;
}
