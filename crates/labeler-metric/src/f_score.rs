//! F-beta and F1 metrics over streaming multi-label batches.
//!
//! Each batch is binarized on the backend, reduced to weighted per-class
//! TP/FP/FN sums and added to host-side running counts. Scores are derived
//! from those counts on demand.

use core::marker::PhantomData;

use burn::{
    prelude::*,
    tensor::{backend::Backend, cast::ToElement, Tensor},
};

use crate::{
    config::{Average, F1ScoreConfig, FBetaScoreConfig},
    error::{MetricError, MetricResult},
    input::FScoreInput,
    stats::{BatchCounts, ConfusionStats, FScoreValue},
};

/// Labels at or above this value count as class members.
const LABEL_THRESHOLD: f64 = 0.5;

/// Lifecycle shared by the streaming F-score metrics.
///
/// Updates mutate the running counts; `result` only reads them. Concurrent
/// updates of one instance are not supported, wrap it in a `Mutex` to share
/// it between threads.
pub trait StreamingMetric<B: Backend>: Sized {
    /// Serializable construction parameters.
    type Config;

    /// Absorbs one batch. On error the running counts are left untouched.
    fn update(&mut self, input: &FScoreInput<B>) -> MetricResult<()>;

    /// Score of everything absorbed since construction or the last reset.
    fn result(&self) -> FScoreValue;

    /// Zeroes the running counts.
    fn reset(&mut self);

    /// Construction parameters of this metric.
    fn get_config(&self) -> Self::Config;

    /// Builds a fresh metric from construction parameters.
    fn from_config(config: Self::Config) -> MetricResult<Self>;

    /// Absorbs one batch and returns the updated score.
    fn update_and_result(&mut self, input: &FScoreInput<B>) -> MetricResult<FScoreValue> {
        self.update(input)?;
        Ok(self.result())
    }
}

// --- F-beta Metric ---

/// F-beta metric.
#[derive(Debug, Clone)]
pub struct FBetaScore<B: Backend> {
    config: FBetaScoreConfig,
    stats: ConfusionStats,
    _b: PhantomData<B>,
}

impl FBetaScoreConfig {
    /// Builds a zeroed F-beta metric.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a field is out of range.
    pub fn init<B: Backend>(&self) -> MetricResult<FBetaScore<B>> {
        self.validate()?;
        tracing::debug!(
            num_classes = self.num_classes,
            average = %self.average,
            beta = self.beta,
            threshold = ?self.threshold,
            "initializing F-beta metric",
        );

        Ok(FBetaScore {
            config: self.clone(),
            stats: ConfusionStats::new(self.num_classes),
            _b: PhantomData,
        })
    }
}

impl<B: Backend> FBetaScore<B> {
    pub fn num_classes(&self) -> usize {
        self.config.num_classes
    }

    pub fn average(&self) -> Average {
        self.config.average
    }

    pub fn beta(&self) -> f64 {
        self.config.beta
    }

    pub fn threshold(&self) -> Option<f64> {
        self.config.threshold
    }

    /// Running confusion counts.
    pub fn stats(&self) -> &ConfusionStats {
        &self.stats
    }

    /// Returns the batch shape after checking it against the configuration.
    fn validate_batch(&self, input: &FScoreInput<B>) -> MetricResult<[usize; 2]> {
        let targets = input.targets.dims();
        let predictions = input.predictions.dims();
        if targets != predictions {
            return Err(MetricError::ShapeMismatch {
                targets,
                predictions,
            });
        }

        let [rows, cols] = predictions;
        if cols != self.config.num_classes {
            return Err(MetricError::ClassCountMismatch {
                expected: self.config.num_classes,
                actual: cols,
            });
        }

        if let Some(weights) = &input.weights {
            let [len] = weights.dims();
            if len != rows {
                return Err(MetricError::WeightLengthMismatch {
                    expected: rows,
                    actual: len,
                });
            }
            if rows > 0
                && weights
                    .clone()
                    .lower_elem(0.0)
                    .any()
                    .into_scalar()
                    .to_bool()
            {
                return Err(MetricError::NegativeWeight);
            }
        }

        Ok(predictions)
    }
}

impl<B: Backend> StreamingMetric<B> for FBetaScore<B> {
    type Config = FBetaScoreConfig;

    fn update(&mut self, input: &FScoreInput<B>) -> MetricResult<()> {
        let [rows, cols] = self.validate_batch(input)?;
        if rows == 0 {
            return Ok(());
        }

        let counts = batch_counts(input, self.config.threshold, [rows, cols]);
        self.stats.absorb(&counts);

        tracing::debug!(
            rows,
            classes = cols,
            weighted = input.weights.is_some(),
            "absorbed batch",
        );
        Ok(())
    }

    fn result(&self) -> FScoreValue {
        self.stats.fbeta(self.config.beta, self.config.average)
    }

    fn reset(&mut self) {
        tracing::trace!("resetting F-beta metric");
        self.stats.reset();
    }

    fn get_config(&self) -> FBetaScoreConfig {
        self.config.clone()
    }

    fn from_config(config: FBetaScoreConfig) -> MetricResult<Self> {
        config.init()
    }
}

// --- F1 Metric ---

/// F1 metric, the F-beta metric with beta fixed to 1.
#[derive(Debug, Clone)]
pub struct F1Score<B: Backend> {
    config: F1ScoreConfig,
    inner: FBetaScore<B>,
}

impl F1ScoreConfig {
    /// Builds a zeroed F1 metric.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a field is out of range.
    pub fn init<B: Backend>(&self) -> MetricResult<F1Score<B>> {
        Ok(F1Score {
            config: self.clone(),
            inner: self.to_fbeta().init()?,
        })
    }
}

impl<B: Backend> F1Score<B> {
    pub fn num_classes(&self) -> usize {
        self.inner.num_classes()
    }

    pub fn average(&self) -> Average {
        self.inner.average()
    }

    pub fn threshold(&self) -> Option<f64> {
        self.inner.threshold()
    }

    /// Running confusion counts.
    pub fn stats(&self) -> &ConfusionStats {
        self.inner.stats()
    }
}

impl<B: Backend> StreamingMetric<B> for F1Score<B> {
    type Config = F1ScoreConfig;

    fn update(&mut self, input: &FScoreInput<B>) -> MetricResult<()> {
        self.inner.update(input)
    }

    fn result(&self) -> FScoreValue {
        self.inner.result()
    }

    fn reset(&mut self) {
        self.inner.reset();
    }

    fn get_config(&self) -> F1ScoreConfig {
        self.config.clone()
    }

    fn from_config(config: F1ScoreConfig) -> MetricResult<Self> {
        config.init()
    }
}

/// Binarizes scores: `score >= threshold` per cell, or a one-hot argmax per
/// row when no threshold is set. Ties go to the lowest column.
fn binarize<B: Backend>(predictions: Tensor<B, 2>, threshold: Option<f64>) -> Tensor<B, 2> {
    match threshold {
        Some(threshold) => predictions.greater_equal_elem(threshold).float(),
        None => {
            let [rows, cols] = predictions.dims();
            let device = predictions.device();

            let winners = predictions.argmax(1).expand([rows, cols]);
            let columns = Tensor::<B, 1, Int>::arange(0..cols as i64, &device)
                .reshape([1, cols])
                .expand([rows, cols]);

            winners.equal(columns).float()
        }
    }
}

/// Reduces one validated, non-empty batch to weighted per-class sums.
fn batch_counts<B: Backend>(
    input: &FScoreInput<B>,
    threshold: Option<f64>,
    [rows, cols]: [usize; 2],
) -> BatchCounts {
    let labels = input
        .targets
        .clone()
        .greater_equal_elem(LABEL_THRESHOLD)
        .float();
    let predicted = binarize(input.predictions.clone(), threshold);

    let weights = match &input.weights {
        Some(weights) => weights.clone().reshape([rows, 1]).expand([rows, cols]),
        None => labels.ones_like(),
    };

    // label, prediction and weight products stay exact, so the differences
    // below are exact too
    let members = labels * weights.clone();
    let positives = predicted.clone() * weights;
    let true_positives = members.clone() * predicted;
    let false_positives = positives - true_positives.clone();
    let false_negatives = members.clone() - true_positives.clone();

    let sums = Tensor::cat(
        vec![
            true_positives.sum_dim(0),
            false_positives.sum_dim(0),
            false_negatives.sum_dim(0),
            members.sum_dim(0),
        ],
        0,
    )
    .into_data()
    .iter::<f64>()
    .collect::<Vec<_>>();
    let row = |index: usize| sums[index * cols..(index + 1) * cols].to_vec();

    BatchCounts::new(row(0), row(1), row(2), row(3))
}
