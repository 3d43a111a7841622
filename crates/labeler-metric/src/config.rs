//! Configuration records for the F-score metrics.
//!
//! The records only describe how a metric is built. They never carry running
//! counts, so a record exported from a metric mid-stream rebuilds a fresh,
//! zeroed metric.

use core::{fmt, str::FromStr};

use burn::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{MetricError, MetricResult};

/// How per-class scores are combined into the reported value.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Average {
    /// Report one score per class.
    #[default]
    None,
    /// Pool TP, FP and FN over all classes, then score once.
    Micro,
    /// Unweighted mean of the per-class scores.
    Macro,
    /// Mean of the per-class scores weighted by class support.
    Weighted,
}

impl Average {
    /// Lowercase name, as used in serialized configurations.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Micro => "micro",
            Self::Macro => "macro",
            Self::Weighted => "weighted",
        }
    }
}

impl fmt::Display for Average {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Average {
    type Err = MetricError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(Self::None),
            "micro" => Ok(Self::Micro),
            "macro" => Ok(Self::Macro),
            "weighted" => Ok(Self::Weighted),
            _ => Err(MetricError::InvalidAverage {
                value: s.to_owned(),
            }),
        }
    }
}

/// Configuration for the F-beta metric.
#[derive(Config, Debug, PartialEq)]
pub struct FBetaScoreConfig {
    /// Number of classes, i.e. the column count of every batch.
    pub num_classes: usize,
    /// Class aggregation mode.
    #[config(default = "Average::None")]
    pub average: Average,
    /// Weight of recall relative to precision.
    #[config(default = 1.0)]
    pub beta: f64,
    /// Binarization threshold. When unset, the highest-scoring column of
    /// each row is the only positive prediction.
    pub threshold: Option<f64>,
}

impl FBetaScoreConfig {
    /// Checks every field against its allowed range.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for zero classes, a non-positive or
    /// non-finite beta, or a threshold outside `[0, 1]`.
    pub fn validate(&self) -> MetricResult<()> {
        if self.num_classes == 0 {
            return Err(MetricError::InvalidNumClasses);
        }
        if !(self.beta.is_finite() && self.beta > 0.0) {
            return Err(MetricError::InvalidBeta { beta: self.beta });
        }
        if let Some(threshold) = self.threshold {
            if !(0.0..=1.0).contains(&threshold) {
                return Err(MetricError::InvalidThreshold { threshold });
            }
        }
        Ok(())
    }

    /// Decodes and validates a JSON configuration record.
    ///
    /// # Errors
    ///
    /// Returns [`MetricError::MalformedConfig`] when the record cannot be
    /// decoded (including unknown averaging modes), or the matching
    /// configuration error when a field is out of range.
    pub fn from_json(json: &str) -> MetricResult<Self> {
        let config = Self::load_binary(json.as_bytes()).map_err(|err| {
            MetricError::MalformedConfig {
                reason: err.to_string(),
            }
        })?;
        config.validate()?;
        Ok(config)
    }
}

/// Configuration for the F1 metric.
///
/// Same record as [`FBetaScoreConfig`] without `beta`, which is fixed to 1.
#[derive(Config, Debug, PartialEq)]
pub struct F1ScoreConfig {
    /// Number of classes, i.e. the column count of every batch.
    pub num_classes: usize,
    /// Class aggregation mode.
    #[config(default = "Average::None")]
    pub average: Average,
    /// Binarization threshold, argmax when unset.
    pub threshold: Option<f64>,
}

impl F1ScoreConfig {
    /// The equivalent F-beta configuration.
    pub fn to_fbeta(&self) -> FBetaScoreConfig {
        FBetaScoreConfig::new(self.num_classes)
            .with_average(self.average)
            .with_beta(1.0)
            .with_threshold(self.threshold)
    }

    /// Checks every field against its allowed range.
    ///
    /// # Errors
    ///
    /// See [`FBetaScoreConfig::validate`].
    pub fn validate(&self) -> MetricResult<()> {
        self.to_fbeta().validate()
    }

    /// Decodes and validates a JSON configuration record.
    ///
    /// # Errors
    ///
    /// See [`FBetaScoreConfig::from_json`].
    pub fn from_json(json: &str) -> MetricResult<Self> {
        let config = Self::load_binary(json.as_bytes()).map_err(|err| {
            MetricError::MalformedConfig {
                reason: err.to_string(),
            }
        })?;
        config.validate()?;
        Ok(config)
    }
}
