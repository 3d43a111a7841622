//! Error types for the labeler metrics.
//!
//! Configuration problems are reported when a metric is built or a
//! serialized configuration is loaded. Shape problems are reported by
//! `update` before any running count is touched.

use thiserror::Error;

/// Error type for metric construction and batch accumulation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MetricError {
    /// The averaging mode is not one of `none`, `micro`, `macro` or `weighted`.
    #[error("Unknown averaging mode: {value:?} (expected none, micro, macro or weighted)")]
    InvalidAverage {
        /// The rejected averaging mode.
        value: String,
    },

    /// A metric needs at least one class.
    #[error("Number of classes must be at least 1")]
    InvalidNumClasses,

    /// Beta must be a finite, strictly positive number.
    #[error("Beta must be greater than zero, got {beta}")]
    InvalidBeta {
        /// The rejected beta.
        beta: f64,
    },

    /// Threshold must lie in `[0, 1]`.
    #[error("Threshold must be between 0 and 1, got {threshold}")]
    InvalidThreshold {
        /// The rejected threshold.
        threshold: f64,
    },

    /// A serialized configuration could not be decoded.
    #[error("Malformed metric configuration: {reason}")]
    MalformedConfig {
        /// Decoder message.
        reason: String,
    },

    /// Targets and predictions do not have the same shape.
    #[error("Targets shape {targets:?} does not match predictions shape {predictions:?}")]
    ShapeMismatch {
        /// Shape of the label matrix.
        targets: [usize; 2],
        /// Shape of the prediction matrix.
        predictions: [usize; 2],
    },

    /// The batch has a different number of columns than the metric has classes.
    #[error("Expected {expected} classes per row, got {actual}")]
    ClassCountMismatch {
        /// Configured number of classes.
        expected: usize,
        /// Number of columns in the batch.
        actual: usize,
    },

    /// The sample weight vector does not have one entry per row.
    #[error("Expected {expected} sample weights, got {actual}")]
    WeightLengthMismatch {
        /// Number of rows in the batch.
        expected: usize,
        /// Length of the weight vector.
        actual: usize,
    },

    /// Sample weights must be non-negative.
    #[error("Sample weights must be non-negative")]
    NegativeWeight,
}

impl MetricError {
    /// Whether the error comes from an invalid configuration.
    pub const fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::InvalidAverage { .. }
                | Self::InvalidNumClasses
                | Self::InvalidBeta { .. }
                | Self::InvalidThreshold { .. }
                | Self::MalformedConfig { .. }
        )
    }

    /// Whether the error comes from a batch with inconsistent dimensions.
    pub const fn is_shape(&self) -> bool {
        matches!(
            self,
            Self::ShapeMismatch { .. }
                | Self::ClassCountMismatch { .. }
                | Self::WeightLengthMismatch { .. }
        )
    }
}

/// A specialized `Result` type for metric operations.
pub type MetricResult<T> = Result<T, MetricError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_configuration_and_shape_errors() {
        let config = MetricError::InvalidBeta { beta: -1.0 };
        assert!(config.is_configuration());
        assert!(!config.is_shape());

        let shape = MetricError::WeightLengthMismatch {
            expected: 3,
            actual: 2,
        };
        assert!(shape.is_shape());
        assert!(!shape.is_configuration());

        assert!(!MetricError::NegativeWeight.is_shape());
        assert!(!MetricError::NegativeWeight.is_configuration());
    }

    #[test]
    fn messages_name_the_offending_value() {
        let err = MetricError::InvalidAverage {
            value: "median".to_owned(),
        };
        assert!(err.to_string().contains("\"median\""));

        let err = MetricError::ShapeMismatch {
            targets: [2, 3],
            predictions: [2, 4],
        };
        assert_eq!(
            err.to_string(),
            "Targets shape [2, 3] does not match predictions shape [2, 4]"
        );
    }
}
