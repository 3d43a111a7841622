//! Host-side confusion statistics and F-beta scoring.
//!
//! Running counts are kept as plain `f64` vectors indexed by class. Every
//! ratio goes through [`div_no_nan`], so degenerate classes score 0 instead
//! of producing NaN.

use derive_new::new;

use crate::config::Average;

/// Value reported by an F-score metric.
#[derive(Debug, Clone, PartialEq)]
pub enum FScoreValue {
    /// Single score produced by micro, macro or weighted averaging.
    Aggregate(f64),
    /// One score per class, produced when averaging is disabled.
    PerClass(Vec<f64>),
}

impl FScoreValue {
    /// The aggregated score, if this value is one.
    pub const fn as_aggregate(&self) -> Option<f64> {
        match self {
            Self::Aggregate(value) => Some(*value),
            Self::PerClass(_) => None,
        }
    }

    /// The per-class scores, if this value holds them.
    pub fn per_class(&self) -> Option<&[f64]> {
        match self {
            Self::Aggregate(_) => None,
            Self::PerClass(values) => Some(values),
        }
    }

    /// The aggregated score, or the unweighted mean of the per-class scores.
    pub fn mean(&self) -> f64 {
        match self {
            Self::Aggregate(value) => *value,
            Self::PerClass(values) => div_no_nan(values.iter().sum(), values.len() as f64),
        }
    }
}

/// Weighted per-class sums for a single batch.
#[derive(new, Debug, Clone, PartialEq)]
pub struct BatchCounts {
    pub true_positives: Vec<f64>,
    pub false_positives: Vec<f64>,
    pub false_negatives: Vec<f64>,
    /// Weighted count of label memberships per class.
    pub support: Vec<f64>,
}

/// Running per-class confusion counts.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfusionStats {
    true_positives: Vec<f64>,
    false_positives: Vec<f64>,
    false_negatives: Vec<f64>,
    support: Vec<f64>,
}

impl ConfusionStats {
    /// Zeroed statistics for `num_classes` classes.
    pub fn new(num_classes: usize) -> Self {
        Self {
            true_positives: vec![0.0; num_classes],
            false_positives: vec![0.0; num_classes],
            false_negatives: vec![0.0; num_classes],
            support: vec![0.0; num_classes],
        }
    }

    pub fn num_classes(&self) -> usize {
        self.true_positives.len()
    }

    pub fn true_positives(&self) -> &[f64] {
        &self.true_positives
    }

    pub fn false_positives(&self) -> &[f64] {
        &self.false_positives
    }

    pub fn false_negatives(&self) -> &[f64] {
        &self.false_negatives
    }

    pub fn support(&self) -> &[f64] {
        &self.support
    }

    /// Adds one batch worth of counts to the running totals.
    ///
    /// Every vector in `batch` must have one entry per class.
    pub fn absorb(&mut self, batch: &BatchCounts) {
        debug_assert_eq!(batch.true_positives.len(), self.num_classes());
        debug_assert_eq!(batch.false_positives.len(), self.num_classes());
        debug_assert_eq!(batch.false_negatives.len(), self.num_classes());
        debug_assert_eq!(batch.support.len(), self.num_classes());

        accumulate(&mut self.true_positives, &batch.true_positives);
        accumulate(&mut self.false_positives, &batch.false_positives);
        accumulate(&mut self.false_negatives, &batch.false_negatives);
        accumulate(&mut self.support, &batch.support);
    }

    /// Zeroes every running count.
    pub fn reset(&mut self) {
        self.true_positives.fill(0.0);
        self.false_positives.fill(0.0);
        self.false_negatives.fill(0.0);
        self.support.fill(0.0);
    }

    /// F-beta score of each class.
    pub fn per_class_fbeta(&self, beta: f64) -> Vec<f64> {
        self.true_positives
            .iter()
            .zip(&self.false_positives)
            .zip(&self.false_negatives)
            .map(|((&tp, &fp), &fn_)| fbeta_from_counts(tp, fp, fn_, beta))
            .collect()
    }

    /// F-beta score aggregated according to `average`.
    pub fn fbeta(&self, beta: f64, average: Average) -> FScoreValue {
        match average {
            Average::None => FScoreValue::PerClass(self.per_class_fbeta(beta)),
            Average::Micro => FScoreValue::Aggregate(fbeta_from_counts(
                self.true_positives.iter().sum(),
                self.false_positives.iter().sum(),
                self.false_negatives.iter().sum(),
                beta,
            )),
            Average::Macro => {
                let scores = self.per_class_fbeta(beta);
                FScoreValue::Aggregate(div_no_nan(scores.iter().sum(), scores.len() as f64))
            }
            Average::Weighted => {
                let scores = self.per_class_fbeta(beta);
                let total: f64 = self.support.iter().sum();
                let weighted = scores
                    .iter()
                    .zip(&self.support)
                    .map(|(score, support)| score * div_no_nan(*support, total))
                    .sum();
                FScoreValue::Aggregate(weighted)
            }
        }
    }
}

fn accumulate(total: &mut [f64], batch: &[f64]) {
    for (acc, value) in total.iter_mut().zip(batch) {
        *acc += value;
    }
}

/// Division where a zero denominator yields 0.
pub fn div_no_nan(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// F-beta score from raw counts: `(1 + β²)·p·r / (β²·p + r)`.
pub fn fbeta_from_counts(
    true_positives: f64,
    false_positives: f64,
    false_negatives: f64,
    beta: f64,
) -> f64 {
    let precision = div_no_nan(true_positives, true_positives + false_positives);
    let recall = div_no_nan(true_positives, true_positives + false_negatives);
    let beta_sq = beta * beta;

    div_no_nan(precision * recall, beta_sq.mul_add(precision, recall)) * (1.0 + beta_sq)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-6,
            "expected {expected}, got {actual}"
        );
    }

    // Counts of the argmax scenario: three classes, unit weights.
    fn argmax_scenario() -> ConfusionStats {
        let mut stats = ConfusionStats::new(3);
        stats.absorb(&BatchCounts::new(
            vec![2.0, 1.0, 2.0],
            vec![0.0, 1.0, 0.0],
            vec![1.0, 0.0, 0.0],
            vec![3.0, 1.0, 2.0],
        ));
        stats
    }

    #[test]
    fn div_no_nan_maps_zero_denominator_to_zero() {
        assert_eq!(div_no_nan(0.0, 0.0), 0.0);
        assert_eq!(div_no_nan(3.0, 0.0), 0.0);
        assert_eq!(div_no_nan(3.0, 4.0), 0.75);
    }

    #[test]
    fn empty_class_scores_zero() {
        assert_eq!(fbeta_from_counts(0.0, 0.0, 0.0, 1.0), 0.0);
        assert_eq!(fbeta_from_counts(0.0, 5.0, 3.0, 2.0), 0.0);
    }

    #[test]
    fn fbeta_matches_closed_form() {
        // p = 2/3, r = 1
        assert_close(fbeta_from_counts(2.0, 1.0, 0.0, 1.0), 0.8);
        assert_close(fbeta_from_counts(2.0, 1.0, 0.0, 0.5), 0.714_285_7);
        assert_close(fbeta_from_counts(2.0, 1.0, 0.0, 2.0), 0.909_090_9);
    }

    #[test]
    fn aggregation_modes() {
        let stats = argmax_scenario();

        let per_class = stats.fbeta(1.0, Average::None);
        let scores = per_class.per_class().unwrap();
        assert_close(scores[0], 0.8);
        assert_close(scores[1], 0.666_666_7);
        assert_close(scores[2], 1.0);

        assert_close(stats.fbeta(1.0, Average::Micro).mean(), 0.833_333_3);
        assert_close(stats.fbeta(1.0, Average::Macro).mean(), 0.822_222_2);
        assert_close(stats.fbeta(1.0, Average::Weighted).mean(), 0.844_444_4);
        assert_close(per_class.mean(), 0.822_222_2);
    }

    #[test]
    fn weighted_average_ignores_unsupported_classes() {
        let mut stats = ConfusionStats::new(2);
        stats.absorb(&BatchCounts::new(
            vec![1.0, 0.0],
            vec![0.0, 1.0],
            vec![0.0, 0.0],
            vec![1.0, 0.0],
        ));

        assert_close(stats.fbeta(1.0, Average::Weighted).mean(), 1.0);
        assert_close(stats.fbeta(1.0, Average::Macro).mean(), 0.5);
    }

    #[test]
    fn zero_state_scores_zero_everywhere() {
        let stats = ConfusionStats::new(3);
        for average in [Average::Micro, Average::Macro, Average::Weighted] {
            assert_eq!(stats.fbeta(2.0, average), FScoreValue::Aggregate(0.0));
        }
        assert_eq!(
            stats.fbeta(2.0, Average::None),
            FScoreValue::PerClass(vec![0.0; 3])
        );
    }

    #[test]
    fn absorb_accumulates_and_reset_clears() {
        let mut stats = argmax_scenario();
        stats.absorb(&BatchCounts::new(
            vec![1.0, 0.0, 0.0],
            vec![0.0, 0.5, 0.0],
            vec![0.0, 0.0, 1.0],
            vec![1.0, 0.0, 1.0],
        ));

        assert_eq!(stats.true_positives(), &[3.0, 1.0, 2.0]);
        assert_eq!(stats.false_positives(), &[0.0, 1.5, 0.0]);
        assert_eq!(stats.false_negatives(), &[1.0, 0.0, 1.0]);
        assert_eq!(stats.support(), &[4.0, 1.0, 3.0]);

        stats.reset();
        assert_eq!(stats, ConfusionStats::new(3));
    }

    #[test]
    fn value_accessors() {
        let aggregate = FScoreValue::Aggregate(0.25);
        assert_eq!(aggregate.as_aggregate(), Some(0.25));
        assert_eq!(aggregate.per_class(), None);

        let per_class = FScoreValue::PerClass(vec![0.5, 1.0]);
        assert_eq!(per_class.as_aggregate(), None);
        assert_eq!(per_class.per_class(), Some(&[0.5, 1.0][..]));
        assert_close(per_class.mean(), 0.75);
    }
}
