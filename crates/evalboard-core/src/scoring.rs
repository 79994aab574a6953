//! Weighted overall score computation.
//!
//! The overall score is the weighted mean of the metric averages a submission
//! actually has. Missing metrics are left out of both the numerator and the
//! denominator, so a partial submission is scored on what it reports rather
//! than penalised with zeros.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{MetricKind, MetricResult};

/// Weight table over the recognized metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricWeights {
    weights: BTreeMap<MetricKind, f64>,
}

impl Default for MetricWeights {
    fn default() -> Self {
        Self::standard()
    }
}

impl MetricWeights {
    /// The leaderboard table: every metric weighted 0.20.
    pub fn standard() -> Self {
        Self {
            weights: MetricKind::ALL.into_iter().map(|m| (m, 0.20)).collect(),
        }
    }

    pub fn weight(&self, metric: MetricKind) -> f64 {
        self.weights.get(&metric).copied().unwrap_or(0.0)
    }

    /// Weighted overall score over the metrics present in a record.
    pub fn overall(&self, metrics: &BTreeMap<String, MetricResult>) -> f64 {
        self.overall_from_averages(&present_averages(metrics))
    }

    /// Weighted overall score over already-extracted averages.
    ///
    /// Returns `0.0` when no weighted metric is present.
    pub fn overall_from_averages(&self, averages: &BTreeMap<MetricKind, f64>) -> f64 {
        let mut weighted_sum = 0.0;
        let mut total_weight = 0.0;
        for (metric, weight) in &self.weights {
            if let Some(average) = averages.get(metric) {
                weighted_sum += average * weight;
                total_weight += weight;
            }
        }
        if total_weight > 0.0 {
            weighted_sum / total_weight
        } else {
            0.0
        }
    }
}

/// Overall score under the standard weight table.
pub fn overall_score(metrics: &BTreeMap<String, MetricResult>) -> f64 {
    MetricWeights::standard().overall(metrics)
}

/// Averages of the recognized metrics that carry one. Unrecognized metric
/// names and entries without an average are dropped.
pub fn present_averages(metrics: &BTreeMap<String, MetricResult>) -> BTreeMap<MetricKind, f64> {
    MetricKind::ALL
        .into_iter()
        .filter_map(|m| {
            metrics
                .get(m.key())
                .and_then(|r| r.average)
                .map(|avg| (m, avg))
        })
        .collect()
}

/// Average plus per-instance extremes of one metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricSummary {
    pub average: f64,
    pub min: f64,
    pub max: f64,
}

impl MetricSummary {
    /// Summarise a metric result. Missing average and empty score maps
    /// collapse to `0.0`.
    pub fn from_result(result: &MetricResult) -> Self {
        let min = result.scores.values().copied().reduce(f64::min).unwrap_or(0.0);
        let max = result.scores.values().copied().reduce(f64::max).unwrap_or(0.0);
        Self {
            average: result.average.unwrap_or(0.0),
            min,
            max,
        }
    }
}
