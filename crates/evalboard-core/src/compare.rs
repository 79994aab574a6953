//! Side-by-side comparison of submissions.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::aggregate::load_submission;
use crate::domain::{EvalboardError, MetricKind, Result, Submission, SubmissionId};
use crate::loader::RecordSource;

/// Fewest submissions a comparison accepts.
pub const MIN_COMPARED: usize = 2;

/// One row of the comparison table: a metric (or the overall score) with
/// one value per compared submission, in column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub label: String,
    pub values: Vec<f64>,
}

/// Highest-scoring submission for one metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricLeader {
    pub metric: MetricKind,
    pub submission: SubmissionId,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    /// Column order of every row.
    pub submissions: Vec<SubmissionId>,
    /// The five metrics in canonical order, then `Overall`.
    pub rows: Vec<ComparisonRow>,
    pub best: Vec<MetricLeader>,
}

impl Comparison {
    /// Compare at least two aggregated submissions. Missing metrics read as
    /// `0.0`; the overall row is each submission's weighted overall score.
    pub fn build(submissions: &[Submission]) -> Result<Self> {
        if submissions.len() < MIN_COMPARED {
            return Err(EvalboardError::InsufficientSubmissions {
                needed: MIN_COMPARED,
                found: submissions.len(),
            });
        }

        let mut rows: Vec<ComparisonRow> = MetricKind::ALL
            .into_iter()
            .map(|m| ComparisonRow {
                label: m.key().to_string(),
                values: submissions.iter().map(|s| s.metric_or_zero(m)).collect(),
            })
            .collect();
        rows.push(ComparisonRow {
            label: "Overall".to_string(),
            values: submissions.iter().map(|s| s.overall).collect(),
        });

        let best = MetricKind::ALL
            .into_iter()
            .filter_map(|m| {
                let mut leader: Option<&Submission> = None;
                for sub in submissions {
                    // First strictly greater value wins; ties keep the earlier column.
                    if leader.map_or(true, |l| sub.metric_or_zero(m) > l.metric_or_zero(m)) {
                        leader = Some(sub);
                    }
                }
                leader.map(|l| MetricLeader {
                    metric: m,
                    submission: l.id.clone(),
                    value: l.metric_or_zero(m),
                })
            })
            .collect();

        Ok(Self {
            submissions: submissions.iter().map(|s| s.id.clone()).collect(),
            rows,
            best,
        })
    }
}

/// Load the named submissions of `dataset` and compare them.
///
/// Ids that cannot be loaded are logged and left out; the comparison fails
/// only when fewer than two remain.
pub fn compare_ids<S>(source: &S, dataset: &str, ids: &[SubmissionId]) -> Result<Comparison>
where
    S: RecordSource + ?Sized,
{
    let mut loaded = Vec::with_capacity(ids.len());
    for id in ids {
        match load_submission(source, dataset, id) {
            Ok(sub) => loaded.push(sub),
            Err(e) => warn!(submission_id = %id, error = %e, "excluded from comparison"),
        }
    }
    Comparison::build(&loaded)
}

/// Raw metric averages of several submissions, keyed metric first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsComparison {
    /// Requested ids, sorted and deduplicated.
    pub submissions: Vec<SubmissionId>,
    /// Metric name → submission id → average. Covers every metric name found
    /// in the records, recognized or not; a metric without an average reads `0.0`.
    pub metrics: BTreeMap<String, BTreeMap<SubmissionId, f64>>,
}

impl MetricsComparison {
    /// Collect averages for `ids`. Submissions without a loadable evaluation
    /// record are skipped.
    pub fn build<S>(source: &S, dataset: &str, ids: &[SubmissionId]) -> Self
    where
        S: RecordSource + ?Sized,
    {
        let submissions = normalize_ids(ids);
        let mut metrics: BTreeMap<String, BTreeMap<SubmissionId, f64>> = BTreeMap::new();

        for id in &submissions {
            let record = match source.load_evaluation(dataset, id) {
                Ok(record) => record,
                Err(e) => {
                    debug!(submission_id = %id, error = %e, "skipped in metrics comparison");
                    continue;
                }
            };
            for (name, result) in &record.metrics {
                metrics
                    .entry(name.clone())
                    .or_default()
                    .insert(id.clone(), result.average.unwrap_or(0.0));
            }
        }

        Self {
            submissions,
            metrics,
        }
    }
}

fn normalize_ids(ids: &[SubmissionId]) -> Vec<SubmissionId> {
    ids.iter()
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Cache key for a metrics comparison: independent of id order and
/// duplicates.
pub fn comparison_cache_key(dataset: &str, ids: &[SubmissionId]) -> String {
    let mut hasher = Sha256::new();
    for id in normalize_ids(ids) {
        hasher.update(id.as_str().as_bytes());
        hasher.update([0u8]);
    }
    format!("comparison:{}:{}", dataset, hex::encode(hasher.finalize()))
}
