//! Per-submission results reports (`results/results.json`).

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::aggregate::SkippedSubmission;
use crate::domain::{EvaluationRecord, MetricKind, Result, Submission, SubmissionMetadata, UNKNOWN};
use crate::loader::{read_submission_dir, FsRecordSource, RecordSource};
use crate::metrics::METRICS;
use crate::obs::{emit_submission_skipped, DatasetSpan};
use crate::reporting::write_submission_results;
use crate::scoring::MetricSummary;
use crate::stats::InstanceStats;

/// Dataset recorded in results when the evaluation record names none.
pub const DEFAULT_DATASET: &str = "design2code";

/// Model and method placeholder used by results reports.
const UNKNOWN_LOWER: &str = "unknown";

/// Metadata section of a results report; absent values read `"Unknown"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataSummary {
    pub model_name: String,
    pub provider: String,
    pub method_name: String,
    pub tags: Vec<String>,
    pub organization: String,
}

impl MetadataSummary {
    pub fn from_metadata(meta: &SubmissionMetadata) -> Self {
        let or_unknown = |v: &Option<String>| v.clone().unwrap_or_else(|| UNKNOWN.to_string());
        Self {
            model_name: or_unknown(&meta.model_name),
            provider: or_unknown(&meta.provider),
            method_name: or_unknown(&meta.method_name),
            tags: meta.tags.clone(),
            organization: or_unknown(&meta.organization),
        }
    }
}

/// Detailed results for one submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionResults {
    pub submission: String,
    pub model: String,
    pub method: String,
    pub dataset: String,
    pub timestamp: String,
    /// Recognized metrics the record carries, in canonical metric order.
    pub metrics: BTreeMap<MetricKind, MetricSummary>,
    pub overall_score: f64,
    pub instance_stats: InstanceStats,
    pub metadata: MetadataSummary,
}

impl SubmissionResults {
    /// Build the report for an aggregated submission and its raw record.
    /// `now` stamps records that carry no timestamp of their own.
    pub fn build(sub: &Submission, record: &EvaluationRecord, now: DateTime<Utc>) -> Self {
        let metrics = MetricKind::ALL
            .into_iter()
            .filter_map(|m| {
                record
                    .metrics
                    .get(m.key())
                    .map(|r| (m, MetricSummary::from_result(r)))
            })
            .collect();

        Self {
            submission: sub.id.to_string(),
            model: record.model.clone().unwrap_or_else(|| UNKNOWN_LOWER.to_string()),
            method: record.method.clone().unwrap_or_else(|| UNKNOWN_LOWER.to_string()),
            dataset: record
                .dataset
                .clone()
                .unwrap_or_else(|| DEFAULT_DATASET.to_string()),
            timestamp: record
                .timestamp
                .clone()
                .unwrap_or_else(|| now.to_rfc3339_opts(SecondsFormat::Micros, true)),
            metrics,
            overall_score: sub.overall,
            instance_stats: sub.stats.clone(),
            metadata: MetadataSummary::from_metadata(&sub.metadata),
        }
    }
}

/// Build, persist and return the results of one submission directory.
pub fn process_submission_dir(dir: &Path, now: DateTime<Utc>) -> Result<SubmissionResults> {
    let loaded = read_submission_dir(dir)?;
    let dataset = loaded
        .evaluation
        .dataset
        .clone()
        .unwrap_or_else(|| DEFAULT_DATASET.to_string());
    let sub = Submission::build(loaded.id, &dataset, &loaded.evaluation, loaded.metadata);
    let results = SubmissionResults::build(&sub, &loaded.evaluation, now);
    write_submission_results(dir, &results)?;
    Ok(results)
}

/// Outcome of [`process_all`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub dataset: String,
    pub processed: Vec<SubmissionResults>,
    pub failed: Vec<SkippedSubmission>,
}

impl BatchReport {
    pub fn attempted(&self) -> usize {
        self.processed.len() + self.failed.len()
    }
}

/// Build and persist results for every submission of `dataset`.
///
/// Directories without an evaluation record are not attempted. A failing
/// submission is recorded and the batch carries on.
pub fn process_all(
    source: &FsRecordSource,
    dataset: &str,
    now: DateTime<Utc>,
) -> Result<BatchReport> {
    let _span = DatasetSpan::enter(dataset);
    let mut report = BatchReport {
        dataset: dataset.to_string(),
        ..BatchReport::default()
    };

    for id in source.submission_ids(dataset)? {
        let dir = source.submission_dir(dataset, &id);
        match process_submission_dir(&dir, now) {
            Ok(results) => {
                METRICS.inc_submissions_loaded();
                report.processed.push(results);
            }
            Err(e) if e.is_missing_record() => {
                debug!(submission_id = %id, "no evaluation record, not processed");
            }
            Err(e) => {
                METRICS.inc_submissions_skipped();
                emit_submission_skipped(id.as_str(), &e);
                report.failed.push(SkippedSubmission {
                    id,
                    reason: e.to_string(),
                });
            }
        }
    }
    Ok(report)
}
