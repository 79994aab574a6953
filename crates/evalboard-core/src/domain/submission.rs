//! The aggregated submission entity.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::metadata::SubmissionMetadata;
use super::metric::MetricKind;
use super::record::EvaluationRecord;
use crate::scoring::{present_averages, MetricWeights};
use crate::stats::InstanceStats;

/// Placeholder used wherever a name or date is unavailable.
pub const UNKNOWN: &str = "Unknown";

/// Storage key of a submission, e.g. `20251229_gpt4o_direct`.
///
/// Ordering is lexicographic on the key; by convention the first
/// `_`-delimited token is a `YYYYMMDD` date.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmissionId(String);

impl SubmissionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Date encoded in the leading token, if it parses as `YYYYMMDD`.
    pub fn date(&self) -> Option<NaiveDate> {
        let token = self.0.split('_').next()?;
        NaiveDate::parse_from_str(token, "%Y%m%d").ok()
    }

    /// `YYYY-MM-DD`, or `"Unknown"` when the key carries no parseable date.
    pub fn date_label(&self) -> String {
        format_date(self.date())
    }
}

impl fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SubmissionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

pub fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

/// Uppercase the first character and lowercase the rest.
pub(crate) fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// One submission, aggregated from its evaluation record and optional
/// metadata. Built fresh on every aggregation pass and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub id: SubmissionId,
    pub dataset: String,
    /// Display model name: metadata `model.name`, else the record's `model`.
    pub model_name: String,
    /// Display method name: metadata `method.name`, else the record's `method`.
    pub method_name: String,
    /// The evaluation record's own `model`, `"Unknown"` when absent. Search
    /// matches against this rather than the display name.
    pub record_model: String,
    pub record_method: String,
    /// `"{model} ({Method})"`.
    pub display_name: String,
    /// `submission.organization`, else `model.provider`, else `"Unknown"`.
    pub organization: String,
    pub tags: Vec<String>,
    pub date: Option<NaiveDate>,
    /// Averages of the recognized metrics the record carries.
    pub metrics: BTreeMap<MetricKind, f64>,
    pub overall: f64,
    pub stats: InstanceStats,
    pub metadata: SubmissionMetadata,
}

impl Submission {
    /// Aggregate a record under the standard metric weights.
    pub fn build(
        id: SubmissionId,
        dataset: &str,
        record: &EvaluationRecord,
        metadata: Option<SubmissionMetadata>,
    ) -> Self {
        Self::build_weighted(id, dataset, record, metadata, &MetricWeights::standard())
    }

    pub fn build_weighted(
        id: SubmissionId,
        dataset: &str,
        record: &EvaluationRecord,
        metadata: Option<SubmissionMetadata>,
        weights: &MetricWeights,
    ) -> Self {
        let metadata = metadata.unwrap_or_default();
        let record_model = record.model.clone().unwrap_or_else(|| UNKNOWN.to_string());
        let record_method = record.method.clone().unwrap_or_else(|| UNKNOWN.to_string());

        let model_name = metadata
            .model_name
            .clone()
            .unwrap_or_else(|| record_model.clone());
        let method_name = metadata
            .method_name
            .clone()
            .unwrap_or_else(|| record_method.clone());
        let display_name = format!("{} ({})", model_name, capitalize(&method_name));
        let organization = metadata
            .organization
            .clone()
            .or_else(|| metadata.provider.clone())
            .unwrap_or_else(|| UNKNOWN.to_string());

        let metrics = present_averages(&record.metrics);
        let overall = weights.overall_from_averages(&metrics);

        Self {
            date: id.date(),
            id,
            dataset: dataset.to_string(),
            model_name,
            method_name,
            record_model,
            record_method,
            display_name,
            organization,
            tags: metadata.tags.clone(),
            metrics,
            overall,
            stats: InstanceStats::from_outcomes(&record.instance_results),
            metadata,
        }
    }

    /// Average for `metric`, `0.0` when the record does not carry it.
    pub fn metric_or_zero(&self, metric: MetricKind) -> f64 {
        self.metrics.get(&metric).copied().unwrap_or(0.0)
    }

    pub fn date_label(&self) -> String {
        format_date(self.date)
    }
}
