//! Raw evaluation records produced by the upstream evaluator.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::error::{EvalboardError, Result};
use super::metric::{MetricKind, MetricResult};

/// Outcome of a single benchmark instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstanceOutcome {
    #[serde(default)]
    pub resolved: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl InstanceOutcome {
    pub fn resolved() -> Self {
        Self {
            resolved: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            resolved: false,
            error: Some(error.into()),
        }
    }
}

/// One submission's `evaluation.json`.
///
/// Every field is optional on the wire; a field with the wrong JSON type is a
/// malformed record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset: Option<String>,

    /// ISO-8601 timestamp, kept verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,

    #[serde(default)]
    pub metrics: BTreeMap<String, MetricResult>,

    #[serde(default)]
    pub instance_results: BTreeMap<String, InstanceOutcome>,
}

impl EvaluationRecord {
    /// Parse an evaluation record, attributing failures to `submission_id`.
    pub fn from_json(submission_id: &str, raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| EvalboardError::malformed(submission_id, e))
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn with_metric(mut self, metric: MetricKind, result: MetricResult) -> Self {
        self.metrics.insert(metric.key().to_string(), result);
        self
    }

    pub fn with_instance(
        mut self,
        instance_id: impl Into<String>,
        outcome: InstanceOutcome,
    ) -> Self {
        self.instance_results.insert(instance_id.into(), outcome);
        self
    }

    /// Average of a recognized metric, if the record carries one.
    pub fn average(&self, metric: MetricKind) -> Option<f64> {
        self.metrics.get(metric.key()).and_then(|m| m.average)
    }
}
