//! Optional submission metadata (`metadata.yaml`).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::{EvalboardError, Result};

/// Text form of a scalar: strings verbatim, numbers and booleans printed.
/// Null, sequences and mappings have none.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn text_at(document: &Value, pointer: &str) -> Option<String> {
    document.pointer(pointer).and_then(scalar_text)
}

/// `tags` as text. A lone scalar counts as a single tag; anything that is
/// not a scalar is dropped.
fn tags_of(document: &Value) -> Vec<String> {
    match document.get("tags") {
        Some(Value::Array(items)) => items.iter().filter_map(scalar_text).collect(),
        Some(other) => scalar_text(other).into_iter().collect(),
        None => Vec::new(),
    }
}

/// Enrichment for a submission. Every field is optional; absence never fails
/// aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionMetadata {
    pub model_name: Option<String>,
    pub provider: Option<String>,
    pub method_name: Option<String>,
    pub organization: Option<String>,
    pub tags: Vec<String>,
    /// The full metadata document, searched by free-text queries.
    pub document: Value,
}

impl Default for SubmissionMetadata {
    fn default() -> Self {
        Self {
            model_name: None,
            provider: None,
            method_name: None,
            organization: None,
            tags: Vec::new(),
            document: Value::Object(serde_json::Map::new()),
        }
    }
}

impl SubmissionMetadata {
    /// Parse a YAML metadata document, attributing failures to `submission_id`.
    ///
    /// Only YAML that does not parse is an error. An empty document yields
    /// default metadata, and fields of an unexpected shape are left unset.
    pub fn from_yaml(submission_id: &str, raw: &str) -> Result<Self> {
        let yaml: serde_yaml::Value =
            serde_yaml::from_str(raw).map_err(|e| EvalboardError::malformed(submission_id, e))?;
        if yaml.is_null() {
            return Ok(Self::default());
        }
        let document =
            serde_json::to_value(&yaml).map_err(|e| EvalboardError::malformed(submission_id, e))?;
        Ok(Self::from_document(document))
    }

    /// Build metadata from an already-parsed document. Numeric and boolean
    /// names and tags are kept as their text.
    pub fn from_document(document: Value) -> Self {
        Self {
            model_name: text_at(&document, "/model/name"),
            provider: text_at(&document, "/model/provider"),
            method_name: text_at(&document, "/method/name"),
            organization: text_at(&document, "/submission/organization"),
            tags: tags_of(&document),
            document,
        }
    }

    /// Case-insensitive tag membership.
    pub fn has_tag(&self, tag: &str) -> bool {
        let tag = tag.to_lowercase();
        self.tags.iter().any(|t| t.to_lowercase() == tag)
    }
}
