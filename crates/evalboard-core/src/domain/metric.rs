//! The fixed benchmark metric set and per-metric results.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the five recognized benchmark metrics.
///
/// Declaration order is the canonical display order (CLIP, SSIM, Text,
/// Position, IR).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    Clip,
    Ssim,
    TextSimilarity,
    PositionAccuracy,
    ImageReproduction,
}

impl MetricKind {
    pub const ALL: [MetricKind; 5] = [
        MetricKind::Clip,
        MetricKind::Ssim,
        MetricKind::TextSimilarity,
        MetricKind::PositionAccuracy,
        MetricKind::ImageReproduction,
    ];

    /// Key used in evaluation records.
    pub fn key(self) -> &'static str {
        match self {
            Self::Clip => "clip",
            Self::Ssim => "ssim",
            Self::TextSimilarity => "text_similarity",
            Self::PositionAccuracy => "position_accuracy",
            Self::ImageReproduction => "image_reproduction",
        }
    }

    /// Column header shown on the leaderboard.
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Clip => "CLIP",
            Self::Ssim => "SSIM",
            Self::TextSimilarity => "Text",
            Self::PositionAccuracy => "Position",
            Self::ImageReproduction => "IR",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.key() == key)
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One metric's outcome for a submission, as written by the upstream evaluator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricResult {
    /// Mean over `scores`. The metric only counts as present when this is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average: Option<f64>,

    /// Per-instance scores keyed by instance id.
    #[serde(default)]
    pub scores: BTreeMap<String, f64>,
}

impl MetricResult {
    pub fn with_average(average: f64) -> Self {
        Self {
            average: Some(average),
            scores: BTreeMap::new(),
        }
    }

    pub fn with_score(mut self, instance_id: impl Into<String>, score: f64) -> Self {
        self.scores.insert(instance_id.into(), score);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_keys_roundtrip() {
        for metric in MetricKind::ALL {
            assert_eq!(MetricKind::from_key(metric.key()), Some(metric));
        }
        assert_eq!(MetricKind::from_key("bleu"), None);
    }

    #[test]
    fn test_display_order_is_canonical() {
        let names: Vec<&str> = MetricKind::ALL.iter().map(|m| m.display_name()).collect();
        assert_eq!(names, vec!["CLIP", "SSIM", "Text", "Position", "IR"]);
    }

    #[test]
    fn test_metric_result_parses_without_average() {
        let parsed: MetricResult =
            serde_json::from_str(r#"{"scores": {"1": 0.5, "2": 0.7}}"#).expect("parse");
        assert_eq!(parsed.average, None);
        assert_eq!(parsed.scores.len(), 2);
    }

    #[test]
    fn test_metric_result_rejects_non_numeric_average() {
        let parsed = serde_json::from_str::<MetricResult>(r#"{"average": "high"}"#);
        assert!(parsed.is_err());
    }
}
