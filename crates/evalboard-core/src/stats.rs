//! Instance-level resolve and error statistics.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::InstanceOutcome;

/// Resolve counts and error histogram over a submission's instances.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstanceStats {
    pub total: usize,
    pub resolved: usize,
    pub failed: usize,
    pub resolve_rate: f64,
    pub error_breakdown: BTreeMap<String, usize>,
}

impl InstanceStats {
    /// Derive statistics from per-instance outcomes.
    ///
    /// Every non-empty `error` is counted, including errors reported on
    /// instances that are marked resolved.
    pub fn from_outcomes(outcomes: &BTreeMap<String, InstanceOutcome>) -> Self {
        let total = outcomes.len();
        let resolved = outcomes.values().filter(|o| o.resolved).count();
        let failed = total - resolved;
        let resolve_rate = if total == 0 {
            0.0
        } else {
            resolved as f64 / total as f64
        };

        let mut error_breakdown = BTreeMap::new();
        for error in outcomes.values().filter_map(|o| o.error.as_deref()) {
            if !error.is_empty() {
                *error_breakdown.entry(error.to_string()).or_insert(0) += 1;
            }
        }

        Self {
            total,
            resolved,
            failed,
            resolve_rate,
            error_breakdown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcomes(items: Vec<(&str, InstanceOutcome)>) -> BTreeMap<String, InstanceOutcome> {
        items.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
    }

    #[test]
    fn test_mixed_outcomes() {
        let stats = InstanceStats::from_outcomes(&outcomes(vec![
            ("i1", InstanceOutcome::resolved()),
            ("i2", InstanceOutcome::failed("timeout")),
            ("i3", InstanceOutcome::failed("timeout")),
        ]));
        assert_eq!(stats.total, 3);
        assert_eq!(stats.resolved, 1);
        assert_eq!(stats.failed, 2);
        assert!((stats.resolve_rate - 1.0 / 3.0).abs() < 1e-9);
        assert_eq!(stats.error_breakdown.len(), 1);
        assert_eq!(stats.error_breakdown["timeout"], 2);
    }

    #[test]
    fn test_empty_outcomes_zero_rate() {
        let stats = InstanceStats::from_outcomes(&BTreeMap::new());
        assert_eq!(stats, InstanceStats::default());
        assert_eq!(stats.resolve_rate, 0.0);
    }

    #[test]
    fn test_error_on_resolved_instance_is_counted() {
        let partial = InstanceOutcome {
            resolved: true,
            error: Some("render_warning".to_string()),
        };
        let stats = InstanceStats::from_outcomes(&outcomes(vec![("i1", partial)]));
        assert_eq!(stats.resolved, 1);
        assert_eq!(stats.failed, 0);
        assert_eq!(stats.error_breakdown["render_warning"], 1);
    }

    #[test]
    fn test_empty_error_string_is_ignored() {
        let stats = InstanceStats::from_outcomes(&outcomes(vec![
            ("i1", InstanceOutcome::failed("")),
            ("i2", InstanceOutcome::failed("crash")),
        ]));
        assert_eq!(stats.failed, 2);
        assert_eq!(stats.error_breakdown.len(), 1);
        assert_eq!(stats.error_breakdown["crash"], 1);
    }
}
