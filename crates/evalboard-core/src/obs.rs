//! Structured observability hooks for aggregation passes.
//!
//! This module provides:
//! - Dataset-scoped tracing spans via the `DatasetSpan` RAII guard
//! - Emission functions for key events: skipped submissions, leaderboard
//!   builds, cache lookups, persisted results
//!
//! For JSON output, start the binary with `--json`.

use tracing::{debug, info, warn};

/// RAII guard that enters a dataset-scoped tracing span.
///
/// ```ignore
/// let _span = DatasetSpan::enter("design2code");
/// // every event below carries dataset = "design2code"
/// ```
pub struct DatasetSpan {
    _span: tracing::span::EnteredSpan,
}

impl DatasetSpan {
    pub fn enter(dataset: &str) -> Self {
        let span = tracing::info_span!("evalboard.dataset", dataset = %dataset);
        Self {
            _span: span.entered(),
        }
    }
}

/// Emit event: a submission was excluded from the current pass.
pub fn emit_submission_skipped(submission_id: &str, error: &dyn std::fmt::Display) {
    warn!(event = "submission.skipped", submission_id = %submission_id, error = %error);
}

/// Emit event: leaderboard ranked with the number of entries and skips.
pub fn emit_leaderboard_built(dataset: &str, total_submissions: usize, skipped: usize) {
    info!(
        event = "leaderboard.built",
        dataset = %dataset,
        total_submissions = total_submissions,
        skipped = skipped
    );
}

/// Emit event: cache lookup outcome (debug level).
pub fn emit_cache_lookup(key: &str, hit: bool) {
    debug!(event = "cache.lookup", key = %key, hit = hit);
}

/// Emit event: results artifacts written for a submission.
pub fn emit_results_written(submission_id: &str, path: &std::path::Path) {
    info!(event = "results.written", submission_id = %submission_id, path = %path.display());
}
