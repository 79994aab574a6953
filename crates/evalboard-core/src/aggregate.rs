//! Batch aggregation over a record source.
//!
//! A batch never aborts on a single bad submission: submissions without an
//! evaluation record are skipped quietly, every other per-submission failure
//! is recorded in [`SubmissionBatch::skipped`] and logged. Only a missing
//! dataset fails the whole batch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{Result, Submission, SubmissionId};
use crate::loader::RecordSource;
use crate::metrics::METRICS;
use crate::obs::{emit_leaderboard_built, emit_submission_skipped, DatasetSpan};
use crate::ranking::Leaderboard;

/// A submission excluded from a batch, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedSubmission {
    pub id: SubmissionId,
    pub reason: String,
}

/// Outcome of aggregating every submission of a dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubmissionBatch {
    pub dataset: String,
    /// Aggregated submissions, ascending by id.
    pub submissions: Vec<Submission>,
    pub skipped: Vec<SkippedSubmission>,
}

impl SubmissionBatch {
    pub fn is_empty(&self) -> bool {
        self.submissions.is_empty()
    }
}

/// Load and aggregate a single submission.
pub fn load_submission<S>(source: &S, dataset: &str, id: &SubmissionId) -> Result<Submission>
where
    S: RecordSource + ?Sized,
{
    let record = source.load_evaluation(dataset, id)?;
    let metadata = source.load_metadata(dataset, id)?;
    Ok(Submission::build(id.clone(), dataset, &record, metadata))
}

/// Aggregate every submission of `dataset`.
pub fn collect_submissions<S>(source: &S, dataset: &str) -> Result<SubmissionBatch>
where
    S: RecordSource + ?Sized,
{
    let _span = DatasetSpan::enter(dataset);
    let ids = source.submission_ids(dataset)?;

    let mut batch = SubmissionBatch {
        dataset: dataset.to_string(),
        ..SubmissionBatch::default()
    };
    for id in ids {
        match load_submission(source, dataset, &id) {
            Ok(sub) => {
                METRICS.inc_submissions_loaded();
                batch.submissions.push(sub);
            }
            Err(e) if e.is_missing_record() => {
                debug!(submission_id = %id, "no evaluation record, skipping");
            }
            Err(e) => {
                METRICS.inc_submissions_skipped();
                emit_submission_skipped(id.as_str(), &e);
                batch.skipped.push(SkippedSubmission {
                    id,
                    reason: e.to_string(),
                });
            }
        }
    }
    Ok(batch)
}

/// Aggregate and rank `dataset` into a leaderboard stamped with `now`.
pub fn generate_leaderboard<S>(source: &S, dataset: &str, now: DateTime<Utc>) -> Result<Leaderboard>
where
    S: RecordSource + ?Sized,
{
    let batch = collect_submissions(source, dataset)?;
    let board = Leaderboard::from_submissions(dataset, &batch.submissions, now);
    emit_leaderboard_built(dataset, board.total_submissions, batch.skipped.len());
    Ok(board)
}
