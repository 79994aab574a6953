//! Record sources: where evaluation and metadata records come from.
//!
//! [`RecordSource`] is the seam between the aggregation engine and storage.
//! [`fs::FsRecordSource`] reads the on-disk evaluation tree and
//! [`memory::MemoryRecordSource`] backs tests and embedders.

pub mod fs;
pub mod memory;

use crate::domain::{EvaluationRecord, Result, SubmissionId, SubmissionMetadata};

/// Provider of per-submission records keyed by dataset and submission id.
pub trait RecordSource: Send + Sync {
    /// Names of the available datasets.
    fn datasets(&self) -> Result<Vec<String>>;

    /// Candidate submission ids of `dataset`, ascending. Fails with
    /// `DatasetNotFound` when the dataset does not exist.
    fn submission_ids(&self, dataset: &str) -> Result<Vec<SubmissionId>>;

    /// The evaluation record, or `MissingRecord` when there is none.
    fn load_evaluation(&self, dataset: &str, id: &SubmissionId) -> Result<EvaluationRecord>;

    /// Metadata, if the submission ships any.
    fn load_metadata(&self, dataset: &str, id: &SubmissionId) -> Result<Option<SubmissionMetadata>>;

    /// Previously generated results document, if stored.
    fn load_results(
        &self,
        _dataset: &str,
        _id: &SubmissionId,
    ) -> Result<Option<serde_json::Value>> {
        Ok(None)
    }

    /// Free-form README shipped with the submission, if any.
    fn load_readme(&self, _dataset: &str, _id: &SubmissionId) -> Result<Option<String>> {
        Ok(None)
    }
}

pub use fs::{read_submission_dir, FsRecordSource, LoadedRecord};
pub use memory::MemoryRecordSource;
