//! In-memory record source.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use super::RecordSource;
use crate::domain::{EvalboardError, EvaluationRecord, Result, SubmissionId, SubmissionMetadata};

#[derive(Debug, Clone)]
enum Entry {
    Present {
        record: EvaluationRecord,
        metadata: Option<SubmissionMetadata>,
    },
    /// Directory exists but holds no evaluation record.
    Missing,
    Malformed(String),
}

type Datasets = BTreeMap<String, BTreeMap<SubmissionId, Entry>>;

/// Record source backed by a map, mutable through `&self` so a running
/// service can observe new records.
#[derive(Debug, Default)]
pub struct MemoryRecordSource {
    datasets: RwLock<Datasets>,
}

impl MemoryRecordSource {
    pub fn new() -> Self {
        Self::default()
    }

    fn write(&self, dataset: &str, id: SubmissionId, entry: Entry) {
        let mut guard = self.datasets.write().unwrap_or_else(PoisonError::into_inner);
        guard.entry(dataset.to_string()).or_default().insert(id, entry);
    }

    /// Register an empty dataset.
    pub fn add_dataset(&self, dataset: &str) {
        let mut guard = self.datasets.write().unwrap_or_else(PoisonError::into_inner);
        guard.entry(dataset.to_string()).or_default();
    }

    /// Insert or replace a submission.
    pub fn insert(
        &self,
        dataset: &str,
        id: impl Into<String>,
        record: EvaluationRecord,
        metadata: Option<SubmissionMetadata>,
    ) {
        self.write(dataset, SubmissionId::new(id), Entry::Present { record, metadata });
    }

    /// Register a submission whose evaluation record is absent.
    pub fn insert_missing(&self, dataset: &str, id: impl Into<String>) {
        self.write(dataset, SubmissionId::new(id), Entry::Missing);
    }

    /// Register a submission whose evaluation record fails to parse.
    pub fn insert_malformed(
        &self,
        dataset: &str,
        id: impl Into<String>,
        reason: impl Into<String>,
    ) {
        self.write(dataset, SubmissionId::new(id), Entry::Malformed(reason.into()));
    }

    pub fn remove(&self, dataset: &str, id: &str) -> bool {
        let mut guard = self.datasets.write().unwrap_or_else(PoisonError::into_inner);
        guard
            .get_mut(dataset)
            .map(|subs| subs.remove(&SubmissionId::new(id)).is_some())
            .unwrap_or(false)
    }

    fn entry(&self, dataset: &str, id: &SubmissionId) -> Option<Entry> {
        let guard = self.datasets.read().unwrap_or_else(PoisonError::into_inner);
        guard.get(dataset).and_then(|subs| subs.get(id)).cloned()
    }
}

impl RecordSource for MemoryRecordSource {
    fn datasets(&self) -> Result<Vec<String>> {
        let guard = self.datasets.read().unwrap_or_else(PoisonError::into_inner);
        Ok(guard.keys().cloned().collect())
    }

    fn submission_ids(&self, dataset: &str) -> Result<Vec<SubmissionId>> {
        let guard = self.datasets.read().unwrap_or_else(PoisonError::into_inner);
        guard
            .get(dataset)
            .map(|subs| subs.keys().cloned().collect())
            .ok_or_else(|| EvalboardError::DatasetNotFound {
                dataset: dataset.to_string(),
            })
    }

    fn load_evaluation(&self, dataset: &str, id: &SubmissionId) -> Result<EvaluationRecord> {
        match self.entry(dataset, id) {
            Some(Entry::Present { record, .. }) => Ok(record),
            Some(Entry::Malformed(reason)) => Err(EvalboardError::malformed(id.as_str(), reason)),
            Some(Entry::Missing) | None => Err(EvalboardError::missing(id.as_str())),
        }
    }

    fn load_metadata(
        &self,
        dataset: &str,
        id: &SubmissionId,
    ) -> Result<Option<SubmissionMetadata>> {
        match self.entry(dataset, id) {
            Some(Entry::Present { metadata, .. }) => Ok(metadata),
            _ => Ok(None),
        }
    }
}
