//! Filesystem record source over the `<root>/<dataset>/<submission>/` tree.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::RecordSource;
use crate::domain::{EvalboardError, EvaluationRecord, Result, SubmissionId, SubmissionMetadata};

pub const EVALUATION_FILE: &str = "evaluation.json";
/// Metadata file names in lookup order; the first one found wins.
pub const METADATA_FILES: [&str; 2] = ["metadata.yaml", "metadata.yml"];
pub const RESULTS_DIR: &str = "results";
pub const RESULTS_FILE: &str = "results.json";
pub const METRICS_BREAKDOWN_FILE: &str = "metrics_breakdown.json";
pub const README_FILE: &str = "README.md";

/// Filesystem-backed record source.
///
/// Layout: `<root>/<dataset>/<submission_id>/evaluation.json` with optional
/// `metadata.yaml` (or `.yml`), `results/results.json` and `README.md`
/// alongside.
#[derive(Debug, Clone)]
pub struct FsRecordSource {
    root: PathBuf,
}

/// Records read straight from one submission directory.
#[derive(Debug, Clone)]
pub struct LoadedRecord {
    pub id: SubmissionId,
    pub evaluation: EvaluationRecord,
    pub metadata: Option<SubmissionMetadata>,
}

impl FsRecordSource {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn dataset_dir(&self, dataset: &str) -> PathBuf {
        self.root.join(dataset)
    }

    pub fn submission_dir(&self, dataset: &str, id: &SubmissionId) -> PathBuf {
        self.dataset_dir(dataset).join(id.as_str())
    }
}

/// Sorted names of the subdirectories of `dir`.
fn subdirectories(dir: &Path) -> std::io::Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.path().is_dir() {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => names.push(name),
            Err(raw) => debug!(name = ?raw, "skipping non-UTF-8 directory name"),
        }
    }
    names.sort();
    Ok(names)
}

/// Read `path`, mapping a missing file to `None`.
fn read_optional(path: &Path, id: &SubmissionId) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(source) => Err(EvalboardError::UnreadableRecord {
            submission_id: id.to_string(),
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn evaluation_from_dir(dir: &Path, id: &SubmissionId) -> Result<EvaluationRecord> {
    let raw = read_optional(&dir.join(EVALUATION_FILE), id)?
        .ok_or_else(|| EvalboardError::missing(id.as_str()))?;
    EvaluationRecord::from_json(id.as_str(), &raw)
}

fn metadata_from_dir(dir: &Path, id: &SubmissionId) -> Result<Option<SubmissionMetadata>> {
    for name in METADATA_FILES {
        if let Some(raw) = read_optional(&dir.join(name), id)? {
            return SubmissionMetadata::from_yaml(id.as_str(), &raw).map(Some);
        }
    }
    Ok(None)
}

/// Load a single submission directory; its name is the submission id.
pub fn read_submission_dir(dir: &Path) -> Result<LoadedRecord> {
    let name = dir
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    let id = SubmissionId::new(name);
    if !dir.is_dir() {
        return Err(EvalboardError::missing(id.as_str()));
    }
    Ok(LoadedRecord {
        evaluation: evaluation_from_dir(dir, &id)?,
        metadata: metadata_from_dir(dir, &id)?,
        id,
    })
}

impl RecordSource for FsRecordSource {
    fn datasets(&self) -> Result<Vec<String>> {
        match subdirectories(&self.root) {
            Ok(names) => Ok(names),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn submission_ids(&self, dataset: &str) -> Result<Vec<SubmissionId>> {
        match subdirectories(&self.dataset_dir(dataset)) {
            Ok(names) => Ok(names.into_iter().map(SubmissionId::new).collect()),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(EvalboardError::DatasetNotFound {
                dataset: dataset.to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    fn load_evaluation(&self, dataset: &str, id: &SubmissionId) -> Result<EvaluationRecord> {
        evaluation_from_dir(&self.submission_dir(dataset, id), id)
    }

    fn load_metadata(
        &self,
        dataset: &str,
        id: &SubmissionId,
    ) -> Result<Option<SubmissionMetadata>> {
        metadata_from_dir(&self.submission_dir(dataset, id), id)
    }

    fn load_results(&self, dataset: &str, id: &SubmissionId) -> Result<Option<serde_json::Value>> {
        let path = self
            .submission_dir(dataset, id)
            .join(RESULTS_DIR)
            .join(RESULTS_FILE);
        read_optional(&path, id)?
            .map(|raw| {
                serde_json::from_str(&raw).map_err(|e| EvalboardError::malformed(id.as_str(), e))
            })
            .transpose()
    }

    fn load_readme(&self, dataset: &str, id: &SubmissionId) -> Result<Option<String>> {
        read_optional(&self.submission_dir(dataset, id).join(README_FILE), id)
    }
}
