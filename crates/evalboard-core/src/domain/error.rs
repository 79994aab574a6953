//! Domain-level error taxonomy for evalboard.

/// Evalboard domain errors.
///
/// Per-submission variants always carry the offending submission id so batch
/// drivers can report which record was skipped.
#[derive(Debug, thiserror::Error)]
pub enum EvalboardError {
    #[error("no evaluation record for submission {submission_id}")]
    MissingRecord { submission_id: String },

    #[error("malformed record for submission {submission_id}: {reason}")]
    MalformedRecord {
        submission_id: String,
        reason: String,
    },

    #[error("cannot read {} for submission {}: {}", .path.display(), .submission_id, .source)]
    UnreadableRecord {
        submission_id: String,
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("dataset not found: {dataset}")]
    DatasetNotFound { dataset: String },

    #[error("need at least {needed} submissions to compare, found {found}")]
    InsufficientSubmissions { needed: usize, found: usize },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl EvalboardError {
    pub fn missing(submission_id: impl Into<String>) -> Self {
        Self::MissingRecord {
            submission_id: submission_id.into(),
        }
    }

    pub fn malformed(submission_id: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::MalformedRecord {
            submission_id: submission_id.into(),
            reason: reason.to_string(),
        }
    }

    /// Submission id this error is about, when it concerns a single submission.
    pub fn submission_id(&self) -> Option<&str> {
        match self {
            Self::MissingRecord { submission_id }
            | Self::MalformedRecord { submission_id, .. }
            | Self::UnreadableRecord { submission_id, .. } => Some(submission_id),
            _ => None,
        }
    }

    pub fn is_missing_record(&self) -> bool {
        matches!(self, Self::MissingRecord { .. })
    }
}

/// Result type for evalboard operations.
pub type Result<T> = std::result::Result<T, EvalboardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_record_names_submission() {
        let err = EvalboardError::missing("20250101_gpt4o_direct");
        assert!(err.to_string().contains("20250101_gpt4o_direct"));
        assert!(err.is_missing_record());
        assert_eq!(err.submission_id(), Some("20250101_gpt4o_direct"));
    }

    #[test]
    fn test_malformed_record_display() {
        let err = EvalboardError::malformed("20250102_x", "expected a number");
        let msg = err.to_string();
        assert!(msg.contains("malformed record"));
        assert!(msg.contains("20250102_x"));
        assert!(msg.contains("expected a number"));
        assert!(!err.is_missing_record());
    }

    #[test]
    fn test_dataset_error_has_no_submission() {
        let err = EvalboardError::DatasetNotFound {
            dataset: "design2code".to_string(),
        };
        assert!(err.to_string().contains("design2code"));
        assert_eq!(err.submission_id(), None);
    }
}
