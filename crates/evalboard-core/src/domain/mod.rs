//! Domain models for evalboard.
//!
//! Canonical definitions for the core entities:
//! - `EvaluationRecord`: raw per-submission evaluator output
//! - `SubmissionMetadata`: optional model/method/organization enrichment
//! - `Submission`: the aggregated, immutable working entity
//! - `MetricKind`: the fixed benchmark metric set

pub mod error;
pub mod metadata;
pub mod metric;
pub mod record;
pub mod submission;

pub use error::{EvalboardError, Result};
pub use metadata::SubmissionMetadata;
pub use metric::{MetricKind, MetricResult};
pub use record::{EvaluationRecord, InstanceOutcome};
pub use submission::{format_date, Submission, SubmissionId, UNKNOWN};
