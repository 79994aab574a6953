//! Evalboard Core Library
//!
//! Aggregates per-submission benchmark evaluations into ranked leaderboards,
//! results reports and comparisons, and serves cached, filterable views of
//! them.

pub mod aggregate;
pub mod cache;
pub mod compare;
pub mod config;
pub mod domain;
pub mod loader;
pub mod metrics;
pub mod obs;
pub mod ranking;
pub mod reporting;
pub mod results;
pub mod scoring;
pub mod search;
pub mod service;
pub mod stats;
pub mod telemetry;

pub use domain::{
    format_date, EvalboardError, EvaluationRecord, InstanceOutcome, MetricKind, MetricResult,
    Result, Submission, SubmissionId, SubmissionMetadata, UNKNOWN,
};

pub use aggregate::{
    collect_submissions, generate_leaderboard, load_submission, SkippedSubmission,
    SubmissionBatch,
};
pub use cache::{Clock, ManualClock, SystemClock, TtlCache, DEFAULT_TTL};
pub use compare::{compare_ids, comparison_cache_key, Comparison, MetricsComparison};
pub use config::EvalboardConfig;
pub use loader::{read_submission_dir, FsRecordSource, MemoryRecordSource, RecordSource};
pub use ranking::{format_percentage, rank_order, rank_submissions, Leaderboard, LeaderboardEntry};
pub use reporting::{
    render_comparison, render_leaderboard, render_results, render_submissions,
    write_leaderboard_json, write_submission_results,
};
pub use results::{process_all, process_submission_dir, BatchReport, SubmissionResults};
pub use scoring::{overall_score, MetricSummary, MetricWeights};
pub use search::{filter_submissions, SubmissionFilter};
pub use service::{LeaderboardService, SubmissionDetails};
pub use stats::InstanceStats;
pub use telemetry::init_tracing;
