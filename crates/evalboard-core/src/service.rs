//! Cached read facade over a record source.
//!
//! The service owns its caches; build one per process (or per test) and share
//! it behind an `Arc`. Listing, leaderboard and comparison views are cached
//! for the configured TTL. Details and search read through.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::aggregate::{collect_submissions, generate_leaderboard};
use crate::cache::{Clock, SystemClock, TtlCache};
use crate::compare::{comparison_cache_key, MetricsComparison};
use crate::config::EvalboardConfig;
use crate::domain::{EvalboardError, EvaluationRecord, Result, Submission, SubmissionId};
use crate::loader::{FsRecordSource, RecordSource};
use crate::ranking::Leaderboard;
use crate::search::{filter_submissions, SubmissionFilter};

/// Everything stored for one submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionDetails {
    pub id: SubmissionId,
    pub dataset: String,
    pub evaluation: EvaluationRecord,
    /// The raw metadata document, when the submission ships one.
    pub metadata: Option<serde_json::Value>,
    pub results: Option<serde_json::Value>,
    pub readme: Option<String>,
}

pub struct LeaderboardService<S: RecordSource> {
    source: S,
    leaderboard_dir: Option<PathBuf>,
    clock: Arc<dyn Clock>,
    submissions: TtlCache<Arc<Vec<Submission>>>,
    leaderboards: TtlCache<Arc<Leaderboard>>,
    comparisons: TtlCache<Arc<MetricsComparison>>,
}

impl LeaderboardService<FsRecordSource> {
    /// Service over the on-disk evaluation tree described by `config`, with
    /// pre-generated leaderboards looked up in its data directory.
    pub fn from_config(config: &EvalboardConfig) -> Self {
        Self::with_clock(
            FsRecordSource::new(&config.evaluation_dir),
            config.cache_ttl,
            Arc::new(SystemClock),
        )
        .with_leaderboard_dir(&config.data_dir)
    }
}

impl<S: RecordSource> LeaderboardService<S> {
    pub fn new(source: S, ttl: Duration) -> Self {
        Self::with_clock(source, ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(source: S, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            source,
            leaderboard_dir: None,
            submissions: TtlCache::with_clock(ttl, clock.clone()),
            leaderboards: TtlCache::with_clock(ttl, clock.clone()),
            comparisons: TtlCache::with_clock(ttl, clock.clone()),
            clock,
        }
    }

    /// Serve `<dir>/<dataset>-leaderboard.json` when present instead of
    /// ranking on the fly.
    pub fn with_leaderboard_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.leaderboard_dir = Some(dir.into());
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Available datasets. Not cached.
    pub fn get_datasets(&self) -> Result<Vec<String>> {
        self.source.datasets()
    }

    /// Every loadable submission of `dataset`, newest id first. An unknown
    /// dataset lists as empty.
    pub fn get_submissions(&self, dataset: &str) -> Result<Arc<Vec<Submission>>> {
        let key = format!("submissions:{dataset}");
        self.submissions.get_or_try_insert_with(&key, || {
            let mut subs = match collect_submissions(&self.source, dataset) {
                Ok(batch) => batch.submissions,
                Err(EvalboardError::DatasetNotFound { .. }) => Vec::new(),
                Err(e) => return Err(e),
            };
            subs.reverse();
            Ok(Arc::new(subs))
        })
    }

    /// Leaderboard for `dataset`: the pre-generated document if one exists,
    /// otherwise ranked from the records.
    pub fn get_leaderboard(&self, dataset: &str) -> Result<Arc<Leaderboard>> {
        let key = format!("leaderboard:{dataset}");
        self.leaderboards.get_or_try_insert_with(&key, || {
            if let Some(board) = self.pregenerated_leaderboard(dataset) {
                return Ok(Arc::new(board));
            }
            generate_leaderboard(&self.source, dataset, self.clock.now()).map(Arc::new)
        })
    }

    fn pregenerated_leaderboard(&self, dataset: &str) -> Option<Leaderboard> {
        let path = self
            .leaderboard_dir
            .as_ref()?
            .join(format!("{dataset}-leaderboard.json"));
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "no pre-generated leaderboard");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(board) => Some(board),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring unreadable leaderboard file");
                None
            }
        }
    }

    /// Evaluation record, metadata document, stored results and README of
    /// one submission. Not cached.
    pub fn get_submission_details(&self, dataset: &str, id: &str) -> Result<SubmissionDetails> {
        let id = SubmissionId::new(id);
        let evaluation = self.source.load_evaluation(dataset, &id)?;
        let metadata = self
            .source
            .load_metadata(dataset, &id)?
            .map(|m| m.document);
        Ok(SubmissionDetails {
            results: self.source.load_results(dataset, &id)?,
            readme: self.source.load_readme(dataset, &id)?,
            id,
            dataset: dataset.to_string(),
            evaluation,
            metadata,
        })
    }

    /// Metric averages of `ids`, cached per dataset and id set.
    pub fn get_metrics_comparison(
        &self,
        dataset: &str,
        ids: &[&str],
    ) -> Result<Arc<MetricsComparison>> {
        let ids: Vec<SubmissionId> = ids.iter().map(|id| SubmissionId::new(*id)).collect();
        let key = comparison_cache_key(dataset, &ids);
        self.comparisons.get_or_try_insert_with(&key, || {
            Ok::<_, EvalboardError>(Arc::new(MetricsComparison::build(&self.source, dataset, &ids)))
        })
    }

    /// Submissions of `dataset` matching `filter`, newest id first.
    pub fn search_submissions(
        &self,
        dataset: &str,
        filter: &SubmissionFilter,
    ) -> Result<Vec<Submission>> {
        let subs = self.get_submissions(dataset)?;
        Ok(filter_submissions(&subs, filter).into_iter().cloned().collect())
    }

    /// Drop the cached listing and leaderboard of `dataset`.
    pub fn invalidate(&self, dataset: &str) {
        self.submissions.invalidate(&format!("submissions:{dataset}"));
        self.leaderboards.invalidate(&format!("leaderboard:{dataset}"));
    }
}
