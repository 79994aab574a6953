//! Leaderboard ranking.
//!
//! Submissions are first ordered by id ascending and then stable-sorted by
//! overall score descending, so equal scores keep id order: the
//! lexicographically earliest id (the earliest date prefix) ranks higher.
//! Ranks are positions `1..=N`; ties never share a rank.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{MetricKind, Submission};

/// Render a `[0, 1]` value as `"NN.NN%"`.
pub fn format_percentage(value: f64) -> String {
    format!("{:.2}%", value * 100.0)
}

/// One row of the leaderboard document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub model: String,
    pub clip: String,
    pub ssim: String,
    pub text: String,
    pub position: String,
    pub ir: String,
    pub overall: String,
    pub date: String,
    pub org: String,
    pub tags: Vec<String>,
}

impl LeaderboardEntry {
    fn project(rank: usize, sub: &Submission) -> Self {
        let pct = |m: MetricKind| format_percentage(sub.metric_or_zero(m));
        Self {
            rank,
            model: sub.display_name.clone(),
            clip: pct(MetricKind::Clip),
            ssim: pct(MetricKind::Ssim),
            text: pct(MetricKind::TextSimilarity),
            position: pct(MetricKind::PositionAccuracy),
            ir: pct(MetricKind::ImageReproduction),
            overall: format_percentage(sub.overall),
            date: sub.date_label(),
            org: sub.organization.clone(),
            tags: sub.tags.clone(),
        }
    }
}

/// The leaderboard document consumed by the website.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Leaderboard {
    pub name: String,
    /// ISO-8601 UTC timestamp.
    pub last_updated: String,
    pub total_submissions: usize,
    pub metrics: Vec<String>,
    pub results: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    pub fn new(
        name: impl Into<String>,
        results: Vec<LeaderboardEntry>,
        generated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            name: name.into(),
            last_updated: generated_at.to_rfc3339_opts(SecondsFormat::Micros, true),
            total_submissions: results.len(),
            metrics: MetricKind::ALL
                .iter()
                .map(|m| m.display_name().to_string())
                .collect(),
            results,
        }
    }

    /// Rank `submissions` and wrap them in a document named `name`.
    pub fn from_submissions(
        name: impl Into<String>,
        submissions: &[Submission],
        generated_at: DateTime<Utc>,
    ) -> Self {
        Self::new(name, rank_submissions(submissions), generated_at)
    }
}

/// Submissions in leaderboard order. The returned position plus one is the rank.
pub fn rank_order(submissions: &[Submission]) -> Vec<&Submission> {
    let mut ordered: Vec<&Submission> = submissions.iter().collect();
    ordered.sort_by(|a, b| a.id.cmp(&b.id));
    // Vec::sort_by is stable: equal scores keep ascending id order.
    ordered.sort_by(|a, b| b.overall.total_cmp(&a.overall));
    ordered
}

/// Rank submissions into leaderboard rows.
pub fn rank_submissions(submissions: &[Submission]) -> Vec<LeaderboardEntry> {
    rank_order(submissions)
        .into_iter()
        .enumerate()
        .map(|(idx, sub)| LeaderboardEntry::project(idx + 1, sub))
        .collect()
}
