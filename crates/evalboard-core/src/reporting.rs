//! Persisted artifacts and console renderings.
//!
//! JSON artifacts are written atomically: a temp file is created next to the
//! target and renamed over it, so readers never observe a half-written
//! document.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tempfile::NamedTempFile;

use crate::compare::Comparison;
use crate::domain::{Result, Submission};
use crate::loader::fs::{METRICS_BREAKDOWN_FILE, RESULTS_DIR, RESULTS_FILE};
use crate::obs::emit_results_written;
use crate::ranking::{format_percentage, Leaderboard};
use crate::results::SubmissionResults;

const RULE_WIDTH: usize = 80;
const SECTION_RULE_WIDTH: usize = 50;
const MODEL_COLUMN: usize = 35;

/// Serialize `value` as pretty JSON and atomically replace `path` with it.
/// Parent directories are created as needed.
pub fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&parent)?;

    let mut content = serde_json::to_vec_pretty(value)?;
    content.push(b'\n');

    let mut tmp = NamedTempFile::new_in(&parent)?;
    tmp.write_all(&content)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Write the leaderboard document to `path`.
pub fn write_leaderboard_json(path: &Path, leaderboard: &Leaderboard) -> Result<()> {
    write_json_atomic(path, leaderboard)
}

/// Write `results/results.json` and `results/metrics_breakdown.json` under
/// `submission_dir`. Returns the results directory.
pub fn write_submission_results(
    submission_dir: &Path,
    results: &SubmissionResults,
) -> Result<PathBuf> {
    let results_dir = submission_dir.join(RESULTS_DIR);
    write_json_atomic(&results_dir.join(RESULTS_FILE), results)?;
    write_json_atomic(&results_dir.join(METRICS_BREAKDOWN_FILE), &results.metrics)?;
    emit_results_written(&results.submission, &results_dir);
    Ok(results_dir)
}

fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// Leaderboard as a fixed-width console table.
pub fn render_leaderboard(leaderboard: &Leaderboard) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", "=".repeat(RULE_WIDTH)));
    out.push_str(&format!("Leaderboard - {}\n", leaderboard.name));
    out.push_str(&format!("Last Updated: {}\n", leaderboard.last_updated));
    out.push_str(&format!("Total Submissions: {}\n", leaderboard.total_submissions));
    out.push_str(&format!("{}\n\n", "=".repeat(RULE_WIDTH)));

    let header = format!(
        "{:<6} {:<MODEL_COLUMN$} {:<10} {:<10} {:<10} {:<10} {:<10} {:<10}",
        "Rank", "Model", "CLIP", "SSIM", "Text", "Pos", "IR", "Overall"
    );
    out.push_str(header.trim_end());
    out.push('\n');
    out.push_str(&"-".repeat(header.len()));
    out.push('\n');

    for e in &leaderboard.results {
        let row = format!(
            "{:<6} {:<MODEL_COLUMN$} {:<10} {:<10} {:<10} {:<10} {:<10} {:<10}",
            e.rank,
            truncate(&e.model, MODEL_COLUMN - 2),
            e.clip,
            e.ssim,
            e.text,
            e.position,
            e.ir,
            e.overall
        );
        out.push_str(row.trim_end());
        out.push('\n');
    }
    out
}

/// Human-readable summary of one submission's results.
pub fn render_results(results: &SubmissionResults) -> String {
    let rule = "=".repeat(SECTION_RULE_WIDTH);
    let mut out = String::new();
    out.push_str(&format!(
        "Submission summary for {} on {}\n{}\n",
        results.submission, results.dataset, rule
    ));
    out.push_str(&format!(
        "Overall Score: {}\n{}\n",
        format_percentage(results.overall_score),
        rule
    ));

    out.push_str("Metrics Breakdown:\n");
    for (metric, summary) in &results.metrics {
        out.push_str(&format!("  - {}: {}\n", metric, format_percentage(summary.average)));
    }
    out.push_str(&format!("{rule}\n"));

    let stats = &results.instance_stats;
    out.push_str("Instance Statistics:\n");
    out.push_str(&format!("  - Total: {}\n", stats.total));
    out.push_str(&format!(
        "  - Resolved: {} ({:.1}%)\n",
        stats.resolved,
        stats.resolve_rate * 100.0
    ));
    out.push_str(&format!("  - Failed: {}\n", stats.failed));
    if !stats.error_breakdown.is_empty() {
        out.push_str("  - Errors:\n");
        for (error, count) in &stats.error_breakdown {
            out.push_str(&format!("      {error}: {count}\n"));
        }
    }
    out.push_str(&format!("{rule}\n"));

    let meta = &results.metadata;
    out.push_str(&format!("Model: {} ({})\n", meta.model_name, meta.provider));
    out.push_str(&format!("Method: {}\n", meta.method_name));
    out.push_str(&format!("Organization: {}\n", meta.organization));
    if !meta.tags.is_empty() {
        out.push_str(&format!("Tags: {}\n", meta.tags.join(", ")));
    }
    out
}

/// Comparison grid followed by the best submission per metric.
pub fn render_comparison(comparison: &Comparison) -> String {
    let headers: Vec<String> = std::iter::once("Metric".to_string())
        .chain(comparison.submissions.iter().map(|id| id.to_string()))
        .collect();
    let rows: Vec<Vec<String>> = comparison
        .rows
        .iter()
        .map(|row| {
            std::iter::once(row.label.clone())
                .chain(row.values.iter().map(|v| format_percentage(*v)))
                .collect()
        })
        .collect();

    let widths: Vec<usize> = (0..headers.len())
        .map(|col| {
            rows.iter()
                .map(|r| r[col].len())
                .chain(std::iter::once(headers[col].len()))
                .max()
                .unwrap_or(0)
        })
        .collect();
    let border = format!(
        "+{}+",
        widths
            .iter()
            .map(|w| "-".repeat(w + 2))
            .collect::<Vec<_>>()
            .join("+")
    );
    let line = |cells: &[String]| {
        let inner: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(c, &w)| format!(" {c:<w$} "))
            .collect();
        format!("|{}|", inner.join("|"))
    };

    let mut out = String::new();
    out.push_str(&format!("Submission Comparison\n{}\n", "=".repeat(60)));
    out.push_str(&format!("{border}\n{}\n{border}\n", line(&headers)));
    for row in &rows {
        out.push_str(&format!("{}\n{border}\n", line(row)));
    }

    out.push_str("\nBest per Metric:\n");
    for leader in &comparison.best {
        out.push_str(&format!(
            "  {}: {} ({})\n",
            leader.metric,
            leader.submission,
            format_percentage(leader.value)
        ));
    }
    out
}

/// Submission list as a console table.
pub fn render_submissions(submissions: &[&Submission]) -> String {
    let header = format!(
        "{:<32} {:<MODEL_COLUMN$} {:<12} {:<20} {:<10}",
        "ID", "Model", "Date", "Organization", "Overall"
    );
    let mut out = format!("{}\n{}\n", header.trim_end(), "-".repeat(header.len()));
    for sub in submissions {
        let row = format!(
            "{:<32} {:<MODEL_COLUMN$} {:<12} {:<20} {:<10}",
            truncate(sub.id.as_str(), 30),
            truncate(&sub.display_name, MODEL_COLUMN - 2),
            sub.date_label(),
            truncate(&sub.organization, 18),
            format_percentage(sub.overall)
        );
        out.push_str(row.trim_end());
        out.push('\n');
    }
    out.push_str(&format!("\n{} submission(s)\n", submissions.len()));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EvaluationRecord, InstanceOutcome, MetricKind, MetricResult, SubmissionId};
    use chrono::{DateTime, Utc};
    use serde_json::json;

    fn fixed_now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z")
            .expect("parse RFC3339")
            .with_timezone(&Utc)
    }

    fn submission(id: &str, clip: f64) -> Submission {
        let record = EvaluationRecord::default()
            .with_model("gpt-4o")
            .with_method("direct")
            .with_metric(MetricKind::Clip, MetricResult::with_average(clip));
        Submission::build(SubmissionId::new(id), "design2code", &record, None)
    }

    #[test]
    fn test_atomic_write_creates_parents_and_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data/nested/design2code-leaderboard.json");
        write_json_atomic(&path, &json!({"v": 1})).unwrap();
        write_json_atomic(&path, &json!({"v": 2})).unwrap();
        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw, json!({"v": 2}));
        // No temp files left behind.
        assert_eq!(std::fs::read_dir(path.parent().unwrap()).unwrap().count(), 1);
    }

    #[test]
    fn test_submission_results_land_in_results_dir() {
        let dir = tempfile::tempdir().unwrap();
        let record = EvaluationRecord::default()
            .with_metric(MetricKind::Clip, MetricResult::with_average(0.8))
            .with_instance("1", InstanceOutcome::resolved());
        let sub = Submission::build(SubmissionId::new("20250101_a"), "design2code", &record, None);
        let results = SubmissionResults::build(&sub, &record, fixed_now());

        let out = write_submission_results(dir.path(), &results).unwrap();
        assert_eq!(out, dir.path().join("results"));
        let breakdown: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(out.join("metrics_breakdown.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(breakdown["clip"]["average"], json!(0.8));
        let raw = std::fs::read_to_string(out.join("results.json")).unwrap();
        let full: SubmissionResults = serde_json::from_str(&raw).unwrap();
        assert_eq!(full, results);
    }

    #[test]
    fn test_leaderboard_render_lists_ranked_rows() {
        let board = Leaderboard::from_submissions(
            "design2code",
            &[submission("20250101_a", 0.5), submission("20250102_b", 0.9)],
            fixed_now(),
        );
        let text = render_leaderboard(&board);
        assert!(text.contains("Leaderboard - design2code"));
        assert!(text.contains("Total Submissions: 2"));
        let first_row = text.lines().find(|l| l.starts_with("1 ")).unwrap();
        assert!(first_row.contains("90.00%"));
    }

    #[test]
    fn test_leaderboard_render_truncates_long_names() {
        let long = "x".repeat(60);
        let record = EvaluationRecord::default().with_model(long.as_str());
        let sub = Submission::build(SubmissionId::new("20250101_a"), "d", &record, None);
        let text = render_leaderboard(&Leaderboard::from_submissions("d", &[sub], fixed_now()));
        assert!(!text.contains(&long));
        assert!(text.contains(&"x".repeat(33)));
    }

    #[test]
    fn test_results_render_includes_errors_and_tags() {
        let record = EvaluationRecord::default()
            .with_metric(MetricKind::Clip, MetricResult::with_average(0.8))
            .with_instance("1", InstanceOutcome::resolved())
            .with_instance("2", InstanceOutcome::failed("timeout"));
        let meta = crate::domain::SubmissionMetadata::from_yaml(
            "20250101_a",
            "model:\n  name: GPT-4o\n  provider: OpenAI\ntags: [baseline, vision]\n",
        )
        .unwrap();
        let sub = Submission::build(
            SubmissionId::new("20250101_a"),
            "design2code",
            &record,
            Some(meta),
        );
        let text = render_results(&SubmissionResults::build(&sub, &record, fixed_now()));
        assert!(text.contains("Overall Score: 80.00%"));
        assert!(text.contains("  - clip: 80.00%"));
        assert!(text.contains("  - Resolved: 1 (50.0%)"));
        assert!(text.contains("      timeout: 1"));
        assert!(text.contains("Model: GPT-4o (OpenAI)"));
        assert!(text.contains("Tags: baseline, vision"));
    }

    #[test]
    fn test_comparison_render_has_grid_and_leaders() {
        let cmp = Comparison::build(&[
            submission("20250101_a", 0.5),
            submission("20250102_b", 0.9),
        ])
        .unwrap();
        let text = render_comparison(&cmp);
        assert!(text.contains("| Metric "));
        assert!(text.contains("20250102_b"));
        assert!(text.contains("  clip: 20250102_b (90.00%)"));
        assert!(text.lines().any(|l| l.starts_with("| Overall")));
    }

    #[test]
    fn test_submissions_render_counts_rows() {
        let subs = [submission("20250101_a", 0.5), submission("20250102_b", 0.9)];
        let refs: Vec<&Submission> = subs.iter().collect();
        let text = render_submissions(&refs);
        assert!(text.contains("gpt-4o (Direct)"));
        assert!(text.contains("2 submission(s)"));
    }
}
