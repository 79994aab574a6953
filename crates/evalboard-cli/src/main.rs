//! Evalboard - benchmark leaderboard CLI
//!
//! The `evalboard` command aggregates per-submission evaluation records into
//! leaderboards, results reports and comparisons.
//!
//! ## Commands
//!
//! - `leaderboard`: Rank a dataset and save the leaderboard document
//! - `results`: Build and save the results report of one submission
//! - `process-all`: Build results reports for every submission of a dataset
//! - `compare`: Compare submissions side by side
//! - `search`: Filter a dataset's submissions
//! - `datasets`: List available datasets

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::{info, Level};

use evalboard_core::metrics::METRICS;
use evalboard_core::{
    compare_ids, generate_leaderboard, process_all, process_submission_dir, render_comparison,
    render_leaderboard, render_results, render_submissions, write_leaderboard_json,
    EvalboardConfig, FsRecordSource, LeaderboardService, RecordSource, SubmissionFilter,
    SubmissionId,
};

#[derive(Parser)]
#[command(name = "evalboard")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Benchmark leaderboard aggregation and ranking", long_about = None)]
struct Cli {
    /// Root of the evaluation tree (<dir>/<dataset>/<submission>/)
    #[arg(long, global = true, env = "EVALBOARD_EVALUATION_DIR")]
    evaluation_dir: Option<PathBuf>,

    /// Directory for generated leaderboard documents
    #[arg(long, global = true, env = "EVALBOARD_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate, print and save the leaderboard of a dataset
    Leaderboard {
        /// Dataset name (folder under the evaluation directory)
        #[arg(short, long)]
        dataset: Option<String>,

        /// Output path (default: <data-dir>/<dataset>-leaderboard.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Build, save and print the results of one submission
    Results {
        /// Submission folder, e.g. evaluation/design2code/20251229_gpt4o_direct
        submission_path: PathBuf,
    },

    /// Build results for every submission of a dataset
    ProcessAll {
        #[arg(short, long)]
        dataset: Option<String>,
    },

    /// Compare two or more submissions side by side
    Compare {
        /// Submission ids to compare
        #[arg(required = true, num_args = 2..)]
        submissions: Vec<String>,

        #[arg(short, long)]
        dataset: Option<String>,
    },

    /// Search a dataset's submissions
    Search {
        #[arg(short, long)]
        dataset: Option<String>,

        /// Free-text query over model, method and metadata
        #[arg(short, long)]
        query: Option<String>,

        /// Model name substring
        #[arg(long)]
        model: Option<String>,

        /// Exact method name
        #[arg(long)]
        method: Option<String>,

        /// Organization substring
        #[arg(long)]
        org: Option<String>,

        /// Required tag (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// List available datasets
    Datasets,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

impl Cli {
    /// Environment configuration with command-line overrides applied.
    fn config(&self) -> EvalboardConfig {
        let mut config = EvalboardConfig::from_env();
        if let Some(dir) = &self.evaluation_dir {
            config = config.with_evaluation_dir(dir);
        }
        if let Some(dir) = &self.data_dir {
            config = config.with_data_dir(dir);
        }
        config
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    evalboard_core::init_tracing(cli.json, level);

    let config = cli.config();
    let dataset_or_default =
        |dataset: Option<String>| dataset.unwrap_or_else(|| config.default_dataset.clone());

    let outcome = match cli.command {
        Commands::Leaderboard { dataset, output } => {
            cmd_leaderboard(&config, &dataset_or_default(dataset), output.as_deref())
        }
        Commands::Results { submission_path } => cmd_results(&submission_path),
        Commands::ProcessAll { dataset } => cmd_process_all(&config, &dataset_or_default(dataset)),
        Commands::Compare {
            submissions,
            dataset,
        } => cmd_compare(&config, &dataset_or_default(dataset), &submissions),
        Commands::Search {
            dataset,
            query,
            model,
            method,
            org,
            tags,
            format,
        } => {
            let filter = SubmissionFilter {
                query,
                model,
                method,
                organization: org,
                tags,
            };
            cmd_search(&config, &dataset_or_default(dataset), &filter, format)
        }
        Commands::Datasets => cmd_datasets(&config),
    };

    METRICS.flush();
    outcome
}

/// Rank a dataset, print it and save the document.
fn cmd_leaderboard(config: &EvalboardConfig, dataset: &str, output: Option<&Path>) -> Result<()> {
    let source = FsRecordSource::new(&config.evaluation_dir);
    let leaderboard = generate_leaderboard(&source, dataset, Utc::now())
        .with_context(|| format!("Failed to generate leaderboard for {dataset}"))?;

    println!("{}", render_leaderboard(&leaderboard));

    let path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| config.leaderboard_path(dataset));
    write_leaderboard_json(&path, &leaderboard)
        .with_context(|| format!("Failed to write leaderboard to {:?}", path))?;
    println!("Leaderboard saved to: {}", path.display());
    Ok(())
}

/// Build and persist one submission's results.
fn cmd_results(submission_path: &Path) -> Result<()> {
    if !submission_path.exists() {
        anyhow::bail!("Submission path does not exist: {:?}", submission_path);
    }
    info!(path = %submission_path.display(), "processing submission");
    let results = process_submission_dir(submission_path, Utc::now())
        .with_context(|| format!("Failed to process {:?}", submission_path))?;

    println!("{}", render_results(&results));
    println!(
        "Results saved to: {}",
        submission_path.join("results").display()
    );
    Ok(())
}

fn cmd_process_all(config: &EvalboardConfig, dataset: &str) -> Result<()> {
    let source = FsRecordSource::new(&config.evaluation_dir);
    let report = process_all(&source, dataset, Utc::now())
        .with_context(|| format!("Failed to process dataset {dataset}"))?;

    for results in &report.processed {
        println!(
            "  ok      {} ({:.2}%)",
            results.submission,
            results.overall_score * 100.0
        );
    }
    for failed in &report.failed {
        println!("  failed  {}: {}", failed.id, failed.reason);
    }
    println!("{}", "=".repeat(50));
    println!(
        "Processed {} of {} submissions",
        report.processed.len(),
        report.attempted()
    );
    Ok(())
}

fn cmd_compare(config: &EvalboardConfig, dataset: &str, ids: &[String]) -> Result<()> {
    let source = FsRecordSource::new(&config.evaluation_dir);
    let ids: Vec<SubmissionId> = ids.iter().map(|id| SubmissionId::new(id.as_str())).collect();
    let comparison = compare_ids(&source, dataset, &ids).context("Comparison failed")?;
    println!("{}", render_comparison(&comparison));
    Ok(())
}

fn cmd_search(
    config: &EvalboardConfig,
    dataset: &str,
    filter: &SubmissionFilter,
    format: OutputFormat,
) -> Result<()> {
    let service = LeaderboardService::from_config(config);
    let found = service
        .search_submissions(dataset, filter)
        .with_context(|| format!("Search failed for dataset {dataset}"))?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&found)?),
        OutputFormat::Table => {
            let refs: Vec<_> = found.iter().collect();
            println!("{}", render_submissions(&refs));
        }
    }
    Ok(())
}

fn cmd_datasets(config: &EvalboardConfig) -> Result<()> {
    let source = FsRecordSource::new(&config.evaluation_dir);
    let datasets = source
        .datasets()
        .with_context(|| format!("Failed to list {:?}", config.evaluation_dir))?;

    if datasets.is_empty() {
        println!("No datasets found under {}", config.evaluation_dir.display());
        return Ok(());
    }
    for dataset in datasets {
        println!("{dataset}");
    }
    Ok(())
}
