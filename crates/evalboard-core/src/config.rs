//! Runtime configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::warn;

use crate::cache::DEFAULT_TTL;

pub const ENV_EVALUATION_DIR: &str = "EVALBOARD_EVALUATION_DIR";
pub const ENV_DATA_DIR: &str = "EVALBOARD_DATA_DIR";
pub const ENV_DATASET: &str = "EVALBOARD_DATASET";
pub const ENV_CACHE_TTL_SECS: &str = "EVALBOARD_CACHE_TTL_SECS";

pub const DEFAULT_EVALUATION_DIR: &str = "evaluation";
pub const DEFAULT_DATA_DIR: &str = "data";
pub const DEFAULT_DATASET: &str = "design2code";

/// Where records live, where generated artifacts go, and how long served
/// views stay cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalboardConfig {
    /// Root of the `<dataset>/<submission>/` tree.
    pub evaluation_dir: PathBuf,
    /// Directory holding pre-generated `<dataset>-leaderboard.json` files.
    pub data_dir: PathBuf,
    pub default_dataset: String,
    pub cache_ttl: Duration,
}

impl Default for EvalboardConfig {
    fn default() -> Self {
        Self {
            evaluation_dir: PathBuf::from(DEFAULT_EVALUATION_DIR),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            default_dataset: DEFAULT_DATASET.to_string(),
            cache_ttl: DEFAULT_TTL,
        }
    }
}

impl EvalboardConfig {
    /// Load configuration from environment variables.
    ///
    /// Reads:
    /// - EVALBOARD_EVALUATION_DIR (optional, default: "evaluation")
    /// - EVALBOARD_DATA_DIR (optional, default: "data")
    /// - EVALBOARD_DATASET (optional, default: "design2code")
    /// - EVALBOARD_CACHE_TTL_SECS (optional, default: 300)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary variable lookup.
    /// Empty values count as unset; an unparseable TTL falls back to the
    /// default and is logged.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(dir) = get(ENV_EVALUATION_DIR) {
            config.evaluation_dir = PathBuf::from(dir);
        }
        if let Some(dir) = get(ENV_DATA_DIR) {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(dataset) = get(ENV_DATASET) {
            config.default_dataset = dataset;
        }
        if let Some(raw) = get(ENV_CACHE_TTL_SECS) {
            match raw.trim().parse::<u64>() {
                Ok(secs) => config.cache_ttl = Duration::from_secs(secs),
                Err(e) => warn!(
                    variable = ENV_CACHE_TTL_SECS,
                    value = %raw,
                    error = %e,
                    "invalid cache TTL, using default"
                ),
            }
        }
        config
    }

    pub fn with_evaluation_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.evaluation_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn with_data_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.data_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn with_default_dataset(mut self, dataset: impl Into<String>) -> Self {
        self.default_dataset = dataset.into();
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// `<data_dir>/<dataset>-leaderboard.json`.
    pub fn leaderboard_path(&self, dataset: &str) -> PathBuf {
        self.data_dir.join(format!("{dataset}-leaderboard.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_variables() {
        let config = EvalboardConfig::from_lookup(lookup(&[]));
        assert_eq!(config, EvalboardConfig::default());
        assert_eq!(config.evaluation_dir, PathBuf::from("evaluation"));
        assert_eq!(config.cache_ttl, Duration::from_secs(300));
    }

    #[test]
    fn test_variables_override_defaults() {
        let config = EvalboardConfig::from_lookup(lookup(&[
            (ENV_EVALUATION_DIR, "/srv/eval"),
            (ENV_DATA_DIR, "/srv/data"),
            (ENV_DATASET, "d2c-hard"),
            (ENV_CACHE_TTL_SECS, "60"),
        ]));
        assert_eq!(config.evaluation_dir, PathBuf::from("/srv/eval"));
        assert_eq!(config.data_dir, PathBuf::from("/srv/data"));
        assert_eq!(config.default_dataset, "d2c-hard");
        assert_eq!(config.cache_ttl, Duration::from_secs(60));
    }

    #[test]
    fn test_bad_ttl_and_empty_values_fall_back() {
        let config = EvalboardConfig::from_lookup(lookup(&[
            (ENV_CACHE_TTL_SECS, "five minutes"),
            (ENV_DATASET, "  "),
        ]));
        assert_eq!(config.cache_ttl, DEFAULT_TTL);
        assert_eq!(config.default_dataset, "design2code");
    }

    #[test]
    fn test_builders_and_leaderboard_path() {
        let config = EvalboardConfig::default()
            .with_data_dir("/tmp/site-data")
            .with_evaluation_dir("/tmp/eval")
            .with_default_dataset("d")
            .with_cache_ttl(Duration::from_secs(1));
        assert_eq!(
            config.leaderboard_path("design2code"),
            PathBuf::from("/tmp/site-data/design2code-leaderboard.json")
        );
        assert_eq!(config.cache_ttl, Duration::from_secs(1));
    }
}
