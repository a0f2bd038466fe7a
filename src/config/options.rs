// src/config/options.rs
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::consts::{self, col};
use crate::error::ConfigError;

/// Everything a run needs. Every section has defaults, so an empty (or absent)
/// TOML file is a valid configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdenConfig {
    /// Directory under which `data/` lives.
    pub root: PathBuf,
    pub fetch: FetchOptions,
    pub sources: SourceUrls,
    pub scoring: ScoringOptions,
    pub log: LogOptions,
}

impl EdenConfig {
    /// Load from `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchOptions {
    pub delay_min_ms: u64,
    pub delay_max_ms: u64,
    pub timeout_secs: u64,
    /// Extra attempts after a transient failure.
    pub retries: u32,
    pub backoff_ms: u64,
    pub checkpoint_every: usize,
    pub max_consecutive_errors: usize,
    pub user_agent: String,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            delay_min_ms: consts::DELAY_MIN_MS,
            delay_max_ms: consts::DELAY_MAX_MS,
            timeout_secs: consts::TIMEOUT_SECS,
            retries: consts::RETRIES,
            backoff_ms: consts::BACKOFF_MS,
            checkpoint_every: consts::CHECKPOINT_EVERY,
            max_consecutive_errors: consts::MAX_CONSECUTIVE_ERRORS,
            user_agent: s!(consts::USER_AGENT),
        }
    }
}

impl FetchOptions {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Exponential: backoff, 2*backoff, 4*backoff, ...
    pub fn backoff(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.backoff_ms.saturating_mul(1u64 << attempt.min(16)))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceUrls {
    pub bestplaces: String,
    pub geodata: String,
    pub geodata_entry: String,
    pub district_query: String,
    pub scorecard: String,
    pub crime: String,
    pub population: String,
    pub temples: String,
    pub drought: String,
}

impl Default for SourceUrls {
    fn default() -> Self {
        Self {
            bestplaces: s!(consts::BESTPLACES_BASE),
            geodata: s!(consts::GEODATA_URL),
            geodata_entry: s!(consts::GEODATA_ENTRY),
            district_query: s!(consts::DISTRICT_QUERY_URL),
            scorecard: s!(consts::SCORECARD_URL),
            crime: s!(consts::CRIME_URL),
            population: s!(consts::POPULATION_URL),
            temples: s!(consts::TEMPLES_URL),
            drought: s!(consts::DROUGHT_URL),
        }
    }
}

/// One term of the Eden score.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeatureWeight {
    pub column: String,
    pub weight: f64,
    /// Use `1 - normalize(x)` instead of `normalize(x)`.
    #[serde(default)]
    pub reverse: bool,
}

impl FeatureWeight {
    pub fn new(column: &str, weight: f64) -> Self {
        Self { column: s!(column), weight, reverse: false }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringOptions {
    pub weights: Vec<FeatureWeight>,
}

impl Default for ScoringOptions {
    fn default() -> Self {
        let w = FeatureWeight::new;
        Self {
            weights: vec![
                w(col::PHYSICIANS, 0.5),
                w(col::HEALTH_COSTS, -0.5),
                w(col::WATER_QUALITY, 1.0),
                w(col::AIR_QUALITY, 1.0),
                w(col::HOT_SCORE, 4.0),
                w(col::COLD_SCORE, 1.0),
                w(col::RAINFALL, 0.5),
                w(col::SNOWFALL, -10.0),
                w(col::PRECIPITATION, 0.0),
                w(col::SUNSHINE, 1.0),
                w(col::UV, -0.3),
                w(col::ABOVE_90, -2.0),
                w(col::BELOW_30, -0.25),
                w(col::BELOW_0, -1.2),
                w(col::DENSITY, -1.2),
                w(col::CONSTITUTIONALITY, 1.5),
                w(col::HOME_INSURANCE, -1.3),
                w(col::DROUGHT, -2.0),
            ],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogOptions {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub level: String,
    /// Append to this file instead of stderr.
    pub file: Option<PathBuf>,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self { level: s!("info"), file: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_is_default() {
        let cfg = EdenConfig::from_toml("").unwrap();
        assert_eq!(cfg, EdenConfig::default());
        assert_eq!(cfg.fetch.checkpoint_every, consts::CHECKPOINT_EVERY);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = EdenConfig::from_toml(
            r#"
            root = "/tmp/eden"
            [fetch]
            retries = 0
            [[scoring.weights]]
            column = "Snowfall"
            weight = -3.0
            reverse = true
            "#,
        )
        .unwrap();
        assert_eq!(cfg.root, PathBuf::from("/tmp/eden"));
        assert_eq!(cfg.fetch.retries, 0);
        assert_eq!(cfg.fetch.delay_max_ms, consts::DELAY_MAX_MS);
        assert_eq!(cfg.scoring.weights.len(), 1);
        assert!(cfg.scoring.weights[0].reverse);
        assert_eq!(cfg.sources.geodata_entry, consts::GEODATA_ENTRY);
    }

    #[test]
    fn backoff_doubles() {
        let f = FetchOptions { backoff_ms: 100, ..FetchOptions::default() };
        assert_eq!(f.backoff(0), Duration::from_millis(100));
        assert_eq!(f.backoff(2), Duration::from_millis(400));
    }
}
