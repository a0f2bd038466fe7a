// src/error.rs
use std::path::PathBuf;

/// Top-level error for every fallible pipeline operation.
#[derive(thiserror::Error, Debug)]
pub enum EdenError {
    #[error("store: {0}")]
    Store(#[from] StoreError),

    #[error("source: {0}")]
    Source(#[from] SourceError),

    #[error("merge: {0}")]
    Merge(#[from] MergeError),

    #[error("score: {0}")]
    Score(#[from] ScoreError),

    #[error("config: {0}")]
    Config(#[from] ConfigError),
}

/// Persistence of tabular artifacts.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A cached artifact lacks columns the current code expects.
    #[error("{artifact} is missing expected column(s) {missing:?}; delete it or migrate it")]
    SchemaDrift {
        artifact: String,
        missing: Vec<String>,
    },

    #[error("{}: {reason}", path.display())]
    Malformed { path: PathBuf, reason: String },
}

impl StoreError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io { path: path.into(), source }
    }
}

/// Outcome of one outbound request (or one bulk payload).
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// Timeout, reset, 429, 5xx. Worth retrying.
    #[error("transient failure: {0}")]
    Transient(String),

    /// 404 for a per-place page: the place simply has no page.
    #[error("not found: {0}")]
    NotFound(String),

    /// Host unreachable or refusing us. Fatal for the current fetcher run.
    #[error("source unavailable: {0}")]
    Unavailable(String),

    /// Payload arrived but could not be decoded at all.
    #[error("malformed payload: {0}")]
    Malformed(String),
}

impl SourceError {
    pub fn is_transient(&self) -> bool {
        matches!(self, SourceError::Transient(_))
    }
}

/// Extraction failure for a single field of a fetched row. Always recovered as `Missing`.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("{0}: no match on page")]
    NotFound(&'static str),

    #[error("{field}: cannot read value from {raw:?}")]
    Unparseable { field: &'static str, raw: String },
}

#[derive(thiserror::Error, Debug)]
pub enum MergeError {
    #[error("join key {column} missing from {table} table")]
    MissingKey { table: &'static str, column: String },

    #[error("master table does not exist yet; build it before the {0} stage")]
    NoMaster(&'static str),

    #[error("{0} has not been collected yet")]
    NotCollected(&'static str),
}

#[derive(thiserror::Error, Debug)]
pub enum ScoreError {
    #[error("required feature column {0} is missing; finish the enrichment stages first")]
    MissingColumn(String),
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("opening log file {}: {source}", path.display())]
    LogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T, E = EdenError> = std::result::Result<T, E>;
