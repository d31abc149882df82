//! Error taxonomy shared by every SEF operation.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading, partitioning or estimating.
#[derive(Error, Debug)]
pub enum SefError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("column '{0}' not found")]
    MissingColumn(String),

    #[error("group '{group}' has {got} valid observation(s), need at least {needed}")]
    InsufficientSample {
        group: String,
        needed: usize,
        got: usize,
    },

    #[error("group '{group}' has zero variance")]
    DegenerateVariance { group: String },

    #[error("correlation needs paired samples of equal length, got {len_a} and {len_b}")]
    UnpairedSamples { len_a: usize, len_b: usize },

    #[error("variance ratio must be positive and finite, got {0}")]
    InvalidKappa(f64),

    #[error("correlation must lie in [-1, 1], got {0}")]
    InvalidCorrelation(f64),

    #[error("network failure: {0}")]
    Network(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl SefError {
    /// Wrap an I/O error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SefError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, SefError>;
