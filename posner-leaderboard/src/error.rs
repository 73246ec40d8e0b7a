use std::path::PathBuf;
use thiserror::Error;

/// Errors that stop a leaderboard pass.
#[derive(Error, Debug)]
pub enum LeaderboardError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to replace {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl LeaderboardError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LeaderboardError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Why a single result file was left out of the aggregation.
#[derive(Error, Debug)]
pub enum FileError {
    #[error("missing column '{0}'")]
    MissingColumn(&'static str),

    #[error("row {row}: bad {column} value '{value}'")]
    BadValue {
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error(transparent)]
    Csv(#[from] csv::Error),
}
