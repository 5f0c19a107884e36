use std::path::PathBuf;

use thiserror::Error;

/// Fatal problems found while loading or processing a season.
///
/// Record numbers are 1-based and count data rows, not the header.
#[derive(Debug, Error)]
pub enum SeasonError {
    #[error("record {record}: malformed {field} `{value}`: {message}")]
    Parse {
        record: usize,
        field: &'static str,
        value: String,
        message: String,
    },

    #[error("record {record}: {team1} vs {team2}: {message}")]
    Data {
        record: usize,
        team1: String,
        team2: String,
        message: String,
    },

    #[error("unknown team: {0}")]
    Lookup(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: PathBuf, source: csv::Error },

    #[error("statistics error: {0}")]
    Stats(String),
}

pub type Result<T, E = SeasonError> = std::result::Result<T, E>;
