//! Harness error type.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid fixture {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("invalid call list: {0}")]
    Calls(#[source] serde_json::Error),

    #[error("operator {0:?} is not a single byte")]
    Operator(char),

    #[error("no fixture JSON files found in {0}")]
    NoFixtures(PathBuf),

    #[error("unknown mode '{0}' (expected strict, hardened or both)")]
    Mode(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
