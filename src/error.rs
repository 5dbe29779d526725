//! Error kinds for loading, validating and writing benchmark result files
//!
//! Only fatal conditions live here. "No comparable baseline" and "selectors
//! matched nothing" are ordinary run outcomes, see [`crate::compare::RunOutcome`].

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a rescale run
#[derive(Error, Debug)]
pub enum RescaleError {
    #[error("Provided path does NOT exist or is not a {suffix} file: {path}")]
    PathNotFound { path: PathBuf, suffix: String },

    #[error("Provided path {path} contained no {suffix} files")]
    NoInputFiles { path: PathBuf, suffix: String },

    #[error("Failed to read result file {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed result file {path}: {source}")]
    MalformedResultFile {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid result file {path}: {reason}")]
    InvalidResultFile { path: PathBuf, reason: String },

    #[error("Unsupported schema version in {path}: expected {expected}, found {found}")]
    UnsupportedSchema {
        path: PathBuf,
        expected: u32,
        found: u32,
    },

    #[error("Failed to write rescaled results to {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for rescale operations
pub type Result<T> = std::result::Result<T, RescaleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_not_found_message_names_path() {
        let err = RescaleError::PathNotFound {
            path: PathBuf::from("/tmp/missing"),
            suffix: "full.json".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/tmp/missing"));
        assert!(msg.contains("full.json"));
    }

    #[test]
    fn test_malformed_file_keeps_source() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = RescaleError::MalformedResultFile {
            path: PathBuf::from("bad-report-full.json"),
            source,
        };
        assert!(err.to_string().contains("bad-report-full.json"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
