//! Error types for formatting and writing output tables.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while producing an output file.
#[derive(Debug, Error)]
pub enum OutputError {
    /// The derived table was built for another output or input.
    #[error("output '{output}' cannot format a table derived for '{found}' (expected '{expected}')")]
    DefinitionMismatch {
        output: String,
        expected: String,
        found: String,
    },

    /// Filesystem operation failed.
    #[error("failed to {operation} {path}: {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The delimited writer rejected a record.
    #[error("failed to write {path}: {message}")]
    Csv { path: PathBuf, message: String },

    /// The temporary file could not be moved into place.
    #[error("failed to move {temp_path} to {target_path}: {source}")]
    AtomicWriteFailed {
        temp_path: PathBuf,
        target_path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for output operations.
pub type Result<T> = std::result::Result<T, OutputError>;
