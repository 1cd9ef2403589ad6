//! Error types for raw ingestion.

use std::fmt;
use std::path::{Path, PathBuf};

use tabula_model::SchemaError;
use thiserror::Error;

/// What kind of file was expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Input,
    Manifest,
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileKind::Input => f.write_str("input file"),
            FileKind::Manifest => f.write_str("manifest"),
        }
    }
}

/// A required input file or manifest is absent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} not found: {path}")]
pub struct MissingFileError {
    pub kind: FileKind,
    pub path: PathBuf,
}

/// Errors that can occur while reading input files and the manifest.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Input file or manifest not found.
    #[error(transparent)]
    MissingFile(#[from] MissingFileError),

    /// Failed to read file.
    #[error("failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Encoding label not known to the decoder.
    #[error("unsupported encoding '{encoding}' for {path}")]
    UnsupportedEncoding { path: PathBuf, encoding: String },

    /// Bytes are not valid in the declared encoding.
    #[error("{path} is not valid {encoding}")]
    Decode { path: PathBuf, encoding: String },

    /// Delimited text could not be parsed.
    #[error("failed to parse {path}: {message}")]
    CsvParse { path: PathBuf, message: String },

    /// Manifest or description content is invalid.
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl IngestError {
    /// Maps an open/read failure, turning `NotFound` into [`MissingFileError`].
    pub(crate) fn from_io(kind: FileKind, path: &Path, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::MissingFile(MissingFileError {
                kind,
                path: path.to_path_buf(),
            })
        } else {
            Self::FileRead {
                path: path.to_path_buf(),
                source,
            }
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
