//! Unified error type for pipeline runs.

use std::path::PathBuf;

use tabula_ingest::IngestError;
use tabula_model::SchemaError;
use tabula_output::OutputError;
use tabula_transform::{DispatchError, RuleConfigError, RuleResolutionError};
use tabula_validate::ValidationError;
use thiserror::Error;

/// Any failure that aborts an input/output pair or the pipeline setup.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Missing manifest or input file, or an unreadable input file.
    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    RuleResolution(#[from] RuleResolutionError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error(transparent)]
    RuleConfig(#[from] RuleConfigError),

    #[error(transparent)]
    Output(#[from] OutputError),

    /// An output id that the catalog does not know.
    #[error("unknown output '{id}'")]
    UnknownOutput { id: String },

    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PipelineError {
    /// Short category name used in summaries and structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::Schema(_) => "schema",
            PipelineError::Ingest(IngestError::MissingFile(_)) => "missing_file",
            PipelineError::Ingest(IngestError::Schema(_)) => "schema",
            PipelineError::Ingest(_) => "ingest",
            PipelineError::Validation(_) => "validation",
            PipelineError::RuleResolution(_)
            | PipelineError::Dispatch(DispatchError::RuleResolution(_)) => "rule_resolution",
            PipelineError::Dispatch(_) => "dispatch",
            PipelineError::RuleConfig(_) => "rule_config",
            PipelineError::Output(_) | PipelineError::CreateDir { .. } => "output",
            PipelineError::UnknownOutput { .. } => "configuration",
        }
    }
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;
