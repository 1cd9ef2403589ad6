//! Pipeline orchestration for Tabula.
//!
//! A [`Pipeline`] holds everything resolved once at setup (the schema
//! catalog, the rule registry and the directory layout) and runs
//! input/output pairs through validation, dispatch, formatting and writing.

pub mod error;
pub mod paths;
pub mod pipeline;
pub mod report;

pub use error::{PipelineError, Result};
pub use paths::{
    DEFAULT_CONFIG_DIR, DEFAULT_INPUT_DIR, DEFAULT_OUTPUT_DIR, DEFAULT_RULES_DIR, PipelinePaths,
};
pub use pipeline::{BatchPolicy, Pipeline, PipelineOptions, ValidatedInputs};
pub use report::{BatchReport, PairFailure, PairReport};
