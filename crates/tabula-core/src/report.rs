//! Outcomes of pair and batch runs.

use std::path::PathBuf;

use crate::error::PipelineError;

/// Result of one successful input/output pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairReport {
    pub output_id: String,
    pub input_id: String,
    /// Rows in the validated input.
    pub source_rows: usize,
    /// Rows removed by the rule module's filter.
    pub excluded_rows: usize,
    /// Rows in the output table.
    pub output_rows: usize,
    /// Written file; `None` on a dry run.
    pub destination: Option<PathBuf>,
    /// The validated input was reused from an earlier pair of the batch.
    pub cached_input: bool,
}

/// A pair that failed, with the error that stopped it.
#[derive(Debug)]
pub struct PairFailure {
    pub output_id: String,
    pub input_id: String,
    pub error: PipelineError,
}

/// Outcome of a batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub completed: Vec<PairReport>,
    pub failed: Vec<PairFailure>,
    /// Output ids never attempted because the batch stopped early.
    pub skipped: Vec<String>,
}

impl BatchReport {
    pub fn has_errors(&self) -> bool {
        !self.failed.is_empty()
    }

    pub fn total_rows_written(&self) -> usize {
        self.completed
            .iter()
            .filter(|pair| pair.destination.is_some())
            .map(|pair| pair.output_rows)
            .sum()
    }
}
