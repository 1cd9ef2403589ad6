//! Error types for rule resolution and dispatch.

use std::path::PathBuf;

use thiserror::Error;

/// A referenced rule or rule module does not exist.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleResolutionError {
    /// An output column computes with a rule the module does not define.
    #[error("rule '{function}' for output column '{column}' is not defined in rule module '{module}'")]
    MissingFunction {
        function: String,
        module: String,
        column: String,
    },

    /// An output references a module that is not registered.
    #[error("rule module '{module}' is not registered")]
    MissingModule { module: String },
}

/// Errors raised while preparing or running the column dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error(transparent)]
    RuleResolution(#[from] RuleResolutionError),

    /// A source column is not declared by the input.
    #[error("output '{output}' column '{column}' copies '{source_column}', which input '{input}' does not declare")]
    UnknownSource {
        output: String,
        column: String,
        source_column: String,
        input: String,
    },

    /// The table or input definition does not belong to the output's input.
    #[error("output '{output}' derives from input '{expected}', got '{found}'")]
    InputMismatch {
        output: String,
        expected: String,
        found: String,
    },
}

/// A declarative rule module file is malformed or inconsistent.
#[derive(Debug, Error)]
pub enum RuleConfigError {
    #[error("failed to read rule module {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse rule module {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("rule module '{module}' is defined twice (second definition in {path})")]
    DuplicateModule { module: String, path: PathBuf },

    #[error("rule module '{module}': rule '{rule}' references unknown rule '{reference}'")]
    UnknownRule {
        module: String,
        rule: String,
        reference: String,
    },

    #[error("rule module '{module}': rule '{rule}' references unknown table '{table}'")]
    UnknownTable {
        module: String,
        rule: String,
        table: String,
    },

    #[error("rule module '{module}': rule '{rule}' depends on itself")]
    Cycle { module: String, rule: String },

    #[error("rule module '{module}': {context}: {message}")]
    Invalid {
        module: String,
        context: String,
        message: String,
    },
}

/// Result type for dispatch operations.
pub type Result<T> = std::result::Result<T, DispatchError>;
