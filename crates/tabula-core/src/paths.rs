//! Directory layout of a pipeline run.

use std::path::{Path, PathBuf};

use crate::error::{PipelineError, Result};

/// Configuration directory (manifest and descriptions), relative to the root.
pub const DEFAULT_CONFIG_DIR: &str = "config";
/// Rule module directory, relative to the configuration directory.
pub const DEFAULT_RULES_DIR: &str = "rules";
/// Input data directory, relative to the root.
pub const DEFAULT_INPUT_DIR: &str = "data/incoming";
/// Output data directory, relative to the root.
pub const DEFAULT_OUTPUT_DIR: &str = "data/output";

/// Where configuration is read from and data is read and written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelinePaths {
    pub config_dir: PathBuf,
    pub rules_dir: PathBuf,
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl PipelinePaths {
    /// The default layout under a root directory.
    pub fn from_root(root: &Path) -> Self {
        let config_dir = root.join(DEFAULT_CONFIG_DIR);
        Self {
            rules_dir: config_dir.join(DEFAULT_RULES_DIR),
            config_dir,
            input_dir: root.join(DEFAULT_INPUT_DIR),
            output_dir: root.join(DEFAULT_OUTPUT_DIR),
        }
    }

    /// Points at another configuration directory; the rules directory follows
    /// it.
    pub fn with_config_dir(mut self, config_dir: PathBuf) -> Self {
        self.rules_dir = config_dir.join(DEFAULT_RULES_DIR);
        self.config_dir = config_dir;
        self
    }

    pub fn with_rules_dir(mut self, rules_dir: PathBuf) -> Self {
        self.rules_dir = rules_dir;
        self
    }

    pub fn with_input_dir(mut self, input_dir: PathBuf) -> Self {
        self.input_dir = input_dir;
        self
    }

    pub fn with_output_dir(mut self, output_dir: PathBuf) -> Self {
        self.output_dir = output_dir;
        self
    }

    /// Creates the output directory if it does not exist yet.
    pub fn ensure_output_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.output_dir).map_err(|source| PipelineError::CreateDir {
            path: self.output_dir.clone(),
            source,
        })
    }
}
