//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use tabula_core::{BatchPolicy, PipelineOptions, PipelinePaths};

#[derive(Parser)]
#[command(
    name = "tabula",
    version,
    about = "Validate delimited data files against declared schemas and derive output tables",
    long_about = "Validate delimited data files against declared schemas and derive output tables.\n\n\
                  Inputs and outputs are described by JSON files listed in a manifest.\n\
                  Output columns copy input columns or are computed by rule modules,\n\
                  and are written back with the locale conventions of their input."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for humans, json for machine parsing).
    #[arg(long = "log-format", value_enum, default_value = "pretty", global = true)]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow cell values from data files to appear in logs.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Validate every active input and write every active output.
    Run(RunArgs),

    /// List the active inputs and outputs of the manifest.
    Schemas(LocationArgs),
}

/// Where configuration and data live.
#[derive(Args, Debug, Clone)]
pub struct LocationArgs {
    /// Root directory holding `config/` and `data/`.
    #[arg(long = "root", value_name = "DIR", default_value = ".")]
    pub root: PathBuf,

    /// Configuration directory with `manifest.json` (default: <ROOT>/config).
    #[arg(long = "config-dir", value_name = "DIR", env = "TABULA_CONFIG_DIR")]
    pub config_dir: Option<PathBuf>,

    /// Rule module directory (default: <CONFIG_DIR>/rules).
    #[arg(long = "rules-dir", value_name = "DIR")]
    pub rules_dir: Option<PathBuf>,

    /// Directory the input files are read from (default: <ROOT>/data/incoming).
    #[arg(long = "input-dir", value_name = "DIR")]
    pub input_dir: Option<PathBuf>,

    /// Directory the output files are written to (default: <ROOT>/data/output).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
}

impl LocationArgs {
    /// Resolves the directory layout; explicit directories override the
    /// defaults under the root.
    pub fn paths(&self) -> PipelinePaths {
        let mut paths = PipelinePaths::from_root(&self.root);
        if let Some(dir) = &self.config_dir {
            paths = paths.with_config_dir(dir.clone());
        }
        if let Some(dir) = &self.rules_dir {
            paths = paths.with_rules_dir(dir.clone());
        }
        if let Some(dir) = &self.input_dir {
            paths = paths.with_input_dir(dir.clone());
        }
        if let Some(dir) = &self.output_dir {
            paths = paths.with_output_dir(dir.clone());
        }
        paths
    }
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub location: LocationArgs,

    /// Keep processing the remaining outputs after one fails.
    #[arg(long = "keep-going")]
    pub keep_going: bool,

    /// Validate and derive without writing output files.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

impl RunArgs {
    pub fn options(&self) -> PipelineOptions {
        PipelineOptions {
            policy: if self.keep_going {
                BatchPolicy::Continue
            } else {
                BatchPolicy::FailFast
            },
            dry_run: self.dry_run,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
