use std::time::Instant;

use anyhow::{Context, Result};
use comfy_table::{CellAlignment, Table};
use tracing::{debug, info, info_span, trace};

use tabula_core::{BatchReport, Pipeline, PipelineError};
use tabula_ingest::load_catalog;
use tabula_validate::ValidationError;

use crate::cli::{LocationArgs, RunArgs};
use crate::logging::redact_value;
use crate::summary::{align_column, apply_table_style, header_cell};

pub fn run_pipeline(args: &RunArgs) -> Result<BatchReport> {
    let paths = args.location.paths();
    let run_span = info_span!("run", root = %args.location.root.display());
    let _run_guard = run_span.enter();
    let start = Instant::now();

    let pipeline = Pipeline::load(paths.clone(), args.options()).with_context(|| {
        format!(
            "load configuration from {}",
            paths.config_dir.display()
        )
    })?;
    let report = pipeline.run_batch().context("run batch")?;
    for failure in &report.failed {
        log_failure_details(&failure.output_id, &failure.error);
    }

    info!(
        completed = report.completed.len(),
        failed = report.failed.len(),
        dry_run = args.dry_run,
        duration_ms = start.elapsed().as_millis(),
        "run complete"
    );
    Ok(report)
}

/// Logs the offending cells behind a validation failure.
fn log_failure_details(output_id: &str, error: &PipelineError) {
    let PipelineError::Validation(validation) = error else {
        return;
    };
    match validation {
        ValidationError::TypeMismatch {
            column,
            expected,
            samples,
            ..
        } => {
            for sample in samples {
                debug!(
                    output_id,
                    column = column.as_str(),
                    expected = expected.as_str(),
                    row = sample.row,
                    value = redact_value(&sample.value),
                    "invalid value"
                );
            }
        }
        ValidationError::Duplicates {
            column, duplicates, ..
        } => {
            for duplicate in duplicates {
                debug!(
                    output_id,
                    column = column.as_str(),
                    rows = ?duplicate.rows,
                    value = redact_value(&duplicate.value),
                    "duplicate value"
                );
            }
        }
        ValidationError::NullValues { column, rows, .. } => {
            trace!(output_id, column = column.as_str(), rows = ?rows, "null values");
        }
        _ => {}
    }
}

pub fn run_schemas(args: &LocationArgs) -> Result<()> {
    let paths = args.paths();
    let catalog = load_catalog(&paths.config_dir)
        .with_context(|| format!("load manifest from {}", paths.config_dir.display()))?;

    let mut inputs = Table::new();
    inputs.set_header(vec![
        header_cell("Input"),
        header_cell("File"),
        header_cell("Delimiter"),
        header_cell("Headers"),
        header_cell("Columns"),
    ]);
    apply_table_style(&mut inputs);
    align_column(&mut inputs, 2, CellAlignment::Center);
    align_column(&mut inputs, 3, CellAlignment::Center);
    align_column(&mut inputs, 4, CellAlignment::Right);
    for input in catalog.inputs() {
        inputs.add_row(vec![
            input.id().to_string(),
            input.file_name().to_string(),
            char::from(input.delimiter()).to_string(),
            if input.has_headers() { "yes" } else { "no" }.to_string(),
            input.columns().len().to_string(),
        ]);
    }

    let mut outputs = Table::new();
    outputs.set_header(vec![
        header_cell("Output"),
        header_cell("Input"),
        header_cell("File"),
        header_cell("Rule module"),
        header_cell("Columns"),
    ]);
    apply_table_style(&mut outputs);
    align_column(&mut outputs, 4, CellAlignment::Right);
    for output in catalog.outputs() {
        outputs.add_row(vec![
            output.id().to_string(),
            output.input_id().to_string(),
            output.output_file_name().to_string(),
            output.rule_module().to_string(),
            output.columns().len().to_string(),
        ]);
    }

    println!("Inputs:");
    println!("{inputs}");
    println!();
    println!("Outputs:");
    println!("{outputs}");
    Ok(())
}
