//! Running input/output pairs end to end.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::time::Instant;

use tabula_ingest::{input_path, load_catalog, read_raw_table};
use tabula_model::{InputDefinition, OutputDefinition, SchemaCatalog, SchemaError};
use tabula_output::{format_table, output_path, write_table};
use tabula_transform::{ColumnDispatcher, RuleRegistry, load_rule_modules};
use tabula_validate::{ValidatedTable, validate};
use tracing::{debug, info, info_span, warn};

use crate::error::{PipelineError, Result};
use crate::paths::PipelinePaths;
use crate::report::{BatchReport, PairFailure, PairReport};

/// What a batch does when a pair fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchPolicy {
    /// Stop at the first failing pair.
    #[default]
    FailFast,
    /// Record the failure and run the remaining pairs.
    Continue,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineOptions {
    pub policy: BatchPolicy,
    /// Validate, derive and format without writing output files.
    pub dry_run: bool,
}

/// Validated inputs shared by the pairs of one batch, keyed by input id.
#[derive(Debug, Default)]
pub struct ValidatedInputs {
    tables: BTreeMap<String, ValidatedTable>,
}

impl ValidatedInputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, input_id: &str) -> Option<&ValidatedTable> {
        self.tables.get(input_id)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// Schema catalog, rule registry and directory layout, resolved once.
#[derive(Debug)]
pub struct Pipeline {
    catalog: SchemaCatalog,
    registry: RuleRegistry,
    paths: PipelinePaths,
    options: PipelineOptions,
}

impl Pipeline {
    /// Assembles a pipeline, checking that every output's rule module is
    /// registered.
    pub fn new(
        catalog: SchemaCatalog,
        registry: RuleRegistry,
        paths: PipelinePaths,
        options: PipelineOptions,
    ) -> Result<Self> {
        for output in catalog.outputs() {
            registry.resolve(output.rule_module())?;
        }
        Ok(Self {
            catalog,
            registry,
            paths,
            options,
        })
    }

    /// Loads the manifest, schema descriptions and rule modules from `paths`.
    pub fn load(paths: PipelinePaths, options: PipelineOptions) -> Result<Self> {
        let start = Instant::now();
        let catalog = load_catalog(&paths.config_dir)?;
        let registry = load_rule_modules(&paths.rules_dir)?;
        info!(
            inputs = catalog.inputs().count(),
            outputs = catalog.outputs().len(),
            rule_modules = registry.len(),
            duration_ms = start.elapsed().as_millis(),
            "configuration loaded"
        );
        Self::new(catalog, registry, paths, options)
    }

    pub fn catalog(&self) -> &SchemaCatalog {
        &self.catalog
    }

    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    pub fn paths(&self) -> &PipelinePaths {
        &self.paths
    }

    pub fn options(&self) -> PipelineOptions {
        self.options
    }

    /// Runs a single output by id.
    pub fn run_output(&self, output_id: &str) -> Result<PairReport> {
        let output = self
            .catalog
            .output(output_id)
            .ok_or_else(|| PipelineError::UnknownOutput {
                id: output_id.to_string(),
            })?;
        self.run_pair(output, &mut ValidatedInputs::new())
    }

    /// Runs every active output in manifest order under the batch policy.
    pub fn run_batch(&self) -> Result<BatchReport> {
        let batch_span = info_span!("batch", outputs = self.catalog.outputs().len());
        let _batch_guard = batch_span.enter();
        let start = Instant::now();

        if !self.options.dry_run {
            self.paths.ensure_output_dir()?;
        }

        let mut inputs = ValidatedInputs::new();
        let mut report = BatchReport::default();
        let mut outputs = self.catalog.outputs().iter();
        for output in outputs.by_ref() {
            match self.run_pair(output, &mut inputs) {
                Ok(pair) => report.completed.push(pair),
                Err(error) => {
                    warn!(
                        output_id = output.id(),
                        input_id = output.input_id(),
                        kind = error.kind(),
                        error = %error,
                        "pair failed"
                    );
                    report.failed.push(PairFailure {
                        output_id: output.id().to_string(),
                        input_id: output.input_id().to_string(),
                        error,
                    });
                    if self.options.policy == BatchPolicy::FailFast {
                        break;
                    }
                }
            }
        }
        report.skipped = outputs.map(|output| output.id().to_string()).collect();

        info!(
            completed = report.completed.len(),
            failed = report.failed.len(),
            skipped = report.skipped.len(),
            rows_written = report.total_rows_written(),
            duration_ms = start.elapsed().as_millis(),
            "batch complete"
        );
        Ok(report)
    }

    /// Runs one input/output pair, reusing a validated input when `inputs`
    /// already holds one for the output's input id.
    ///
    /// The dispatcher is built before the input is read, so a broken rule
    /// wiring fails without touching the data file.
    pub fn run_pair(&self, output: &OutputDefinition, inputs: &mut ValidatedInputs) -> Result<PairReport> {
        let input = self
            .catalog
            .input_for(output)
            .ok_or_else(|| SchemaError::UnknownInput {
                output: output.id().to_string(),
                input: output.input_id().to_string(),
            })?;
        let pair_span = info_span!("pair", output_id = output.id(), input_id = input.id());
        let _pair_guard = pair_span.enter();
        let start = Instant::now();

        let module = self.registry.resolve(output.rule_module())?;
        let dispatcher = ColumnDispatcher::new(output, input, module)?;
        debug!(
            module = module.name(),
            columns = ?dispatcher.column_names(),
            "dispatcher ready"
        );

        let cached_input = inputs.get(input.id()).is_some();
        let validated = match inputs.tables.entry(input.id().to_string()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(self.load_input(input)?),
        };

        let derive_start = Instant::now();
        let derived = dispatcher.build(validated)?;
        info!(
            source_rows = derived.source_rows(),
            excluded_rows = derived.excluded_rows(),
            output_rows = derived.height(),
            duration_ms = derive_start.elapsed().as_millis(),
            "derive complete"
        );

        let formatted = format_table(&derived, output, input)?;

        let destination = if self.options.dry_run {
            debug!("dry run, output not written");
            None
        } else {
            let write_start = Instant::now();
            let path = output_path(&self.paths.output_dir, output);
            write_table(&path, &formatted, output.delimiter())?;
            info!(
                path = %path.display(),
                rows = formatted.height(),
                duration_ms = write_start.elapsed().as_millis(),
                "write complete"
            );
            Some(path)
        };

        info!(duration_ms = start.elapsed().as_millis(), "pair complete");
        Ok(PairReport {
            output_id: output.id().to_string(),
            input_id: input.id().to_string(),
            source_rows: derived.source_rows(),
            excluded_rows: derived.excluded_rows(),
            output_rows: derived.height(),
            destination,
            cached_input,
        })
    }

    fn load_input(&self, input: &InputDefinition) -> Result<ValidatedTable> {
        let start = Instant::now();
        let path = input_path(&self.paths.input_dir, input);
        let raw = read_raw_table(&path, input)?;
        let validated = validate(raw, input)?;
        info!(
            path = %path.display(),
            rows = validated.height(),
            duration_ms = start.elapsed().as_millis(),
            "validation complete"
        );
        Ok(validated)
    }
}
