//! Output table derivation.

use std::collections::HashSet;

use tabula_common::fold_case;
use tabula_model::{ColumnMapping, InputDefinition, OutputDefinition, Table, Value};
use tabula_validate::ValidatedTable;

use crate::error::{DispatchError, Result, RuleResolutionError};
use crate::rules::{ComputeRule, RowFilter, RuleModule};

/// Where the values of a derived column came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnOrigin {
    /// Copied verbatim from the named input column.
    Source(String),
    /// Produced by the named rule.
    Computed(String),
}

impl ColumnOrigin {
    /// The input column behind a copied column.
    pub fn source_column(&self) -> Option<&str> {
        match self {
            ColumnOrigin::Source(name) => Some(name),
            ColumnOrigin::Computed(_) => None,
        }
    }
}

/// Output-shaped table produced by [`ColumnDispatcher::build`].
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedTable {
    output_id: String,
    input_id: String,
    table: Table,
    origins: Vec<ColumnOrigin>,
    source_rows: usize,
    excluded_rows: usize,
}

impl DerivedTable {
    pub fn output_id(&self) -> &str {
        &self.output_id
    }

    pub fn input_id(&self) -> &str {
        &self.input_id
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Origin of each column, parallel to the table's columns.
    pub fn origins(&self) -> &[ColumnOrigin] {
        &self.origins
    }

    pub fn origin(&self, column: &str) -> Option<&ColumnOrigin> {
        let idx = self.table.column_index(column)?;
        self.origins.get(idx)
    }

    pub fn height(&self) -> usize {
        self.table.height()
    }

    /// Rows of the validated input before filtering.
    pub fn source_rows(&self) -> usize {
        self.source_rows
    }

    /// Rows removed by the module's row filter.
    pub fn excluded_rows(&self) -> usize {
        self.excluded_rows
    }
}

enum Producer<'m> {
    Copy(String),
    Compute(&'m dyn ComputeRule),
}

struct PlannedColumn<'m> {
    name: String,
    origin: ColumnOrigin,
    producer: Producer<'m>,
}

/// Builds derived tables for one output definition.
///
/// Construction resolves every computed column against the rule module, so a
/// broken wiring fails before any row is read.
pub struct ColumnDispatcher<'a> {
    output: &'a OutputDefinition,
    input: &'a InputDefinition,
    columns: Vec<PlannedColumn<'a>>,
    filter: Option<&'a dyn RowFilter>,
}

impl<'a> ColumnDispatcher<'a> {
    pub fn new(
        output: &'a OutputDefinition,
        input: &'a InputDefinition,
        module: &'a RuleModule,
    ) -> Result<Self> {
        if output.input_id() != input.id() {
            return Err(DispatchError::InputMismatch {
                output: output.id().to_string(),
                expected: output.input_id().to_string(),
                found: input.id().to_string(),
            });
        }

        let mut columns = Vec::with_capacity(output.columns().len());
        for column in output.columns() {
            let planned = match column.mapping() {
                ColumnMapping::Source(source) => {
                    let declared = input.column(source).ok_or_else(|| DispatchError::UnknownSource {
                        output: output.id().to_string(),
                        column: column.name().to_string(),
                        source_column: source.clone(),
                        input: input.id().to_string(),
                    })?;
                    PlannedColumn {
                        name: column.name().to_string(),
                        origin: ColumnOrigin::Source(declared.name().to_string()),
                        producer: Producer::Copy(declared.name().to_string()),
                    }
                }
                ColumnMapping::Compute(rule_name) => {
                    let rule = module.rule(rule_name).ok_or_else(|| {
                        RuleResolutionError::MissingFunction {
                            function: rule_name.clone(),
                            module: module.name().to_string(),
                            column: column.name().to_string(),
                        }
                    })?;
                    PlannedColumn {
                        name: column.name().to_string(),
                        origin: ColumnOrigin::Computed(rule_name.clone()),
                        producer: Producer::Compute(rule),
                    }
                }
            };
            columns.push(planned);
        }

        if !output.omit_unmapped() {
            append_unmapped(&mut columns, input);
        }

        tracing::debug!(
            output_id = output.id(),
            module = module.name(),
            columns = columns.len(),
            has_filter = module.filter().is_some(),
            "resolved output columns"
        );

        Ok(Self {
            output,
            input,
            columns,
            filter: module.filter(),
        })
    }

    /// Output column names in derived order.
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Derives the output table from a validated input.
    ///
    /// Rows the filter excludes are dropped; the rest keep their relative
    /// order and are re-indexed from zero.
    pub fn build(&self, validated: &ValidatedTable) -> Result<DerivedTable> {
        if validated.input_id() != self.input.id() {
            return Err(DispatchError::InputMismatch {
                output: self.output.id().to_string(),
                expected: self.input.id().to_string(),
                found: validated.input_id().to_string(),
            });
        }
        let source = validated.table();

        let mut copy_indices = Vec::with_capacity(self.columns.len());
        for column in &self.columns {
            let idx = match &column.producer {
                Producer::Copy(name) => {
                    Some(source.column_index(name).ok_or_else(|| DispatchError::UnknownSource {
                        output: self.output.id().to_string(),
                        column: column.name.clone(),
                        source_column: name.clone(),
                        input: self.input.id().to_string(),
                    })?)
                }
                Producer::Compute(_) => None,
            };
            copy_indices.push(idx);
        }

        let mut table = Table::new(self.column_names());
        let mut excluded_rows = 0usize;
        for row in source.rows() {
            if self.filter.is_some_and(|filter| filter.exclude(&row)) {
                excluded_rows += 1;
                continue;
            }
            let values = row.values();
            let cells: Vec<Value> = self
                .columns
                .iter()
                .zip(&copy_indices)
                .map(|(column, idx)| match (&column.producer, idx) {
                    (Producer::Copy(_), Some(idx)) => values[*idx].clone(),
                    (Producer::Compute(rule), _) => rule.compute(&row),
                    (Producer::Copy(_), None) => Value::Null,
                })
                .collect();
            table.push_row(cells);
        }

        Ok(DerivedTable {
            output_id: self.output.id().to_string(),
            input_id: self.input.id().to_string(),
            origins: self.columns.iter().map(|c| c.origin.clone()).collect(),
            source_rows: source.height(),
            excluded_rows,
            table,
        })
    }
}

/// Appends input columns that are neither copied already nor shadowed by an
/// output column name, in input order.
fn append_unmapped(columns: &mut Vec<PlannedColumn<'_>>, input: &InputDefinition) {
    let copied: HashSet<String> = columns
        .iter()
        .filter_map(|c| c.origin.source_column())
        .map(fold_case)
        .collect();
    let names: HashSet<String> = columns.iter().map(|c| fold_case(&c.name)).collect();
    for column in input.columns() {
        let key = fold_case(column.name());
        if copied.contains(&key) || names.contains(&key) {
            continue;
        }
        columns.push(PlannedColumn {
            name: column.name().to_string(),
            origin: ColumnOrigin::Source(column.name().to_string()),
            producer: Producer::Copy(column.name().to_string()),
        });
    }
}
