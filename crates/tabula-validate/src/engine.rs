//! Validation entry point.

use tabula_ingest::RawTable;
use tabula_model::{InputDefinition, Table, Value};

use crate::checks::{check_structure, run_column_checks};
use crate::error::Result;
use crate::table::ValidatedTable;

/// Validates a raw table against its input definition.
///
/// Fails with the first violation found: column count, header row, then
/// nullability, uniqueness and type for each column in position order. On
/// success the table keeps the original row order and trimmed text; short
/// records are padded with nulls.
pub fn validate(raw: RawTable, input: &InputDefinition) -> Result<ValidatedTable> {
    let _span = tracing::debug_span!("validate", input_id = input.id()).entered();

    check_structure(&raw, input)?;

    let mut table = Table::new(input.column_names());
    for record in raw.into_records() {
        table.push_row(record.iter().map(|cell| Value::from_cell(cell)).collect());
    }

    run_column_checks(input, &table)?;

    tracing::debug!(rows = table.height(), columns = table.width(), "input admitted");
    Ok(ValidatedTable::new(input.id().to_string(), table))
}
