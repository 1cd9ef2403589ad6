//! Nullability check.

use tabula_model::{ColumnDefinition, InputDefinition, Table, Value};

use crate::error::{Result, ValidationError};

pub(crate) fn check(input: &InputDefinition, table: &Table, column: &ColumnDefinition) -> Result<()> {
    let Some(values) = table.column_values(column.name()) else {
        return Ok(());
    };
    let rows: Vec<usize> = values
        .enumerate()
        .filter(|(_, value)| Value::is_null(value))
        .map(|(idx, _)| idx + 1)
        .collect();
    if rows.is_empty() {
        return Ok(());
    }
    Err(ValidationError::NullValues {
        input: input.id().to_string(),
        column: column.name().to_string(),
        rows,
    })
}
