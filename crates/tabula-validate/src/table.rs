//! Tables admitted by the validation engine.

use tabula_model::Table;

/// A table that passed validation against its input definition.
///
/// Cells hold the original trimmed text (or `Null` for blanks); validation
/// gates admission and never coerces values. Only [`crate::validate`]
/// constructs one.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedTable {
    input_id: String,
    table: Table,
}

impl ValidatedTable {
    pub(crate) fn new(input_id: String, table: Table) -> Self {
        Self { input_id, table }
    }

    /// Id of the input definition the table was validated against.
    pub fn input_id(&self) -> &str {
        &self.input_id
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn height(&self) -> usize {
        self.table.height()
    }

    pub fn columns(&self) -> &[String] {
        self.table.columns()
    }
}
