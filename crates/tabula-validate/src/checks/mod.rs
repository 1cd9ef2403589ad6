//! Validation check modules.
//!
//! Each module performs one kind of check and returns the first violation.

mod datatype;
mod nullability;
mod structure;
mod uniqueness;

use tabula_model::{ColumnDefinition, InputDefinition, Table};

use crate::error::Result;

pub use datatype::is_readable_text;
pub(crate) use structure::check as check_structure;

/// Runs the per-column checks for every declared column, in position order.
pub(crate) fn run_column_checks(input: &InputDefinition, table: &Table) -> Result<()> {
    for column in input.columns() {
        check_column(input, table, column)?;
    }
    Ok(())
}

fn check_column(input: &InputDefinition, table: &Table, column: &ColumnDefinition) -> Result<()> {
    // 1. Nullability
    if !column.is_nullable() {
        nullability::check(input, table, column)?;
    }

    // 2. Uniqueness (nulls are not compared)
    if !column.allows_duplicates() {
        uniqueness::check(input, table, column)?;
    }

    // 3. Type conformance of non-null values
    datatype::check(input, table, column)
}
