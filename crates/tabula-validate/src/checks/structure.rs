//! Column count and header row checks.

use tabula_ingest::RawTable;
use tabula_model::InputDefinition;

use crate::error::{Result, ValidationError};

/// Checks the raw table's shape against the declared columns.
///
/// A headerless file with no records has no shape to contradict and passes.
pub(crate) fn check(raw: &RawTable, input: &InputDefinition) -> Result<()> {
    let expected = input.columns().len();
    let has_shape = raw.headers().is_some() || raw.height() > 0;
    if has_shape && raw.column_count() != expected {
        return Err(ValidationError::ColumnCount {
            input: input.id().to_string(),
            expected,
            found: raw.column_count(),
        });
    }

    if let Some((idx, record)) = raw
        .records()
        .iter()
        .enumerate()
        .find(|(_, record)| record.len() > expected)
    {
        return Err(ValidationError::RecordTooWide {
            input: input.id().to_string(),
            row: idx + 1,
            expected,
            found: record.len(),
        });
    }

    if let Some(headers) = raw.headers() {
        let declared = input.column_names();
        if headers != declared.as_slice() {
            return Err(ValidationError::HeaderMismatch {
                input: input.id().to_string(),
                expected: declared,
                found: headers.to_vec(),
            });
        }
    }
    Ok(())
}
