//! Validation engine for Tabula.
//!
//! [`validate`] admits a [`RawTable`](tabula_ingest::RawTable) against its
//! [`InputDefinition`](tabula_model::InputDefinition) or fails with the first
//! violation found. Checks run in a fixed order: structure (column count and
//! header row), then for each column in position order nullability,
//! uniqueness and type conformance.

mod checks;
pub mod engine;
pub mod error;
pub mod table;

pub use checks::is_readable_text;
pub use engine::validate;
pub use error::{DuplicateValue, InvalidValue, Result, ValidationError};
pub use table::ValidatedTable;
