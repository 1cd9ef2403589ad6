//! Output stage for Tabula.
//!
//! [`format_table`] renders a derived table as text under the locale
//! conventions of the input it came from, and [`write_table`] puts the result
//! on disk without ever exposing a partially written file.

pub mod error;
pub mod format;
pub mod writer;

pub use error::{OutputError, Result};
pub use format::{FormattedTable, format_table, format_value, resolve_column_type};
pub use writer::{output_path, write_table};
