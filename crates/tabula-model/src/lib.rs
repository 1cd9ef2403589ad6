//! Tabula schema model.
//!
//! Immutable descriptions of input and output tables, built once from
//! declarative JSON descriptions, plus the row-oriented table storage shared
//! by the validation, dispatch and formatting stages.

pub mod catalog;
pub mod column;
pub mod error;
pub mod input;
pub mod output;
mod payload;
pub mod table;
pub mod value;

pub use catalog::SchemaCatalog;
pub use column::{ColumnDefinition, ColumnType};
pub use error::{Result, SchemaError, UnknownTypeError};
pub use input::InputDefinition;
pub use output::{ColumnMapping, OutputColumn, OutputDefinition};
pub use table::{Row, Table};
pub use tabula_common::LocaleConventions;
pub use value::Value;
