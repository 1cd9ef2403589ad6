//! Column dispatcher for Tabula.
//!
//! Output tables are derived from validated inputs column by column: a column
//! either copies an input column or invokes a named [`ComputeRule`] from the
//! output's [`RuleModule`]. A module may also carry one [`RowFilter`] that
//! excludes rows before mapping.
//!
//! Rule modules live in a [`RuleRegistry`] resolved once at setup. They are
//! usually loaded from declarative JSON files (see [`declarative`]), but any
//! type implementing the traits, closures included, can be registered.

pub mod declarative;
pub mod dispatcher;
pub mod error;
pub mod rules;

pub use declarative::{load_rule_module, load_rule_modules, parse_rule_module};
pub use dispatcher::{ColumnDispatcher, ColumnOrigin, DerivedTable};
pub use error::{DispatchError, Result, RuleConfigError, RuleResolutionError};
pub use rules::{ComputeRule, RowFilter, RuleModule, RuleRegistry};
