//! Declarative rule modules.
//!
//! A module file is JSON: named lookup `tables`, named `rules` (each tagged by
//! `kind`), and an optional list of `exclude` conditions that together form
//! the module's row filter.
//!
//! ```json
//! {
//!   "module": "sales_rules",
//!   "tables": { "list_price": { "Basic": 100.0, "Pro": { "gold": 80.0 } } },
//!   "rules": {
//!     "kind":  { "kind": "presence", "column": "RESELLER", "blank": "DIRECT", "present": "RESELLER" },
//!     "price": { "kind": "lookup", "table": "list_price", "key": { "column": "PRODUCT" },
//!                "category": { "column": "TIER" },
//!                "divide_by": { "when": { "column": "PERIOD", "equals": "1" }, "divisor": 10 } }
//!   },
//!   "exclude": [ { "column": "STATUS", "equals": "CANCELLED" } ]
//! }
//! ```
//!
//! Rule kinds: `constant`, `presence`, `contains`, `equals`, `keyword`,
//! `date_format`, `lookup` and `select`. References to other rules and to
//! tables are checked when the module is loaded.

mod compile;
mod config;
mod eval;

use std::path::Path;
use std::sync::Arc;

use crate::error::RuleConfigError;
use crate::rules::{RuleModule, RuleRegistry};

use self::config::ModuleConfig;
use self::eval::{DeclaredFilter, DeclaredRule};

/// Parses a module from JSON text. `default_name` is used when the file does
/// not name the module.
pub fn parse_rule_module(
    text: &str,
    default_name: &str,
    path: &Path,
) -> Result<RuleModule, RuleConfigError> {
    let config: ModuleConfig = serde_json::from_str(text).map_err(|e| RuleConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let name = config
        .module
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(default_name)
        .to_string();

    let compiled = Arc::new(compile::compile(&name, config)?);
    let mut module = RuleModule::new(name);
    for (index, rule_name) in compiled.rule_names.iter().enumerate() {
        module.register(
            rule_name.clone(),
            DeclaredRule {
                module: Arc::clone(&compiled),
                index,
            },
        );
    }
    if !compiled.exclude.is_empty() {
        module.set_filter(DeclaredFilter {
            module: Arc::clone(&compiled),
        });
    }
    Ok(module)
}

/// Loads one module file; the module name defaults to the file stem.
pub fn load_rule_module(path: &Path) -> Result<RuleModule, RuleConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| RuleConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    parse_rule_module(&text, &stem, path)
}

/// Loads every `*.json` module in a directory, in file name order.
///
/// A missing directory yields an empty registry.
pub fn load_rule_modules(dir: &Path) -> Result<RuleRegistry, RuleConfigError> {
    let mut registry = RuleRegistry::new();
    if !dir.is_dir() {
        tracing::debug!(dir = %dir.display(), "no rule module directory");
        return Ok(registry);
    }

    let entries = std::fs::read_dir(dir).map_err(|source| RuleConfigError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| RuleConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json")) {
            paths.push(path);
        }
    }
    paths.sort();

    for path in paths {
        let module = load_rule_module(&path)?;
        let name = module.name().to_string();
        if registry.contains(&name) {
            return Err(RuleConfigError::DuplicateModule { module: name, path });
        }
        tracing::debug!(module = %name, rules = module.len(), path = %path.display(), "loaded rule module");
        registry.register(module);
    }
    Ok(registry)
}
