//! File format of declarative rule modules.

use std::collections::BTreeMap;

use serde::Deserialize;

/// One or several column names; the first non-null column wins.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum ColumnRef {
    One(String),
    Many(Vec<String>),
}

impl ColumnRef {
    pub(crate) fn into_vec(self) -> Vec<String> {
        match self {
            ColumnRef::One(name) => vec![name],
            ColumnRef::Many(names) => names,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub(crate) fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(value) => vec![value],
            OneOrMany::Many(values) => values,
        }
    }
}

/// A value read from the row: a column, or the result of another rule.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct OperandConfig {
    pub column: Option<ColumnRef>,
    pub rule: Option<String>,
}

/// A test on an operand. Exactly one test must be given.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ConditionConfig {
    pub column: Option<ColumnRef>,
    pub rule: Option<String>,
    pub blank: Option<bool>,
    pub equals: Option<String>,
    pub equals_any: Option<Vec<String>>,
    pub starts_with: Option<String>,
    pub contains: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct KeywordConfig {
    pub any: OneOrMany,
    pub value: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct DivideConfig {
    pub when: ConditionConfig,
    pub divisor: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CaseConfig {
    pub when: ConditionConfig,
    pub rule: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub(crate) enum RuleConfig {
    /// Always the same value.
    Constant { value: serde_json::Value },
    /// One value when the column is blank, another otherwise.
    Presence {
        column: ColumnRef,
        blank: String,
        present: String,
    },
    /// Case-insensitive substring test.
    Contains {
        column: ColumnRef,
        needle: OneOrMany,
        then: String,
        #[serde(rename = "else")]
        otherwise: String,
    },
    /// Exact comparison of the trimmed text.
    Equals {
        column: ColumnRef,
        value: String,
        then: String,
        #[serde(rename = "else")]
        otherwise: String,
    },
    /// First keyword group found in the normalized text wins.
    Keyword {
        column: ColumnRef,
        keywords: Vec<KeywordConfig>,
        default: String,
    },
    /// Re-renders a date column with another pattern.
    DateFormat { column: ColumnRef, pattern: String },
    /// Numeric lookup in one of the module's tables.
    Lookup {
        table: String,
        key: OperandConfig,
        #[serde(default)]
        category: Option<OperandConfig>,
        #[serde(default)]
        divide_by: Option<DivideConfig>,
        #[serde(default)]
        decimal_separator: Option<char>,
        #[serde(default)]
        default: f64,
    },
    /// Delegates to the rule of the first matching case.
    Select {
        cases: Vec<CaseConfig>,
        default: String,
    },
}

/// Lookup table entry: a number, or numbers by category.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum TableEntry {
    Value(f64),
    ByCategory(BTreeMap<String, f64>),
}

/// A whole rule module file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ModuleConfig {
    /// Module name; defaults to the file stem.
    #[serde(default)]
    pub module: Option<String>,
    #[serde(default)]
    pub tables: BTreeMap<String, BTreeMap<String, TableEntry>>,
    #[serde(default)]
    pub rules: BTreeMap<String, RuleConfig>,
    /// A row is excluded when any condition holds.
    #[serde(default)]
    pub exclude: Vec<ConditionConfig>,
}
