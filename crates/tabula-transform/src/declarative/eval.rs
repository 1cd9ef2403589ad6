//! Evaluation of compiled declarative rules against rows.

use std::sync::Arc;

use tabula_common::{eq_fold, fold_diacritics, format_fixed, format_with_pattern, parse_tolerant};
use tabula_model::{Row, Value};

use super::compile::{CompiledModule, Condition, Node, Operand, Test};
use super::config::TableEntry;
use crate::rules::{ComputeRule, RowFilter};

/// Folds accents and case and collapses whitespace, padded with one space on
/// each side so keywords such as `" pro "` only match whole words.
fn normalize_words(text: &str) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    format!(" {} ", fold_diacritics(&words.join(" ")).to_lowercase())
}

fn normalize_category(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// The first listed column that is present and non-null.
fn first_value<'r>(row: &Row<'r>, columns: &[String]) -> Option<&'r Value> {
    columns
        .iter()
        .filter_map(|name| row.get(name))
        .find(|value| !value.is_null())
}

fn column_text(row: &Row<'_>, columns: &[String]) -> Option<String> {
    first_value(row, columns).map(|value| value.to_text().trim().to_string())
}

impl CompiledModule {
    pub(crate) fn eval(&self, idx: usize, row: &Row<'_>) -> Value {
        match &self.nodes[idx] {
            Node::Constant(value) => value.clone(),
            Node::Presence {
                columns,
                blank,
                present,
            } => match first_value(row, columns) {
                Some(_) => Value::from(present.as_str()),
                None => Value::from(blank.as_str()),
            },
            Node::Contains {
                columns,
                needles,
                then,
                otherwise,
            } => {
                let text = column_text(row, columns).unwrap_or_default().to_lowercase();
                if needles.iter().any(|needle| text.contains(needle.as_str())) {
                    Value::from(then.as_str())
                } else {
                    Value::from(otherwise.as_str())
                }
            }
            Node::Equals {
                columns,
                value,
                then,
                otherwise,
            } => {
                if column_text(row, columns).as_deref() == Some(value.trim()) {
                    Value::from(then.as_str())
                } else {
                    Value::from(otherwise.as_str())
                }
            }
            Node::Keyword {
                columns,
                groups,
                default,
            } => {
                let text = normalize_words(&column_text(row, columns).unwrap_or_default());
                groups
                    .iter()
                    .find(|(words, _)| words.iter().any(|word| text.contains(word.as_str())))
                    .map_or_else(|| Value::from(default.as_str()), |(_, value)| Value::from(value.as_str()))
            }
            Node::DateFormat { columns, pattern } => column_text(row, columns)
                .and_then(|text| parse_tolerant(&text, None))
                .and_then(|date| format_with_pattern(&date, pattern))
                .map_or(Value::Null, Value::Text),
            Node::Lookup {
                table,
                key,
                category,
                divide_by,
                decimal_separator,
                default,
            } => {
                let mut amount = self
                    .lookup(table, key, category.as_ref(), row)
                    .unwrap_or(*default);
                if let Some((condition, divisor)) = divide_by
                    && self.holds(condition, row)
                {
                    amount /= divisor;
                }
                match decimal_separator {
                    Some(sep) => Value::Text(format_fixed(amount, 2, *sep)),
                    None => Value::Float(amount),
                }
            }
            Node::Select { cases, default } => {
                let chosen = cases
                    .iter()
                    .find(|(condition, _)| self.holds(condition, row))
                    .map_or(*default, |(_, rule)| *rule);
                self.eval(chosen, row)
            }
        }
    }

    fn operand_text(&self, operand: &Operand, row: &Row<'_>) -> Option<String> {
        match operand {
            Operand::Columns(columns) => column_text(row, columns),
            Operand::Rule(idx) => {
                let value = self.eval(*idx, row);
                (!value.is_null()).then(|| value.to_text().trim().to_string())
            }
        }
    }

    pub(crate) fn holds(&self, condition: &Condition, row: &Row<'_>) -> bool {
        let text = self.operand_text(&condition.operand, row);
        match &condition.test {
            Test::Blank(expected) => text.is_none() == *expected,
            Test::Equals(value) => text.as_deref() == Some(value.trim()),
            Test::EqualsAny(values) => text
                .as_deref()
                .is_some_and(|t| values.iter().any(|v| v.trim() == t)),
            Test::StartsWith(prefix) => text.is_some_and(|t| t.starts_with(prefix.as_str())),
            Test::Contains(needle) => {
                text.is_some_and(|t| t.to_lowercase().contains(needle.as_str()))
            }
        }
    }

    /// Reads the canonical table at evaluation time; scaled variants are
    /// derived by the caller, never stored.
    fn lookup(
        &self,
        table: &str,
        key: &Operand,
        category: Option<&Operand>,
        row: &Row<'_>,
    ) -> Option<f64> {
        let entries = self.tables.get(table)?;
        let key = self.operand_text(key, row)?;
        let entry = entries.get(&key).or_else(|| {
            entries
                .iter()
                .find(|(name, _)| eq_fold(name, &key))
                .map(|(_, entry)| entry)
        })?;
        match entry {
            TableEntry::Value(amount) => Some(*amount),
            TableEntry::ByCategory(by_category) => {
                let wanted = normalize_category(&self.operand_text(category?, row)?);
                by_category
                    .iter()
                    .find(|(name, _)| normalize_category(name) == wanted)
                    .map(|(_, amount)| *amount)
            }
        }
    }
}

/// One rule of a declarative module.
pub(crate) struct DeclaredRule {
    pub module: Arc<CompiledModule>,
    pub index: usize,
}

impl ComputeRule for DeclaredRule {
    fn compute(&self, row: &Row<'_>) -> Value {
        self.module.eval(self.index, row)
    }
}

/// Excludes a row when any of the module's exclude conditions holds.
pub(crate) struct DeclaredFilter {
    pub module: Arc<CompiledModule>,
}

impl RowFilter for DeclaredFilter {
    fn exclude(&self, row: &Row<'_>) -> bool {
        self.module
            .exclude
            .iter()
            .any(|condition| self.module.holds(condition, row))
    }
}
