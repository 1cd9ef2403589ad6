//! Turns a parsed module file into an evaluable module.
//!
//! Rule and table references are resolved to indices here, so evaluation
//! never looks anything up by a name that might not exist.

use std::collections::{BTreeMap, HashMap};

use tabula_common::{fold_diacritics, is_valid_pattern};
use tabula_model::Value;

use super::config::{ConditionConfig, ModuleConfig, OperandConfig, RuleConfig, TableEntry};
use crate::error::RuleConfigError;

#[derive(Debug)]
pub(crate) enum Operand {
    Columns(Vec<String>),
    Rule(usize),
}

#[derive(Debug)]
pub(crate) enum Test {
    Blank(bool),
    Equals(String),
    EqualsAny(Vec<String>),
    StartsWith(String),
    /// Lowercased needle.
    Contains(String),
}

#[derive(Debug)]
pub(crate) struct Condition {
    pub operand: Operand,
    pub test: Test,
}

#[derive(Debug)]
pub(crate) enum Node {
    Constant(Value),
    Presence {
        columns: Vec<String>,
        blank: String,
        present: String,
    },
    Contains {
        columns: Vec<String>,
        /// Lowercased needles.
        needles: Vec<String>,
        then: String,
        otherwise: String,
    },
    Equals {
        columns: Vec<String>,
        value: String,
        then: String,
        otherwise: String,
    },
    Keyword {
        columns: Vec<String>,
        /// Lowercased keyword groups and the value each yields.
        groups: Vec<(Vec<String>, String)>,
        default: String,
    },
    DateFormat {
        columns: Vec<String>,
        pattern: String,
    },
    Lookup {
        table: String,
        key: Operand,
        category: Option<Operand>,
        divide_by: Option<(Condition, f64)>,
        decimal_separator: Option<char>,
        default: f64,
    },
    Select {
        cases: Vec<(Condition, usize)>,
        default: usize,
    },
}

#[derive(Debug)]
pub(crate) struct CompiledModule {
    pub tables: BTreeMap<String, BTreeMap<String, TableEntry>>,
    pub rule_names: Vec<String>,
    pub nodes: Vec<Node>,
    pub exclude: Vec<Condition>,
}

struct Compiler<'c> {
    module: &'c str,
    indices: HashMap<&'c str, usize>,
    tables: &'c BTreeMap<String, BTreeMap<String, TableEntry>>,
}

impl Compiler<'_> {
    fn invalid(&self, context: impl Into<String>, message: impl Into<String>) -> RuleConfigError {
        RuleConfigError::Invalid {
            module: self.module.to_string(),
            context: context.into(),
            message: message.into(),
        }
    }

    fn rule_index(&self, rule: &str, reference: &str) -> Result<usize, RuleConfigError> {
        self.indices
            .get(reference)
            .copied()
            .ok_or_else(|| RuleConfigError::UnknownRule {
                module: self.module.to_string(),
                rule: rule.to_string(),
                reference: reference.to_string(),
            })
    }

    fn columns(&self, context: &str, names: Vec<String>) -> Result<Vec<String>, RuleConfigError> {
        let names: Vec<String> = names.into_iter().map(|n| n.trim().to_string()).collect();
        if names.is_empty() || names.iter().any(String::is_empty) {
            return Err(self.invalid(context, "column names must not be empty"));
        }
        Ok(names)
    }

    fn operand(
        &self,
        context: &str,
        rule: &str,
        column: Option<super::config::ColumnRef>,
        reference: Option<String>,
    ) -> Result<Operand, RuleConfigError> {
        match (column, reference) {
            (Some(column), None) => Ok(Operand::Columns(self.columns(context, column.into_vec())?)),
            (None, Some(reference)) => Ok(Operand::Rule(self.rule_index(rule, reference.trim())?)),
            _ => Err(self.invalid(context, "expected exactly one of `column` or `rule`")),
        }
    }

    fn operand_config(
        &self,
        context: &str,
        rule: &str,
        config: OperandConfig,
    ) -> Result<Operand, RuleConfigError> {
        self.operand(context, rule, config.column, config.rule)
    }

    fn condition(
        &self,
        context: &str,
        rule: &str,
        config: ConditionConfig,
    ) -> Result<Condition, RuleConfigError> {
        let operand = self.operand(context, rule, config.column, config.rule)?;
        let mut tests = Vec::new();
        if let Some(blank) = config.blank {
            tests.push(Test::Blank(blank));
        }
        if let Some(value) = config.equals {
            tests.push(Test::Equals(value));
        }
        if let Some(values) = config.equals_any {
            tests.push(Test::EqualsAny(values));
        }
        if let Some(prefix) = config.starts_with {
            tests.push(Test::StartsWith(prefix));
        }
        if let Some(needle) = config.contains {
            tests.push(Test::Contains(needle.to_lowercase()));
        }
        if tests.len() != 1 {
            return Err(self.invalid(
                context,
                "expected exactly one of `blank`, `equals`, `equals_any`, `starts_with`, `contains`",
            ));
        }
        let test = tests.remove(0);
        Ok(Condition { operand, test })
    }

    fn rule(&self, name: &str, config: RuleConfig) -> Result<Node, RuleConfigError> {
        let context = format!("rule '{name}'");
        let node = match config {
            RuleConfig::Constant { value } => Node::Constant(constant(&value).ok_or_else(|| {
                self.invalid(&context, "constant must be a string, number, boolean or null")
            })?),
            RuleConfig::Presence {
                column,
                blank,
                present,
            } => Node::Presence {
                columns: self.columns(&context, column.into_vec())?,
                blank,
                present,
            },
            RuleConfig::Contains {
                column,
                needle,
                then,
                otherwise,
            } => Node::Contains {
                columns: self.columns(&context, column.into_vec())?,
                needles: needle.into_vec().iter().map(|n| n.to_lowercase()).collect(),
                then,
                otherwise,
            },
            RuleConfig::Equals {
                column,
                value,
                then,
                otherwise,
            } => Node::Equals {
                columns: self.columns(&context, column.into_vec())?,
                value,
                then,
                otherwise,
            },
            RuleConfig::Keyword {
                column,
                keywords,
                default,
            } => Node::Keyword {
                columns: self.columns(&context, column.into_vec())?,
                groups: keywords
                    .into_iter()
                    .map(|k| {
                        let words = k
                            .any
                            .into_vec()
                            .iter()
                            .map(|w| fold_diacritics(w).to_lowercase())
                            .collect();
                        (words, k.value)
                    })
                    .collect(),
                default,
            },
            RuleConfig::DateFormat { column, pattern } => {
                if !is_valid_pattern(&pattern) {
                    return Err(self.invalid(&context, format!("'{pattern}' is not a valid date pattern")));
                }
                Node::DateFormat {
                    columns: self.columns(&context, column.into_vec())?,
                    pattern,
                }
            }
            RuleConfig::Lookup {
                table,
                key,
                category,
                divide_by,
                decimal_separator,
                default,
            } => {
                if !self.tables.contains_key(&table) {
                    return Err(RuleConfigError::UnknownTable {
                        module: self.module.to_string(),
                        rule: name.to_string(),
                        table,
                    });
                }
                let divide_by = match divide_by {
                    Some(divide) => {
                        if !divide.divisor.is_finite() || divide.divisor == 0.0 {
                            return Err(self.invalid(&context, "divisor must be a non-zero number"));
                        }
                        Some((self.condition(&context, name, divide.when)?, divide.divisor))
                    }
                    None => None,
                };
                Node::Lookup {
                    table,
                    key: self.operand_config(&context, name, key)?,
                    category: category
                        .map(|c| self.operand_config(&context, name, c))
                        .transpose()?,
                    divide_by,
                    decimal_separator,
                    default,
                }
            }
            RuleConfig::Select { cases, default } => Node::Select {
                cases: cases
                    .into_iter()
                    .map(|case| {
                        let condition = self.condition(&context, name, case.when)?;
                        Ok((condition, self.rule_index(name, case.rule.trim())?))
                    })
                    .collect::<Result<Vec<_>, RuleConfigError>>()?,
                default: self.rule_index(name, default.trim())?,
            },
        };
        Ok(node)
    }
}

fn constant(value: &serde_json::Value) -> Option<Value> {
    match value {
        serde_json::Value::Null => Some(Value::Null),
        serde_json::Value::Bool(b) => Some(Value::Bool(*b)),
        serde_json::Value::String(s) => Some(Value::Text(s.clone())),
        serde_json::Value::Number(n) => n
            .as_i64()
            .map(Value::Integer)
            .or_else(|| n.as_f64().map(Value::Float)),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => None,
    }
}

fn operand_dependency(operand: &Operand) -> Option<usize> {
    match operand {
        Operand::Rule(idx) => Some(*idx),
        Operand::Columns(_) => None,
    }
}

fn dependencies(node: &Node) -> Vec<usize> {
    match node {
        Node::Lookup {
            key,
            category,
            divide_by,
            ..
        } => [
            operand_dependency(key),
            category.as_ref().and_then(operand_dependency),
            divide_by
                .as_ref()
                .and_then(|(condition, _)| operand_dependency(&condition.operand)),
        ]
        .into_iter()
        .flatten()
        .collect(),
        Node::Select { cases, default } => cases
            .iter()
            .flat_map(|(condition, rule)| {
                operand_dependency(&condition.operand)
                    .into_iter()
                    .chain(std::iter::once(*rule))
            })
            .chain(std::iter::once(*default))
            .collect(),
        _ => Vec::new(),
    }
}

/// Rejects rules that depend on themselves, directly or through other rules.
fn check_cycles(module: &str, names: &[String], nodes: &[Node]) -> Result<(), RuleConfigError> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        New,
        Active,
        Done,
    }

    fn visit(idx: usize, nodes: &[Node], marks: &mut [Mark]) -> Option<usize> {
        match marks[idx] {
            Mark::Done => return None,
            Mark::Active => return Some(idx),
            Mark::New => {}
        }
        marks[idx] = Mark::Active;
        for dep in dependencies(&nodes[idx]) {
            if let Some(cycle) = visit(dep, nodes, marks) {
                return Some(cycle);
            }
        }
        marks[idx] = Mark::Done;
        None
    }

    let mut marks = vec![Mark::New; nodes.len()];
    for idx in 0..nodes.len() {
        if let Some(cycle) = visit(idx, nodes, &mut marks) {
            return Err(RuleConfigError::Cycle {
                module: module.to_string(),
                rule: names[cycle].clone(),
            });
        }
    }
    Ok(())
}

pub(crate) fn compile(name: &str, config: ModuleConfig) -> Result<CompiledModule, RuleConfigError> {
    let rule_names: Vec<String> = config.rules.keys().cloned().collect();
    let (nodes, exclude) = {
        let compiler = Compiler {
            module: name,
            indices: rule_names
                .iter()
                .enumerate()
                .map(|(idx, rule)| (rule.as_str(), idx))
                .collect(),
            tables: &config.tables,
        };
        let mut nodes = Vec::with_capacity(rule_names.len());
        for (rule_name, rule) in config.rules {
            nodes.push(compiler.rule(&rule_name, rule)?);
        }
        let exclude = config
            .exclude
            .into_iter()
            .enumerate()
            .map(|(idx, condition)| {
                compiler.condition(&format!("exclude condition #{}", idx + 1), "exclude", condition)
            })
            .collect::<Result<Vec<_>, _>>()?;
        (nodes, exclude)
    };
    check_cycles(name, &rule_names, &nodes)?;
    Ok(CompiledModule {
        tables: config.tables,
        rule_names,
        nodes,
        exclude,
    })
}
