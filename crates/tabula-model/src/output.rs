//! Output table definitions.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use tabula_common::{eq_fold, fold_case};

use crate::column::ColumnType;
use crate::error::{Result, SchemaError};
use crate::payload::{delimiter, ensure_present, parse_raw, read_json_file, required};

/// Where an output column takes its values from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ColumnMapping {
    /// Copy the named input column verbatim.
    Source(String),
    /// Invoke the named rule of the output's rule module.
    Compute(String),
}

#[derive(Debug, Deserialize)]
struct RawOutputColumn {
    name: Option<String>,
    source: Option<String>,
    compute: Option<String>,
}

/// One declared column of an output table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputColumn {
    name: String,
    mapping: ColumnMapping,
}

impl OutputColumn {
    pub fn source(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mapping: ColumnMapping::Source(source.into()),
        }
    }

    pub fn compute(name: impl Into<String>, rule: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mapping: ColumnMapping::Compute(rule.into()),
        }
    }

    /// Parses an output column; exactly one of `source` or `compute` must be set.
    pub fn from_value(payload: serde_json::Value) -> Result<Self> {
        let raw: RawOutputColumn = parse_raw(payload, "output column")?;
        let name = required(raw.name, "output column", "name")?.trim().to_string();
        if name.is_empty() {
            return Err(SchemaError::invalid("output column", "name", "must not be blank"));
        }
        let mapping = match (raw.source, raw.compute) {
            (Some(_), Some(_)) => return Err(SchemaError::AmbiguousOutputColumn { name }),
            (None, None) => return Err(SchemaError::UnmappedOutputColumn { name }),
            (Some(source), None) => ColumnMapping::Source(source.trim().to_string()),
            (None, Some(rule)) => ColumnMapping::Compute(rule.trim().to_string()),
        };
        Ok(Self { name, mapping })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mapping(&self) -> &ColumnMapping {
        &self.mapping
    }

    /// The copied input column, if this is a source column.
    pub fn source_column(&self) -> Option<&str> {
        match &self.mapping {
            ColumnMapping::Source(source) => Some(source),
            ColumnMapping::Compute(_) => None,
        }
    }

    /// The rule name, if this is a computed column.
    pub fn compute_rule(&self) -> Option<&str> {
        match &self.mapping {
            ColumnMapping::Compute(rule) => Some(rule),
            ColumnMapping::Source(_) => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawOutput {
    id: Option<String>,
    #[serde(alias = "inputId")]
    input_id: Option<String>,
    #[serde(alias = "outputFileName")]
    output_file_name: Option<String>,
    #[serde(alias = "processor_module", alias = "ruleModuleReference")]
    rule_module: Option<String>,
    delimiter: Option<String>,
    #[serde(alias = "omitUnmapped")]
    omit_unmapped: Option<bool>,
    columns: Option<Vec<serde_json::Value>>,
    #[serde(default, alias = "exportTypes")]
    export_types: BTreeMap<String, String>,
}

/// Shape of one output file and how each of its columns is produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputDefinition {
    id: String,
    input_id: String,
    output_file_name: String,
    rule_module: String,
    delimiter: u8,
    omit_unmapped: bool,
    columns: Vec<OutputColumn>,
    export_types: BTreeMap<String, ColumnType>,
}

impl OutputDefinition {
    /// Builds a definition directly with the default delimiter and `omit_unmapped = true`.
    pub fn new(
        id: impl Into<String>,
        input_id: impl Into<String>,
        output_file_name: impl Into<String>,
        rule_module: impl Into<String>,
        columns: Vec<OutputColumn>,
    ) -> Self {
        Self {
            id: id.into(),
            input_id: input_id.into(),
            output_file_name: output_file_name.into(),
            rule_module: rule_module.into(),
            delimiter: b',',
            omit_unmapped: true,
            columns,
            export_types: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_omit_unmapped(mut self, omit: bool) -> Self {
        self.omit_unmapped = omit;
        self
    }

    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    #[must_use]
    pub fn with_export_type(mut self, column: impl Into<String>, column_type: ColumnType) -> Self {
        self.export_types.insert(column.into(), column_type);
        self
    }

    /// Parses an output description.
    ///
    /// Required: `id`, `input_id`, `output_file_name`, `rule_module`, `columns`.
    /// `delimiter` defaults to `,` and `omit_unmapped` to true.
    pub fn from_value(payload: serde_json::Value) -> Result<Self> {
        let raw: RawOutput = parse_raw(payload, "output definition")?;
        let entity = match &raw.id {
            Some(id) => format!("output definition '{}'", id.trim()),
            None => "output definition".to_string(),
        };
        ensure_present(
            &entity,
            &[
                ("id", raw.id.is_some()),
                ("input_id", raw.input_id.is_some()),
                ("output_file_name", raw.output_file_name.is_some()),
                ("rule_module", raw.rule_module.is_some()),
                ("columns", raw.columns.is_some()),
            ],
        )?;

        let id = required(raw.id, &entity, "id")?.trim().to_string();
        if id.is_empty() {
            return Err(SchemaError::invalid(&entity, "id", "must not be blank"));
        }
        let output_file_name = required(raw.output_file_name, &entity, "output_file_name")?
            .trim()
            .to_string();
        if output_file_name.is_empty() {
            return Err(SchemaError::invalid(&entity, "output_file_name", "must not be blank"));
        }
        let delimiter = match raw.delimiter {
            Some(value) => delimiter(&value, &entity, "delimiter")?,
            None => b',',
        };

        let columns = required(raw.columns, &entity, "columns")?
            .into_iter()
            .map(OutputColumn::from_value)
            .collect::<Result<Vec<_>>>()?;
        if columns.is_empty() {
            return Err(SchemaError::invalid(&entity, "columns", "must declare at least one column"));
        }
        let mut seen = std::collections::HashSet::new();
        for column in &columns {
            if !seen.insert(fold_case(&column.name)) {
                return Err(SchemaError::DuplicateColumnName {
                    entity: entity.clone(),
                    name: column.name.clone(),
                });
            }
        }

        let mut export_types = BTreeMap::new();
        for (key, type_name) in raw.export_types {
            let declared = columns
                .iter()
                .find(|c| eq_fold(&c.name, key.trim()))
                .ok_or_else(|| {
                    SchemaError::invalid(
                        &entity,
                        "export_types",
                        format!("'{key}' is not a declared output column"),
                    )
                })?;
            let column_type =
                ColumnType::parse(type_name.trim(), format!("export type of '{}'", declared.name))?;
            export_types.insert(declared.name.clone(), column_type);
        }

        Ok(Self {
            id,
            input_id: required(raw.input_id, &entity, "input_id")?.trim().to_string(),
            output_file_name,
            rule_module: required(raw.rule_module, &entity, "rule_module")?.trim().to_string(),
            delimiter,
            omit_unmapped: raw.omit_unmapped.unwrap_or(true),
            columns,
            export_types,
        })
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let value = serde_json::from_str(text).map_err(|e| SchemaError::Malformed {
            entity: "output definition".to_string(),
            message: e.to_string(),
        })?;
        Self::from_value(value)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        Self::from_value(read_json_file(path)?)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn input_id(&self) -> &str {
        &self.input_id
    }

    pub fn output_file_name(&self) -> &str {
        &self.output_file_name
    }

    pub fn rule_module(&self) -> &str {
        &self.rule_module
    }

    pub fn delimiter(&self) -> u8 {
        self.delimiter
    }

    pub fn omit_unmapped(&self) -> bool {
        self.omit_unmapped
    }

    pub fn columns(&self) -> &[OutputColumn] {
        &self.columns
    }

    /// Explicit type override for a column, if one was declared.
    pub fn export_type(&self, column: &str) -> Option<ColumnType> {
        self.export_types.get(column).copied()
    }

    pub fn export_types(&self) -> &BTreeMap<String, ColumnType> {
        &self.export_types
    }

    /// Names of the rules referenced by computed columns, in column order.
    pub fn compute_rules(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().filter_map(OutputColumn::compute_rule)
    }
}
