//! Cross-entity checks over the active schemas.

use std::collections::BTreeMap;

use crate::error::{Result, SchemaError};
use crate::input::InputDefinition;
use crate::output::OutputDefinition;

/// Active input and output definitions, wired together by `input_id`.
#[derive(Debug, Clone, Default)]
pub struct SchemaCatalog {
    inputs: BTreeMap<String, InputDefinition>,
    outputs: Vec<OutputDefinition>,
}

impl SchemaCatalog {
    /// Assembles a catalog.
    ///
    /// Fails when ids collide, when an output references an unknown input, or
    /// when a source column is not declared by the referenced input.
    pub fn new(inputs: Vec<InputDefinition>, outputs: Vec<OutputDefinition>) -> Result<Self> {
        let mut by_id = BTreeMap::new();
        for input in inputs {
            let id = input.id().to_string();
            if by_id.contains_key(&id) {
                return Err(SchemaError::DuplicateInputId { id });
            }
            by_id.insert(id, input);
        }

        let mut output_ids = std::collections::HashSet::new();
        for output in &outputs {
            if !output_ids.insert(output.id()) {
                return Err(SchemaError::DuplicateOutputId {
                    id: output.id().to_string(),
                });
            }
            let input = by_id
                .get(output.input_id())
                .ok_or_else(|| SchemaError::UnknownInput {
                    output: output.id().to_string(),
                    input: output.input_id().to_string(),
                })?;
            for column in output.columns() {
                if let Some(source) = column.source_column()
                    && input.column(source).is_none()
                {
                    return Err(SchemaError::UnknownSourceColumn {
                        output: output.id().to_string(),
                        column: column.name().to_string(),
                        source_column: source.to_string(),
                        input: input.id().to_string(),
                    });
                }
            }
        }

        Ok(Self {
            inputs: by_id,
            outputs,
        })
    }

    pub fn input(&self, id: &str) -> Option<&InputDefinition> {
        self.inputs.get(id)
    }

    /// Inputs ordered by id.
    pub fn inputs(&self) -> impl Iterator<Item = &InputDefinition> {
        self.inputs.values()
    }

    /// Outputs in declaration order.
    pub fn outputs(&self) -> &[OutputDefinition] {
        &self.outputs
    }

    pub fn output(&self, id: &str) -> Option<&OutputDefinition> {
        self.outputs.iter().find(|o| o.id() == id)
    }

    /// The input an output derives from. Always present for catalog members.
    pub fn input_for(&self, output: &OutputDefinition) -> Option<&InputDefinition> {
        self.inputs.get(output.input_id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputColumn;
    use serde_json::json;

    fn input(id: &str) -> InputDefinition {
        InputDefinition::from_value(json!({
            "id": id,
            "file_name": format!("{id}.csv"),
            "delimiter": ",",
            "encoding": "utf-8",
            "has_headers": true,
            "decimal_separator": ".",
            "thousands_separator": "",
            "date_format": "%Y-%m-%d",
            "columns": [
                {"position": 1, "name": "ID", "type": "integer", "nullable": false, "allow_duplicates": false}
            ]
        }))
        .unwrap()
    }

    #[test]
    fn wires_outputs_to_inputs() {
        let output = OutputDefinition::new("out", "a", "out.csv", "m", vec![OutputColumn::source("ID", "id")]);
        let catalog = SchemaCatalog::new(vec![input("a")], vec![output]).unwrap();
        let output = &catalog.outputs()[0];
        assert_eq!(catalog.input_for(output).map(InputDefinition::id), Some("a"));
    }

    #[test]
    fn rejects_duplicate_inputs() {
        let err = SchemaCatalog::new(vec![input("a"), input("a")], vec![]).unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateInputId { ref id } if id == "a"));
    }

    #[test]
    fn rejects_unknown_input_and_source() {
        let output = OutputDefinition::new("out", "b", "out.csv", "m", vec![OutputColumn::source("ID", "ID")]);
        let err = SchemaCatalog::new(vec![input("a")], vec![output]).unwrap_err();
        assert_eq!(err.to_string(), "output 'out' references unknown input_id 'b'");

        let output = OutputDefinition::new("out", "a", "out.csv", "m", vec![OutputColumn::source("X", "NOPE")]);
        let err = SchemaCatalog::new(vec![input("a")], vec![output]).unwrap_err();
        assert!(matches!(err, SchemaError::UnknownSourceColumn { .. }));
    }
}
