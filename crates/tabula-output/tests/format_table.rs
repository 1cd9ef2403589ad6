//! Formatting derived tables under the originating input's conventions.

use serde_json::json;
use tabula_ingest::read_raw_table_from_str;
use tabula_model::{ColumnType, InputDefinition, OutputColumn, OutputDefinition, Row, Value};
use tabula_output::{OutputError, format_table, output_path, write_table};
use tabula_transform::{ColumnDispatcher, DerivedTable, RuleModule};
use tabula_validate::validate;

fn input() -> InputDefinition {
    InputDefinition::from_value(json!({
        "id": "orders",
        "file_name": "orders.csv",
        "delimiter": ";",
        "encoding": "utf-8",
        "has_headers": true,
        "decimal_separator": ",",
        "thousands_separator": ".",
        "date_format": "%d/%m/%Y",
        "columns": [
            {"position": 1, "name": "ID", "type": "integer", "nullable": false, "allow_duplicates": false},
            {"position": 2, "name": "AMOUNT", "type": "numeric", "nullable": true, "allow_duplicates": true},
            {"position": 3, "name": "ISSUED", "type": "date", "nullable": true, "allow_duplicates": true},
            {"position": 4, "name": "UNITS", "type": "numeric", "nullable": true, "allow_duplicates": true}
        ]
    }))
    .unwrap()
}

const DATA: &str = "ID;AMOUNT;ISSUED;UNITS\n1;1.234,50;15/03/2024;3,00\n2;;01/12/2023;12\n";

fn derive(output: &OutputDefinition, input: &InputDefinition, module: &RuleModule) -> DerivedTable {
    let validated = validate(read_raw_table_from_str(DATA, input).unwrap(), input).unwrap();
    ColumnDispatcher::new(output, input, module)
        .unwrap()
        .build(&validated)
        .unwrap()
}

fn rules() -> RuleModule {
    RuleModule::new("orders_rules")
        .with_rule("gross", |row: &Row<'_>| {
            Value::from(row.get_str("AMOUNT").map(|amount| format!("{amount} BRL")))
        })
        .with_rule("count", |_: &Row<'_>| Value::Float(4.0))
}

#[test]
fn copied_columns_follow_input_locale() {
    let input = input();
    let output = OutputDefinition::new(
        "report",
        "orders",
        "report.csv",
        "orders_rules",
        vec![
            OutputColumn::source("ID", "ID"),
            OutputColumn::source("AMOUNT", "AMOUNT"),
            OutputColumn::source("ISSUED", "ISSUED"),
        ],
    );
    let derived = derive(&output, &input, &rules());
    let formatted = format_table(&derived, &output, &input).unwrap();

    assert_eq!(formatted.header(), ["ID", "AMOUNT", "ISSUED"]);
    assert_eq!(
        formatted.rows(),
        [
            vec!["1".to_string(), "1234,50".to_string(), "15/03/2024".to_string()],
            vec!["2".to_string(), String::new(), "01/12/2023".to_string()],
        ]
    );
}

#[test]
fn export_types_override_and_computed_columns_pass_through() {
    let input = input();
    let output = OutputDefinition::new(
        "report",
        "orders",
        "report.csv",
        "orders_rules",
        vec![
            OutputColumn::source("UNITS", "UNITS"),
            OutputColumn::compute("GROSS", "gross"),
            OutputColumn::compute("COUNT", "count"),
        ],
    )
    .with_export_type("UNITS", ColumnType::Integer)
    .with_export_type("COUNT", ColumnType::Integer);
    let derived = derive(&output, &input, &rules());
    let formatted = format_table(&derived, &output, &input).unwrap();

    let rows: Vec<Vec<&str>> = formatted
        .rows()
        .iter()
        .map(|row| row.iter().map(String::as_str).collect())
        .collect();
    assert_eq!(
        rows,
        vec![vec!["3", "1.234,50 BRL", "4"], vec!["12", "", "4"]]
    );
}

#[test]
fn mismatched_definitions_are_rejected() {
    let input = input();
    let output = OutputDefinition::new(
        "report",
        "orders",
        "report.csv",
        "orders_rules",
        vec![OutputColumn::source("ID", "ID")],
    );
    let derived = derive(&output, &input, &rules());
    let other = OutputDefinition::new(
        "other",
        "orders",
        "other.csv",
        "orders_rules",
        vec![OutputColumn::source("ID", "ID")],
    );

    let err = format_table(&derived, &other, &input).unwrap_err();
    assert!(matches!(err, OutputError::DefinitionMismatch { .. }));
}

#[test]
fn formatted_table_is_written_with_output_delimiter() {
    let input = input();
    let output = OutputDefinition::new(
        "report",
        "orders",
        "report.csv",
        "orders_rules",
        vec![OutputColumn::source("ID", "ID"), OutputColumn::source("AMOUNT", "AMOUNT")],
    )
    .with_delimiter(b'|');
    let derived = derive(&output, &input, &rules());
    let formatted = format_table(&derived, &output, &input).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = output_path(&dir.path().join("out"), &output);
    write_table(&path, &formatted, output.delimiter()).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    insta::assert_snapshot!(text.trim_end(), @r"
    ID|AMOUNT
    1|1234,50
    2|
    ");
}
