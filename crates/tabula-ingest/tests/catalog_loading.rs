//! Manifest-driven catalog loading against a fixture configuration directory.

use std::fs;
use std::path::Path;

use tabula_ingest::{IngestError, load_catalog};
use tabula_model::SchemaError;

fn write(dir: &Path, name: &str, body: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, body).unwrap();
}

const INPUT: &str = r#"{
    "id": "sales",
    "file_name": "sales.csv",
    "delimiter": ";",
    "encoding": "utf-8",
    "has_headers": true,
    "decimal_separator": ",",
    "thousands_separator": ".",
    "date_format": "%d/%m/%Y",
    "columns": [
        {"position": 1, "name": "ID", "type": "integer", "nullable": false, "allow_duplicates": false},
        {"position": 2, "name": "PRICE", "type": "numeric", "nullable": true, "allow_duplicates": true}
    ]
}"#;

const OUTPUT: &str = r#"{
    "id": "report",
    "input_id": "sales",
    "output_file_name": "report.csv",
    "processor_module": "sales_rules",
    "columns": [{"name": "ID", "source": "ID"}, {"name": "KIND", "compute": "kind"}]
}"#;

#[test]
fn loads_active_entries_only() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "inputs/sales.json", INPUT);
    write(dir.path(), "outputs/report.json", OUTPUT);
    write(
        dir.path(),
        "manifest.json",
        r#"{
            "inputs": [
                {"active": true, "description_file": "inputs/sales.json"},
                {"active": false, "description_file": "inputs/never-read.json"}
            ],
            "outputs": [{"description_file": "outputs/report.json"}]
        }"#,
    );

    let catalog = load_catalog(dir.path()).unwrap();
    assert_eq!(catalog.inputs().count(), 1);
    assert_eq!(catalog.outputs().len(), 1);
    let output = &catalog.outputs()[0];
    assert_eq!(output.rule_module(), "sales_rules");
    assert_eq!(catalog.input_for(output).unwrap().file_name(), "sales.csv");
}

#[test]
fn output_referencing_inactive_input_fails() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "inputs/sales.json", INPUT);
    write(dir.path(), "outputs/report.json", OUTPUT);
    write(
        dir.path(),
        "manifest.json",
        r#"{
            "inputs": [{"active": false, "description_file": "inputs/sales.json"}],
            "outputs": [{"description_file": "outputs/report.json"}]
        }"#,
    );

    let err = load_catalog(dir.path()).unwrap_err();
    assert!(matches!(err, IngestError::Schema(SchemaError::UnknownInput { .. })));
}

#[test]
fn missing_description_file_is_reported_with_path() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "manifest.json",
        r#"{"inputs": [{"description_file": "inputs/absent.json"}], "outputs": []}"#,
    );
    let err = load_catalog(dir.path()).unwrap_err();
    assert!(err.to_string().contains("absent.json"), "{err}");
}
