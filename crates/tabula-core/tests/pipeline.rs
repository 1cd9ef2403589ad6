//! End-to-end runs over a fixture configuration and data directory.

use std::fs;
use std::path::Path;

use tabula_core::{BatchPolicy, Pipeline, PipelineError, PipelineOptions, PipelinePaths};
use tabula_transform::RuleResolutionError;

fn write(root: &Path, name: &str, body: &str) {
    let path = root.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, body).unwrap();
}

const INPUT: &str = r#"{
    "id": "licenses",
    "file_name": "licenses.csv",
    "delimiter": ";",
    "encoding": "utf-8",
    "has_headers": true,
    "decimal_separator": ",",
    "thousands_separator": ".",
    "date_format": "%d/%m/%Y",
    "columns": [
        {"position": 1, "name": "SERIAL", "type": "integer", "nullable": false, "allow_duplicates": false},
        {"position": 2, "name": "PRODUCT", "type": "alphabetic", "nullable": false, "allow_duplicates": true},
        {"position": 3, "name": "RESELLER", "type": "alphabetic", "nullable": true, "allow_duplicates": true},
        {"position": 4, "name": "PERIOD", "type": "integer", "nullable": false, "allow_duplicates": true},
        {"position": 5, "name": "DUE", "type": "date", "nullable": true, "allow_duplicates": true},
        {"position": 6, "name": "STATUS", "type": "alphabetic", "nullable": false, "allow_duplicates": true}
    ]
}"#;

const SUMMARY: &str = r#"{
    "id": "summary",
    "input_id": "licenses",
    "output_file_name": "summary.csv",
    "rule_module": "license_rules",
    "delimiter": ";",
    "columns": [
        {"name": "SERIAL", "source": "SERIAL"},
        {"name": "CHANNEL", "compute": "channel"},
        {"name": "PRICE", "compute": "price"},
        {"name": "DUE", "source": "DUE"}
    ],
    "export_types": {"price": "numeric"}
}"#;

const SERIALS: &str = r#"{
    "id": "serials",
    "input_id": "licenses",
    "output_file_name": "serials.csv",
    "rule_module": "license_rules",
    "omit_unmapped": false,
    "columns": [{"name": "SERIAL", "source": "SERIAL"}]
}"#;

const BROKEN: &str = r#"{
    "id": "broken",
    "input_id": "licenses",
    "output_file_name": "broken.csv",
    "rule_module": "license_rules",
    "columns": [{"name": "X", "compute": "missing_fn"}]
}"#;

const RULES: &str = r#"{
    "tables": {"price": {"Pro": 1669.0, "Go": 0.0}},
    "rules": {
        "channel": {"kind": "presence", "column": "RESELLER", "blank": "FINAL", "present": "RESELLER"},
        "price": {
            "kind": "lookup", "table": "price", "key": {"column": "PRODUCT"},
            "divide_by": {"when": {"column": "PERIOD", "equals": "1"}, "divisor": 10}
        }
    },
    "exclude": [{"column": "STATUS", "equals": "CANCELLED"}]
}"#;

const DATA: &str = "SERIAL;PRODUCT;RESELLER;PERIOD;DUE;STATUS\n\
1001;Pro;;12;15/03/2024;ACTIVE\n\
1002;Pro;Acme;1;01/04/2024;ACTIVE\n\
1003;Go;;12;20/05/2024;CANCELLED\n";

fn fixture(root: &Path, outputs: &[(&str, &str)]) -> PipelinePaths {
    write(root, "config/inputs/licenses.json", INPUT);
    let mut entries = Vec::new();
    for (name, body) in outputs {
        let file = format!("outputs/{name}.json");
        write(root, &format!("config/{file}"), body);
        entries.push(format!(r#"{{"description_file": "{file}"}}"#));
    }
    write(
        root,
        "config/manifest.json",
        &format!(
            r#"{{"inputs": [{{"description_file": "inputs/licenses.json"}}], "outputs": [{}]}}"#,
            entries.join(", ")
        ),
    );
    write(root, "config/rules/license_rules.json", RULES);
    write(root, "data/incoming/licenses.csv", DATA);
    PipelinePaths::from_root(root)
}

#[test]
fn batch_writes_every_output_and_reuses_validated_input() {
    let dir = tempfile::tempdir().unwrap();
    let paths = fixture(dir.path(), &[("summary", SUMMARY), ("serials", SERIALS)]);
    let pipeline = Pipeline::load(paths.clone(), PipelineOptions::default()).unwrap();

    let report = pipeline.run_batch().unwrap();
    assert!(!report.has_errors());
    assert_eq!(report.completed.len(), 2);
    assert!(!report.completed[0].cached_input);
    assert!(report.completed[1].cached_input);
    assert_eq!(report.completed[0].source_rows, 3);
    assert_eq!(report.completed[0].excluded_rows, 1);
    assert_eq!(report.total_rows_written(), 4);

    let summary = fs::read_to_string(paths.output_dir.join("summary.csv")).unwrap();
    insta::assert_snapshot!(summary.trim_end(), @r"
    SERIAL;CHANNEL;PRICE;DUE
    1001;FINAL;1669,00;15/03/2024
    1002;RESELLER;166,90;01/04/2024
    ");

    let serials = fs::read_to_string(paths.output_dir.join("serials.csv")).unwrap();
    insta::assert_snapshot!(serials.trim_end(), @r"
    SERIAL,PRODUCT,RESELLER,PERIOD,DUE,STATUS
    1001,Pro,,12,15/03/2024,ACTIVE
    1002,Pro,Acme,1,01/04/2024,ACTIVE
    ");
}

#[test]
fn dry_run_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let paths = fixture(dir.path(), &[("summary", SUMMARY)]);
    let options = PipelineOptions {
        dry_run: true,
        ..PipelineOptions::default()
    };
    let pipeline = Pipeline::load(paths.clone(), options).unwrap();

    let report = pipeline.run_batch().unwrap();
    assert_eq!(report.completed.len(), 1);
    assert_eq!(report.completed[0].destination, None);
    assert_eq!(report.completed[0].output_rows, 2);
    assert!(!paths.output_dir.exists());
}

#[test]
fn unknown_rule_module_fails_at_setup() {
    let dir = tempfile::tempdir().unwrap();
    let orphan = SERIALS.replace("license_rules", "nope");
    let paths = fixture(dir.path(), &[("serials", &orphan)]);

    let err = Pipeline::load(paths, PipelineOptions::default()).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::RuleResolution(RuleResolutionError::MissingModule { ref module }) if module == "nope"
    ));
}

#[test]
fn fail_fast_stops_at_first_failure() {
    let dir = tempfile::tempdir().unwrap();
    let paths = fixture(dir.path(), &[("broken", BROKEN), ("serials", SERIALS)]);
    let pipeline = Pipeline::load(paths.clone(), PipelineOptions::default()).unwrap();

    let report = pipeline.run_batch().unwrap();
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].output_id, "broken");
    assert_eq!(report.failed[0].error.kind(), "rule_resolution");
    insta::assert_snapshot!(
        report.failed[0].error.to_string(),
        @"rule 'missing_fn' for output column 'X' is not defined in rule module 'license_rules'"
    );
    assert_eq!(report.skipped, vec!["serials".to_string()]);
    assert!(!paths.output_dir.join("serials.csv").exists());
    assert!(!paths.output_dir.join("broken.csv").exists());
}

#[test]
fn continue_policy_runs_remaining_pairs() {
    let dir = tempfile::tempdir().unwrap();
    let paths = fixture(dir.path(), &[("broken", BROKEN), ("serials", SERIALS)]);
    let options = PipelineOptions {
        policy: BatchPolicy::Continue,
        ..PipelineOptions::default()
    };
    let pipeline = Pipeline::load(paths.clone(), options).unwrap();

    let report = pipeline.run_batch().unwrap();
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.completed.len(), 1);
    assert!(report.skipped.is_empty());
    assert!(paths.output_dir.join("serials.csv").exists());
}

#[test]
fn missing_and_invalid_inputs_are_reported_by_kind() {
    let dir = tempfile::tempdir().unwrap();
    let paths = fixture(dir.path(), &[("serials", SERIALS)]);
    let pipeline = Pipeline::load(paths.clone(), PipelineOptions::default()).unwrap();

    fs::remove_file(paths.input_dir.join("licenses.csv")).unwrap();
    let err = pipeline.run_output("serials").unwrap_err();
    assert_eq!(err.kind(), "missing_file");

    write(
        dir.path(),
        "data/incoming/licenses.csv",
        "SERIAL;PRODUCT;RESELLER;PERIOD;DUE;STATUS\n1;Pro;;12;;ACTIVE\n1;Go;;1;;ACTIVE\n",
    );
    let err = pipeline.run_output("serials").unwrap_err();
    assert_eq!(err.kind(), "validation");
    insta::assert_snapshot!(
        err.to_string(),
        @"input 'licenses': column 'SERIAL' does not allow duplicates: '1' at rows [1, 2]"
    );

    assert!(matches!(
        pipeline.run_output("nope"),
        Err(PipelineError::UnknownOutput { .. })
    ));
}
