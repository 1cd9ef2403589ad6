//! Column-set validity: positions exactly 1..N and names distinct ignoring case.

use proptest::prelude::*;
use serde_json::json;
use tabula_model::{InputDefinition, SchemaError};

fn input_with(columns: &[(i64, String)]) -> Result<InputDefinition, SchemaError> {
    let columns: Vec<_> = columns
        .iter()
        .map(|(position, name)| {
            json!({
                "position": position,
                "name": name,
                "type": "alphabetic",
                "nullable": true,
                "allow_duplicates": true
            })
        })
        .collect();
    InputDefinition::from_value(json!({
        "id": "t",
        "file_name": "t.csv",
        "delimiter": ",",
        "encoding": "utf-8",
        "has_headers": true,
        "decimal_separator": ".",
        "thousands_separator": "",
        "date_format": "%Y-%m-%d",
        "columns": columns
    }))
}

fn expected_valid(columns: &[(i64, String)]) -> bool {
    let mut positions: Vec<i64> = columns.iter().map(|(p, _)| *p).collect();
    positions.sort_unstable();
    let contiguous = positions
        .iter()
        .enumerate()
        .all(|(idx, p)| *p == idx as i64 + 1);
    let mut names: Vec<String> = columns.iter().map(|(_, n)| n.to_lowercase()).collect();
    names.sort();
    names.dedup();
    !columns.is_empty() && contiguous && names.len() == columns.len()
}

proptest! {
    #[test]
    fn validity_matches_position_and_name_rules(
        columns in prop::collection::vec((1i64..6, "[a-cA-C]{1,2}"), 1..5)
    ) {
        let result = input_with(&columns);
        prop_assert_eq!(result.is_ok(), expected_valid(&columns));
    }

    #[test]
    fn permuted_positions_are_sorted(names in prop::collection::hash_set("[a-z]{3}", 1..6)) {
        let names: Vec<String> = names.into_iter().collect();
        let n = names.len() as i64;
        let columns: Vec<(i64, String)> = names
            .iter()
            .enumerate()
            .map(|(idx, name)| (n - idx as i64, name.clone()))
            .collect();
        let input = input_with(&columns).unwrap();
        let positions: Vec<usize> = input.columns().iter().map(|c| c.position()).collect();
        prop_assert_eq!(positions, (1..=names.len()).collect::<Vec<_>>());
    }
}

#[test]
fn description_files_round_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("input.json");
    std::fs::write(
        &path,
        r#"{
            "id": "sales", "fileName": "sales.csv", "delimiter": ";", "encoding": "latin1",
            "hasHeaders": false, "decimalSeparator": ",", "thousandsSeparator": ".",
            "dateFormat": "%d/%m/%Y",
            "columns": [{"position": 1, "name": "ID", "type": "integer", "nullable": false, "allowDuplicates": false}]
        }"#,
    )
    .unwrap();
    let input = InputDefinition::from_json_file(&path).unwrap();
    assert_eq!(input.encoding(), "latin1");
    assert!(!input.has_headers());

    let missing = InputDefinition::from_json_file(&dir.path().join("nope.json")).unwrap_err();
    assert!(matches!(missing, SchemaError::Io { .. }));
}
