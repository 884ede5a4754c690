//! File-based loading tests.

use std::fs;

use tabmod_ingest::{IngestError, TableFormat, read_modifier_record, read_table, write_table};
use tabmod_model::Cell;
use tabmod_transform::{Modifier, ModifierKind, ModifierRegistry};

#[test]
fn csv_table_survives_a_write_and_read() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("prices.csv");
    fs::write(&source, "item,price\nbolt,0.25\nnut,\n").unwrap();

    let table = read_table(&source).unwrap();
    assert_eq!(
        table.column("price").unwrap(),
        [Cell::Number(0.25), Cell::Undefined]
    );

    let copy = dir.path().join("copy.csv");
    write_table(&table, &copy, TableFormat::Csv).unwrap();
    assert_eq!(read_table(&copy).unwrap(), table);
}

#[test]
fn unknown_extension_is_rejected() {
    let err = read_table(std::path::Path::new("table.xlsx")).unwrap_err();
    assert!(matches!(err, IngestError::UnsupportedFormat { .. }));
}

#[test]
fn pipeline_file_builds_a_chain() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pipeline.json");
    fs::write(
        &path,
        r#"{
            "kind": "Chain",
            "options": {},
            "modifiers": [
                {"kind": "Range", "options": {"ranges": [{"column": "price", "minValue": 0, "maxValue": 1}]}},
                {"kind": "Sort", "options": {"orderByColumn": "price"}}
            ]
        }"#,
    )
    .unwrap();

    let record = read_modifier_record(&path).unwrap();
    assert_eq!(record.known_kind(), Some(ModifierKind::Chain));
    let chain = ModifierRegistry::builtin().build(&record).unwrap().unwrap();
    let children = chain.to_record().unwrap().modifiers.unwrap();
    assert_eq!(children.len(), 2);
}

#[test]
fn malformed_pipeline_file_reports_the_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "{\"kind\":").unwrap();

    let err = read_modifier_record(&path).unwrap_err();
    assert!(err.to_string().contains("broken.json"), "{err}");
}
