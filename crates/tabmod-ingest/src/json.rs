//! Native JSON tables and serialized modifier records.

use std::io::{BufWriter, Write};
use std::path::Path;

use tabmod_model::Table;
use tabmod_transform::ModifierRecord;
use tracing::debug;

use crate::error::{IngestError, Result};

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| IngestError::FileRead {
        path: path.to_path_buf(),
        source,
    })
}

/// Read a `{"columns":[{"name":..,"cells":[..]}]}` document.
pub fn read_json_table(path: &Path) -> Result<Table> {
    let text = read_text(path)?;
    let table: Table = serde_json::from_str(&text).map_err(|source| IngestError::TableJson {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(
        path = %path.display(),
        columns = table.column_count(),
        rows = table.row_count(),
        "loaded JSON table"
    );
    Ok(table)
}

/// Write a table as pretty JSON.
pub fn write_json_table(table: &Table, path: &Path) -> Result<()> {
    ensure_finite(table, path)?;
    let file = std::fs::File::create(path).map_err(|source| IngestError::FileWrite {
        path: path.to_path_buf(),
        source,
    })?;
    write_json_to(table, BufWriter::new(file), path)?;
    debug!(path = %path.display(), rows = table.row_count(), "wrote JSON table");
    Ok(())
}

/// Write pretty JSON to any writer. `path` only labels errors.
///
/// Tables holding NaN or infinite numbers are refused instead of being
/// written with `null` in their place.
pub fn write_json_to<W: Write>(table: &Table, mut writer: W, path: &Path) -> Result<()> {
    ensure_finite(table, path)?;
    serde_json::to_writer_pretty(&mut writer, table).map_err(|source| IngestError::TableJson {
        path: path.to_path_buf(),
        source,
    })?;
    writeln!(writer)
        .and_then(|()| writer.flush())
        .map_err(|source| IngestError::FileWrite {
            path: path.to_path_buf(),
            source,
        })
}

fn ensure_finite(table: &Table, path: &Path) -> Result<()> {
    match table.first_non_finite() {
        Some((column, row)) => Err(IngestError::NonFiniteCell {
            column: column.to_string(),
            row,
            path: path.to_path_buf(),
        }),
        None => Ok(()),
    }
}

/// Read a serialized modifier record, such as a pipeline file.
pub fn read_modifier_record(path: &Path) -> Result<ModifierRecord> {
    let text = read_text(path)?;
    let record = ModifierRecord::from_json(&text).map_err(|source| IngestError::Record {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), kind = %record.kind, "loaded modifier record");
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabmod_model::Cell;

    #[test]
    fn test_json_table_round_trip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("table.json");
        let nested = Table::from_columns([("inner", vec![Cell::from(1)])]);
        let table = Table::from_columns([
            ("k", vec![Cell::from("a"), Cell::Undefined]),
            ("t", vec![Cell::table(nested), Cell::from(false)]),
        ]);

        write_json_table(&table, &path).unwrap();
        assert_eq!(read_json_table(&path).unwrap(), table);
    }

    #[test]
    fn test_non_finite_cells_are_not_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nan.json");
        let table = Table::from_columns([
            ("k", vec![Cell::from("a"), Cell::from("b")]),
            ("v", vec![Cell::from(1), Cell::Number(f64::NAN)]),
        ]);

        let err = write_json_table(&table, &path).unwrap_err();
        assert!(!path.exists());
        assert!(
            matches!(&err, IngestError::NonFiniteCell { column, row: 1, .. } if column == "v"),
            "{err}"
        );

        let mut buffer = Vec::new();
        let nested = Table::from_columns([("t", vec![Cell::table(table)])]);
        assert!(write_json_to(&nested, &mut buffer, Path::new("<buffer>")).is_err());
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_ragged_json_table_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(
            &path,
            r#"{"columns":[{"name":"a","cells":[1,2]},{"name":"b","cells":[1]}]}"#,
        )
        .unwrap();
        let err = read_json_table(&path).unwrap_err();
        assert!(matches!(err, IngestError::TableJson { .. }));
    }

    #[test]
    fn test_missing_record_file() {
        let err = read_modifier_record(Path::new("/nonexistent/pipeline.json")).unwrap_err();
        assert!(matches!(err, IngestError::FileRead { .. }));
    }
}
