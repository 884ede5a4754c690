//! CSV tables.
//!
//! The first non-blank record is the header. Data cells go through
//! [`infer_cell`]: blank cells become `Undefined`, numbers and booleans are
//! recognized, everything else stays text.

use std::collections::HashSet;
use std::io::{Read, Write};
use std::path::Path;

use csv::{ReaderBuilder, WriterBuilder};
use tabmod_common::infer_cell;
use tabmod_model::{Cell, Column, Row, Table};
use tracing::debug;

use crate::error::{IngestError, Result};

fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    trimmed.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_blank(record: &csv::StringRecord) -> bool {
    record.iter().all(|value| value.trim().is_empty())
}

/// Read a CSV file into a table.
pub fn read_csv_table(path: &Path) -> Result<Table> {
    let file = std::fs::File::open(path).map_err(|source| IngestError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let table = read_csv_from(file, path)?;
    debug!(
        path = %path.display(),
        columns = table.column_count(),
        rows = table.row_count(),
        "loaded CSV table"
    );
    Ok(table)
}

/// Read CSV text from any reader. `path` only labels errors.
pub fn read_csv_from<R: Read>(reader: R, path: &Path) -> Result<Table> {
    let csv_error = |source| IngestError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut headers: Option<Vec<String>> = None;
    let mut rows: Vec<Row> = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        if is_blank(&record) {
            continue;
        }
        match &headers {
            None => headers = Some(header_names(&record, path)?),
            Some(_) => rows.push(record.iter().map(infer_cell).collect()),
        }
    }

    let mut table = Table::new();
    table.set_columns(
        headers
            .unwrap_or_default()
            .into_iter()
            .map(|name| Column::new(name, Vec::new())),
    );
    table.set_rows(rows, None);
    Ok(table)
}

fn header_names(record: &csv::StringRecord, path: &Path) -> Result<Vec<String>> {
    let mut seen = HashSet::new();
    let mut names = Vec::with_capacity(record.len());
    for raw in record {
        let name = normalize_header(raw);
        if !seen.insert(name.clone()) {
            return Err(IngestError::DuplicateHeader {
                column: name,
                path: path.to_path_buf(),
            });
        }
        names.push(name);
    }
    Ok(names)
}

/// Write a table as CSV with a header row. `Undefined` cells are empty.
pub fn write_csv_table(table: &Table, path: &Path) -> Result<()> {
    let file = std::fs::File::create(path).map_err(|source| IngestError::FileWrite {
        path: path.to_path_buf(),
        source,
    })?;
    write_csv_to(table, file, path)?;
    debug!(path = %path.display(), rows = table.row_count(), "wrote CSV table");
    Ok(())
}

/// Write CSV text to any writer. `path` only labels errors.
pub fn write_csv_to<W: Write>(table: &Table, writer: W, path: &Path) -> Result<()> {
    if let Some(column) = table.columns().iter().find(|c| c.cells.iter().any(Cell::is_table)) {
        return Err(IngestError::NestedTable {
            column: column.name.clone(),
            path: path.to_path_buf(),
        });
    }
    let csv_error = |source| IngestError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = WriterBuilder::new().from_writer(writer);
    writer
        .write_record(table.columns().iter().map(|c| c.name.as_str()))
        .map_err(csv_error)?;
    for index in 0..table.row_count() {
        let row = table.row(index).unwrap_or_default();
        writer
            .write_record(row.iter().map(ToString::to_string))
            .map_err(csv_error)?;
    }
    writer.flush().map_err(|source| IngestError::FileWrite {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Table {
        read_csv_from(text.as_bytes(), Path::new("inline.csv")).unwrap()
    }

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header("\u{feff} Unit   Price "), "Unit Price");
    }

    #[test]
    fn test_infers_cell_types() {
        let table = parse("name,qty,ok\nbolt, 4 ,true\nnut,,FALSE\n");
        assert_eq!(table.column_names(), ["name", "qty", "ok"]);
        assert_eq!(
            table.column("qty").unwrap(),
            [Cell::Number(4.0), Cell::Undefined]
        );
        assert_eq!(
            table.column("ok").unwrap(),
            [Cell::Boolean(true), Cell::Boolean(false)]
        );
    }

    #[test]
    fn test_short_rows_are_padded_and_blank_rows_skipped() {
        let table = parse("a,b\n\n1\n,\n2,3\n");
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column("b").unwrap(), [Cell::Undefined, Cell::Number(3.0)]);
    }

    #[test]
    fn test_duplicate_header_is_rejected() {
        let err = read_csv_from("a, a\n1,2\n".as_bytes(), Path::new("dup.csv")).unwrap_err();
        assert!(matches!(err, IngestError::DuplicateHeader { column, .. } if column == "a"));
    }

    #[test]
    fn test_write_blanks_undefined() {
        let table = Table::from_columns([
            ("x", vec![Cell::from(1.5), Cell::Undefined]),
            ("y", vec![Cell::from("a"), Cell::from(true)]),
        ]);
        let mut out = Vec::new();
        write_csv_to(&table, &mut out, Path::new("out.csv")).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "x,y\n1.5,a\n,true\n");
    }

    #[test]
    fn test_write_rejects_nested_tables() {
        let table = Table::from_columns([("t", vec![Cell::table(Table::new())])]);
        let err = write_csv_to(&table, Vec::new(), Path::new("out.csv")).unwrap_err();
        assert!(matches!(err, IngestError::NestedTable { .. }));
    }
}
