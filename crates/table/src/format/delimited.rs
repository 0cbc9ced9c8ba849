//! Comma-delimited interchange format
//!
//! The first record is the header: one `name` or `name:Type` label per
//! column. Each following record is one row. Cells that contain the
//! delimiter, a double quote or a line break are wrapped in double quotes,
//! with embedded quotes doubled.

use crate::error::{Error, Result};
use crate::storage::RowStore;
use crate::types::{Column, DataType, Row, Schema};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

/// Outcome of a bulk load
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    /// Rows stored
    pub imported: usize,
    /// Rows left out because they did not fit the schema
    pub skipped: usize,
}

/// One parsed record and the line it started on (1-based)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub line: usize,
    pub cells: Vec<String>,
}

/// Splits delimited text into records. Blank lines are ignored.
pub fn parse_records(input: &str, delimiter: char) -> Result<Vec<Record>> {
    let mut records = Vec::new();
    let mut cells = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut quoted = false;
    let mut line = 1;
    let mut record_line = 1;
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push(c);
                }
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' if field.is_empty() => {
                in_quotes = true;
                quoted = true;
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' => {
                cells.push(std::mem::take(&mut field));
                // An unquoted empty line is blank; `""` is a record of one empty cell
                if quoted || !(cells.len() == 1 && cells[0].is_empty()) {
                    records.push(Record {
                        line: record_line,
                        cells: std::mem::take(&mut cells),
                    });
                }
                cells.clear();
                quoted = false;
                line += 1;
                record_line = line;
            }
            c if c == delimiter => cells.push(std::mem::take(&mut field)),
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(Error::Parse(format!(
            "unterminated quoted cell in record starting on line {}",
            record_line
        )));
    }
    if quoted || !field.is_empty() || !cells.is_empty() {
        cells.push(field);
        records.push(Record {
            line: record_line,
            cells,
        });
    }

    Ok(records)
}

/// Joins cells into one record, quoting where needed. A record of one empty
/// cell is written as `""` so that it does not read back as a blank line.
pub fn format_record(cells: &[String], delimiter: char) -> String {
    if matches!(cells, [cell] if cell.is_empty()) {
        return "\"\"".to_string();
    }
    let mut out = String::new();
    for (i, cell) in cells.iter().enumerate() {
        if i > 0 {
            out.push(delimiter);
        }
        let needs_quotes = cell.contains(delimiter)
            || cell.contains('"')
            || cell.contains('\n')
            || cell.contains('\r');
        if needs_quotes {
            out.push('"');
            out.push_str(&cell.replace('"', "\"\""));
            out.push('"');
        } else {
            out.push_str(cell);
        }
    }
    out
}

/// Splits a header label into its name and optional declared type. A
/// suffix after the last `:` that is not a type name is part of the name.
pub fn parse_header_label(label: &str) -> (String, Option<DataType>) {
    if let Some((name, suffix)) = label.rsplit_once(':') {
        if let Ok(datatype) = suffix.parse::<DataType>() {
            return (name.trim().to_string(), Some(datatype));
        }
    }
    (label.trim().to_string(), None)
}

fn header_labels(schema: &Schema, typed: bool) -> Vec<String> {
    schema
        .columns()
        .iter()
        .map(|column| {
            if typed {
                format!("{}:{}", column.name, column.datatype)
            } else {
                column.name.clone()
            }
        })
        .collect()
}

/// Keeps the records that fit the schema, logging the rest.
fn accept_rows(store: &RowStore, schema: &Schema, records: Vec<Record>) -> (Vec<Row>, usize) {
    let mut rows = Vec::with_capacity(records.len());
    let mut skipped = 0;
    for record in records {
        match schema.validate_row(store.name(), &record.cells) {
            Ok(()) => rows.push(record.cells),
            Err(err) => {
                tracing::warn!(line = record.line, error = %err, "skipping row");
                skipped += 1;
            }
        }
    }
    (rows, skipped)
}

/// Loads delimited text into the store.
///
/// With `clear_existing` the header replaces the schema and the rows replace
/// the current rows. An untyped header label keeps the type of the existing
/// column with that name, or becomes a String column. Without
/// `clear_existing` the header must name the current columns in order and
/// the rows are appended.
pub fn import<R: Read>(
    store: &mut RowStore,
    mut reader: R,
    clear_existing: bool,
) -> Result<ImportSummary> {
    let mut input = String::new();
    reader.read_to_string(&mut input)?;
    let delimiter = store.config().delimiter;

    let mut records = parse_records(&input, delimiter)?.into_iter();
    let header = records
        .next()
        .ok_or_else(|| Error::Parse("missing header line".into()))?;
    let labels: Vec<_> = header
        .cells
        .iter()
        .map(|label| parse_header_label(label))
        .collect();

    let summary = if clear_existing {
        let columns = labels
            .into_iter()
            .map(|(name, datatype)| {
                let datatype = datatype
                    .or_else(|| store.schema().get_column(&name).map(|(_, c)| c.datatype))
                    .unwrap_or(DataType::String);
                Column::new(name, datatype)
            })
            .collect();
        let schema = Schema::new(columns)?;
        let (rows, skipped) = accept_rows(store, &schema, records.collect());
        let imported = rows.len();
        store.replace_schema(schema, rows);
        ImportSummary { imported, skipped }
    } else {
        let schema = store.schema().clone();
        let matches = labels.len() == schema.len()
            && labels.iter().zip(schema.columns()).all(|((name, datatype), column)| {
                *name == column.name && datatype.is_none_or(|t| t == column.datatype)
            });
        if !matches {
            return Err(Error::InvalidSchema(format!(
                "header {:?} does not match columns {}",
                header.cells, schema
            )));
        }
        let (rows, skipped) = accept_rows(store, &schema, records.collect());
        let imported = rows.len();
        for row in rows {
            store.insert(row)?;
        }
        ImportSummary { imported, skipped }
    };

    tracing::debug!(
        table = store.name(),
        imported = summary.imported,
        skipped = summary.skipped,
        clear_existing,
        "imported delimited rows"
    );
    Ok(summary)
}

/// Writes the header and every row as delimited text.
pub fn export<W: Write>(store: &RowStore, mut writer: W) -> Result<()> {
    let config = store.config();
    let header = header_labels(store.schema(), config.typed_headers);
    writeln!(writer, "{}", format_record(&header, config.delimiter))?;
    for row in store.rows() {
        writeln!(writer, "{}", format_record(row, config.delimiter))?;
    }
    writer.flush()?;
    tracing::debug!(table = store.name(), rows = store.len(), "exported delimited rows");
    Ok(())
}
