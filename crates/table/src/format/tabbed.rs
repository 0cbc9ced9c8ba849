//! Tab-delimited persisted format
//!
//! Line 1 holds the table name, line 2 the column headers, and every further
//! line one row. Cells are written tab-separated; on load a line is split on
//! any whitespace, so cells containing whitespace do not survive a save/load
//! cycle.

use super::delimited::ImportSummary;
use crate::error::{Error, Result};
use crate::storage::RowStore;
use std::io::{BufRead, Write};

/// Writes the table name, headers and rows.
pub fn save<W: Write>(store: &RowStore, mut writer: W) -> Result<()> {
    writeln!(writer, "{}", store.name())?;
    writeln!(writer, "{}", store.schema().column_names().join("\t"))?;

    let mut lossy = 0;
    for row in store.rows() {
        lossy += row
            .iter()
            .filter(|cell| cell.is_empty() || cell.contains(char::is_whitespace))
            .count();
        writeln!(writer, "{}", row.join("\t"))?;
    }
    writer.flush()?;

    if lossy > 0 {
        tracing::warn!(
            table = store.name(),
            cells = lossy,
            "saved cells that are empty or contain whitespace; they will not load back unchanged"
        );
    }
    tracing::debug!(table = store.name(), rows = store.len(), "saved table");
    Ok(())
}

/// Replaces the store's rows (and name) with the contents of a saved table.
/// The header line is read but not checked against the schema; rows that do
/// not fit the schema are skipped.
pub fn load<R: BufRead>(store: &mut RowStore, reader: R) -> Result<ImportSummary> {
    let mut lines = reader.lines();

    let name = lines
        .next()
        .transpose()?
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .ok_or_else(|| Error::Parse("missing table name line".into()))?;
    // Header line
    lines.next().transpose()?;

    let mut rows = Vec::new();
    let mut skipped = 0;
    for (offset, line) in lines.enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let row: Vec<String> = line.split_whitespace().map(str::to_string).collect();
        match store.validate(&row) {
            Ok(()) => rows.push(row),
            Err(err) => {
                tracing::warn!(line = offset + 3, error = %err, "skipping row");
                skipped += 1;
            }
        }
    }

    let summary = ImportSummary {
        imported: rows.len(),
        skipped,
    };
    store.set_name(name);
    store.replace_rows(rows);
    tracing::debug!(
        table = store.name(),
        imported = summary.imported,
        skipped = summary.skipped,
        "loaded table"
    );
    Ok(summary)
}
