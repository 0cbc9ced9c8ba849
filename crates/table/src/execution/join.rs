//! Equality joins between two tables

use crate::error::Result;
use crate::types::{ResultSet, Row, Schema};
use std::collections::HashMap;

/// Hash joiner for equijoin operations.
///
/// The right side is built into a hash table; left rows then probe it. For
/// each left row the matches come out in right-side row order, which is the
/// same output a nested loop over left then right would produce.
pub struct HashJoiner<'a> {
    /// The join column in the right table
    right_column: usize,
    /// Hash table built from the right side
    hash_table: HashMap<&'a str, Vec<&'a Row>>,
}

impl<'a> HashJoiner<'a> {
    /// Create a new hash joiner
    pub fn new(right_column: usize) -> Self {
        Self {
            right_column,
            hash_table: HashMap::new(),
        }
    }

    /// Build phase: add a row from the right side
    pub fn build(&mut self, row: &'a Row) {
        if let Some(key) = row.get(self.right_column) {
            self.hash_table.entry(key.as_str()).or_default().push(row);
        }
    }

    /// Probe phase: combine a left row with every matching right row. The
    /// right join column is left out, since the left row already has it.
    pub fn probe(&self, left_row: &Row, left_column: usize) -> Vec<Row> {
        let Some(key) = left_row.get(left_column) else {
            return Vec::new();
        };
        self.hash_table
            .get(key.as_str())
            .map(|rows| {
                rows.iter()
                    .map(|right_row| {
                        let mut joined = left_row.clone();
                        joined.extend(
                            right_row
                                .iter()
                                .enumerate()
                                .filter(|(i, _)| *i != self.right_column)
                                .map(|(_, cell)| cell.clone()),
                        );
                        joined
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Output column labels of a join: all left columns, then the right columns
/// except the join column. A right column whose name is already taken is
/// qualified as `table.column`.
pub fn join_columns(
    left: &Schema,
    right_table: &str,
    right: &Schema,
    right_column: usize,
) -> Vec<String> {
    let mut columns = left.column_names();
    for (i, column) in right.columns().iter().enumerate() {
        if i == right_column {
            continue;
        }
        if columns.contains(&column.name) {
            columns.push(format!("{}.{}", right_table, column.name));
        } else {
            columns.push(column.name.clone());
        }
    }
    columns
}

/// One side of a join
pub struct JoinInput<'a> {
    pub table: &'a str,
    pub schema: &'a Schema,
    pub rows: &'a [Row],
}

/// Joins two tables on the named column, comparing cells as exact text.
pub fn equi_join(left: JoinInput<'_>, right: JoinInput<'_>, column: &str) -> Result<ResultSet> {
    let left_column = left.schema.index_of(column)?;
    let right_column = right.schema.index_of(column)?;

    let mut joiner = HashJoiner::new(right_column);
    for row in right.rows {
        joiner.build(row);
    }

    let rows = left
        .rows
        .iter()
        .flat_map(|row| joiner.probe(row, left_column))
        .collect();

    Ok(ResultSet::new(
        join_columns(left.schema, right.table, right.schema, right_column),
        rows,
    ))
}
