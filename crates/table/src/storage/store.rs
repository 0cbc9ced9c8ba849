//! Row store: the schema, the ordered rows and the indexes derived from them
//!
//! Every mutation goes through this type so that rows are validated before
//! they are stored and indexes are repaired after they change. A rejected
//! mutation leaves the store untouched.

use crate::config::{IndexMaintenance, TableConfig};
use crate::error::{Error, Result};
use crate::execution::select;
use crate::storage::index::IndexManager;
use crate::types::{Row, Schema};
use std::cmp::Ordering;

#[derive(Debug, Clone)]
pub struct RowStore {
    name: String,
    schema: Schema,
    rows: Vec<Row>,
    indexes: IndexManager,
    config: TableConfig,
}

impl RowStore {
    pub fn new(name: String, schema: Schema, config: TableConfig) -> Result<Self> {
        if name.is_empty() {
            return Err(Error::InvalidSchema("Table name cannot be empty".into()));
        }
        let indexes = IndexManager::with_identifier(&schema, &config.id_column);
        Ok(Self {
            name,
            schema,
            rows: Vec::new(),
            indexes,
            config,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: String) {
        self.name = name;
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    pub fn indexes(&self) -> &IndexManager {
        &self.indexes
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, position: usize) -> Result<&Row> {
        self.rows.get(position).ok_or(Error::RowNotFound(position))
    }

    /// Checks a row's shape and cell types without storing it.
    pub fn validate(&self, row: &Row) -> Result<()> {
        self.schema.validate_row(&self.name, row)
    }

    /// Appends a row and returns its position.
    pub fn insert(&mut self, row: Row) -> Result<usize> {
        self.validate(&row)?;
        let position = self.rows.len();
        self.indexes.row_inserted(position, &row);
        self.rows.push(row);
        Ok(position)
    }

    /// Replaces the row at `position`.
    pub fn update(&mut self, position: usize, row: Row) -> Result<()> {
        self.validate(&row)?;
        let slot = self
            .rows
            .get_mut(position)
            .ok_or(Error::RowNotFound(position))?;
        let old = std::mem::replace(slot, row);
        self.indexes.row_updated(position, &old, &self.rows[position]);
        Ok(())
    }

    /// Removes the row at `position`, shifting later rows down.
    pub fn delete(&mut self, position: usize) -> Result<Row> {
        if position >= self.rows.len() {
            return Err(Error::RowNotFound(position));
        }
        let row = self.rows.remove(position);
        self.positions_shifted();
        Ok(row)
    }

    /// Removes several rows at once. Positions are removed from highest to
    /// lowest so that earlier positions stay valid; duplicates count once.
    pub fn delete_positions(&mut self, mut positions: Vec<usize>) -> Result<usize> {
        positions.sort_unstable_by(|a, b| b.cmp(a));
        positions.dedup();
        if let Some(&highest) = positions.first() {
            if highest >= self.rows.len() {
                return Err(Error::RowNotFound(highest));
            }
        }
        for &position in &positions {
            self.rows.remove(position);
        }
        if !positions.is_empty() {
            self.positions_shifted();
        }
        Ok(positions.len())
    }

    /// Sets `target_column` to `new_value` on every row whose `match_column`
    /// equals `match_value`. Returns the number of rows changed.
    pub fn update_where(
        &mut self,
        match_column: &str,
        match_value: &str,
        target_column: &str,
        new_value: &str,
    ) -> Result<usize> {
        let match_pos = self.schema.index_of(match_column)?;
        let target_pos = self.schema.index_of(target_column)?;
        let target = &self.schema.columns()[target_pos];
        target.datatype.check(&target.name, new_value)?;

        let mut updated = 0;
        for position in 0..self.rows.len() {
            if self.rows[position][match_pos] != match_value {
                continue;
            }
            let old = self.rows[position].clone();
            self.rows[position][target_pos] = new_value.to_string();
            self.indexes.row_updated(position, &old, &self.rows[position]);
            updated += 1;
        }
        Ok(updated)
    }

    /// Removes every row whose `column` equals `value`. Returns the number
    /// of rows removed.
    pub fn delete_where(&mut self, column: &str, value: &str) -> Result<usize> {
        let pos = self.schema.index_of(column)?;
        let before = self.rows.len();
        self.rows.retain(|row| row[pos] != value);
        let removed = before - self.rows.len();
        if removed > 0 {
            self.positions_shifted();
        }
        Ok(removed)
    }

    /// Replaces the whole row sequence. Rows are assumed validated.
    pub fn replace_rows(&mut self, rows: Vec<Row>) {
        self.rows = rows;
        self.positions_shifted();
    }

    /// Replaces schema and rows together, re-resolving indexes.
    pub fn replace_schema(&mut self, schema: Schema, rows: Vec<Row>) {
        self.schema = schema;
        self.rows = rows;
        self.indexes
            .rebind(&self.schema, &self.config.id_column, &self.rows);
    }

    /// Stable in-place sort.
    pub fn sort_rows<F>(&mut self, compare: F)
    where
        F: FnMut(&Row, &Row) -> Ordering,
    {
        self.rows.sort_by(compare);
        self.positions_shifted();
    }

    fn positions_shifted(&mut self) {
        self.indexes.invalidate();
        if self.config.index_maintenance == IndexMaintenance::Eager {
            self.indexes.rebuild(&self.rows);
        }
    }

    pub fn create_index(&mut self, column: &str) -> Result<()> {
        self.indexes.create_index(&self.schema, column, &self.rows)
    }

    pub fn create_composite_index(&mut self, first: &str, second: &str) -> Result<()> {
        self.indexes
            .create_composite(&self.schema, first, second, &self.rows)
    }

    pub fn drop_index(&mut self, column: &str) -> Result<()> {
        self.indexes.drop_index(column)
    }

    /// Positions of rows whose `column` cell equals `value`, in row order.
    /// Served from a hash index or the identifier index when one covers the
    /// column, otherwise by a full scan.
    pub fn lookup_positions(&mut self, column: &str, value: &str) -> Result<Vec<usize>> {
        self.schema.index_of(column)?;
        self.indexes.refresh(&self.rows);

        if let Some(positions) = self.indexes.lookup(column, value) {
            return Ok(positions);
        }
        if column == self.config.id_column {
            if let Some(positions) = self.indexes.lookup_identifier(value, "") {
                return Ok(positions);
            }
        }
        select::scan_equal(&self.schema, &self.rows, column, value)
    }

    /// Positions of rows whose identifier cell equals `id`, paired with an
    /// empty secondary key.
    pub fn lookup_identifier(&mut self, id: &str, secondary: &str) -> Result<Vec<usize>> {
        self.indexes.refresh(&self.rows);
        self.indexes
            .lookup_identifier(id, secondary)
            .ok_or_else(|| Error::ColumnNotFound(self.config.id_column.clone()))
    }

    /// Positions of rows matching a `(first, second)` pair, through the
    /// composite index when one exists, otherwise by a scan.
    pub fn lookup_pair(
        &mut self,
        first: &str,
        second: &str,
        first_value: &str,
        second_value: &str,
    ) -> Result<Vec<usize>> {
        let first_pos = self.schema.index_of(first)?;
        let second_pos = self.schema.index_of(second)?;
        self.indexes.refresh(&self.rows);

        if let Some(positions) = self
            .indexes
            .lookup_pair(first, second, first_value, second_value)
        {
            return Ok(positions);
        }
        Ok(self
            .rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row[first_pos] == first_value && row[second_pos] == second_value)
            .map(|(position, _)| position)
            .collect())
    }

    /// Clones the rows at the given positions.
    pub fn rows_at(&self, positions: &[usize]) -> Vec<Row> {
        positions
            .iter()
            .filter_map(|&position| self.rows.get(position).cloned())
            .collect()
    }
}
