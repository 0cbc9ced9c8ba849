//! Secondary index management
//!
//! Indexes map cell text to the set of row positions holding it. Because a
//! row's identity is its position, any mutation that shifts positions
//! (deletes, sorts, bulk loads) leaves every index stale. The manager tracks
//! that: appends and in-place updates are applied incrementally, while
//! position shifts mark the manager stale until [`IndexManager::rebuild`] is
//! called. Lookups must go through [`IndexManager::refresh`] first.

use crate::error::{Error, Result};
use crate::types::{Row, Schema};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Single-column hash index
#[derive(Debug, Clone)]
pub struct HashIndex {
    column: String,
    position: usize,
    entries: HashMap<String, BTreeSet<usize>>,
}

impl HashIndex {
    /// Builds the index with one pass over the rows.
    pub fn build(column: String, position: usize, rows: &[Row]) -> Self {
        let mut index = Self {
            column,
            position,
            entries: HashMap::new(),
        };
        index.rebuild(rows);
        index
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    /// Number of distinct values.
    pub fn cardinality(&self) -> usize {
        self.entries.len()
    }

    /// Row positions holding `value`, in ascending order.
    pub fn lookup(&self, value: &str) -> Vec<usize> {
        self.entries
            .get(value)
            .map(|positions| positions.iter().copied().collect())
            .unwrap_or_default()
    }

    fn insert(&mut self, row_pos: usize, row: &Row) {
        if let Some(cell) = row.get(self.position) {
            self.entries.entry(cell.clone()).or_default().insert(row_pos);
        }
    }

    fn remove(&mut self, row_pos: usize, row: &Row) {
        let Some(cell) = row.get(self.position) else {
            return;
        };
        if let Some(positions) = self.entries.get_mut(cell) {
            positions.remove(&row_pos);
            if positions.is_empty() {
                self.entries.remove(cell);
            }
        }
    }

    fn rebuild(&mut self, rows: &[Row]) {
        self.entries.clear();
        for (row_pos, row) in rows.iter().enumerate() {
            self.insert(row_pos, row);
        }
    }
}

/// Two-column index keyed by `(first, second)` cell pairs.
///
/// With no second column every key is `(first, "")`; the identifier index
/// is of this form.
#[derive(Debug, Clone)]
pub struct CompositeIndex {
    columns: (String, Option<String>),
    positions: (usize, Option<usize>),
    entries: HashMap<(String, String), BTreeSet<usize>>,
}

impl CompositeIndex {
    pub fn build(
        first: (String, usize),
        second: Option<(String, usize)>,
        rows: &[Row],
    ) -> Self {
        let (second_name, second_pos) = match second {
            Some((name, pos)) => (Some(name), Some(pos)),
            None => (None, None),
        };
        let mut index = Self {
            columns: (first.0, second_name),
            positions: (first.1, second_pos),
            entries: HashMap::new(),
        };
        index.rebuild(rows);
        index
    }

    pub fn first_column(&self) -> &str {
        &self.columns.0
    }

    pub fn second_column(&self) -> Option<&str> {
        self.columns.1.as_deref()
    }

    fn covers(&self, first: &str, second: Option<&str>) -> bool {
        self.columns.0 == first && self.columns.1.as_deref() == second
    }

    fn key(&self, row: &Row) -> Option<(String, String)> {
        let first = row.get(self.positions.0)?.clone();
        let second = match self.positions.1 {
            Some(pos) => row.get(pos)?.clone(),
            None => String::new(),
        };
        Some((first, second))
    }

    /// Row positions holding the pair, in ascending order.
    pub fn lookup(&self, first: &str, second: &str) -> Vec<usize> {
        self.entries
            .get(&(first.to_string(), second.to_string()))
            .map(|positions| positions.iter().copied().collect())
            .unwrap_or_default()
    }

    fn insert(&mut self, row_pos: usize, row: &Row) {
        if let Some(key) = self.key(row) {
            self.entries.entry(key).or_default().insert(row_pos);
        }
    }

    fn remove(&mut self, row_pos: usize, row: &Row) {
        let Some(key) = self.key(row) else {
            return;
        };
        if let Some(positions) = self.entries.get_mut(&key) {
            positions.remove(&row_pos);
            if positions.is_empty() {
                self.entries.remove(&key);
            }
        }
    }

    fn rebuild(&mut self, rows: &[Row]) {
        self.entries.clear();
        for (row_pos, row) in rows.iter().enumerate() {
            self.insert(row_pos, row);
        }
    }
}

/// All indexes of one table
#[derive(Debug, Clone, Default)]
pub struct IndexManager {
    hash: BTreeMap<String, HashIndex>,
    composite: Vec<CompositeIndex>,
    identifier: Option<CompositeIndex>,
    stale: bool,
    rebuilds: u64,
}

impl IndexManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets up the identifier index if the schema has the identifier column.
    pub fn with_identifier(schema: &Schema, id_column: &str) -> Self {
        let mut manager = Self::new();
        if let Some(position) = schema.find(id_column) {
            manager.identifier = Some(CompositeIndex::build(
                (id_column.to_string(), position),
                None,
                &[],
            ));
        }
        manager
    }

    /// Creates (or replaces) a hash index on a column.
    pub fn create_index(&mut self, schema: &Schema, column: &str, rows: &[Row]) -> Result<()> {
        let position = schema.index_of(column)?;
        self.refresh(rows);
        let index = HashIndex::build(column.to_string(), position, rows);
        tracing::debug!(
            column,
            values = index.cardinality(),
            rows = rows.len(),
            "created hash index"
        );
        self.hash.insert(column.to_string(), index);
        Ok(())
    }

    /// Drops the hash index on a column.
    pub fn drop_index(&mut self, column: &str) -> Result<()> {
        self.hash
            .remove(column)
            .map(|_| ())
            .ok_or_else(|| Error::IndexNotFound(column.to_string()))
    }

    /// Creates (or replaces) a composite index on a column pair.
    pub fn create_composite(
        &mut self,
        schema: &Schema,
        first: &str,
        second: &str,
        rows: &[Row],
    ) -> Result<()> {
        let first_pos = schema.index_of(first)?;
        let second_pos = schema.index_of(second)?;
        self.refresh(rows);
        self.composite.retain(|index| !index.covers(first, Some(second)));
        self.composite.push(CompositeIndex::build(
            (first.to_string(), first_pos),
            Some((second.to_string(), second_pos)),
            rows,
        ));
        tracing::debug!(first, second, rows = rows.len(), "created composite index");
        Ok(())
    }

    pub fn has_index(&self, column: &str) -> bool {
        self.hash.contains_key(column)
    }

    pub fn has_identifier(&self) -> bool {
        self.identifier.is_some()
    }

    /// Columns with a hash index, in name order.
    pub fn indexed_columns(&self) -> Vec<String> {
        self.hash.keys().cloned().collect()
    }

    /// Column pairs with a composite index, in creation order.
    pub fn composite_columns(&self) -> Vec<(String, String)> {
        self.composite
            .iter()
            .map(|index| {
                (
                    index.first_column().to_string(),
                    index.second_column().unwrap_or_default().to_string(),
                )
            })
            .collect()
    }

    /// True once a position-shifting mutation has happened since the last
    /// rebuild.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Number of full rebuilds performed so far.
    pub fn rebuild_count(&self) -> u64 {
        self.rebuilds
    }

    fn all_composites_mut(&mut self) -> impl Iterator<Item = &mut CompositeIndex> {
        self.identifier.iter_mut().chain(self.composite.iter_mut())
    }

    /// Records an appended row.
    pub fn row_inserted(&mut self, row_pos: usize, row: &Row) {
        if self.stale {
            return;
        }
        for index in self.hash.values_mut() {
            index.insert(row_pos, row);
        }
        for index in self.all_composites_mut() {
            index.insert(row_pos, row);
        }
    }

    /// Records an in-place replacement of the row at `row_pos`.
    pub fn row_updated(&mut self, row_pos: usize, old: &Row, new: &Row) {
        if self.stale {
            return;
        }
        for index in self.hash.values_mut() {
            index.remove(row_pos, old);
            index.insert(row_pos, new);
        }
        for index in self.all_composites_mut() {
            index.remove(row_pos, old);
            index.insert(row_pos, new);
        }
    }

    /// Records that row positions have shifted.
    pub fn invalidate(&mut self) {
        self.stale = true;
    }

    /// Rebuilds every index from the rows.
    pub fn rebuild(&mut self, rows: &[Row]) {
        for index in self.hash.values_mut() {
            index.rebuild(rows);
        }
        for index in self.all_composites_mut() {
            index.rebuild(rows);
        }
        self.stale = false;
        self.rebuilds += 1;
        tracing::debug!(
            rows = rows.len(),
            indexes = self.hash.len() + self.composite.len(),
            "rebuilt indexes"
        );
    }

    /// Rebuilds if stale.
    pub fn refresh(&mut self, rows: &[Row]) {
        if self.stale {
            self.rebuild(rows);
        }
    }

    /// Re-resolves every index against a new schema. Indexes on columns the
    /// schema no longer has are dropped.
    pub fn rebind(&mut self, schema: &Schema, id_column: &str, rows: &[Row]) {
        let old_hash = std::mem::take(&mut self.hash);
        for (column, _) in old_hash {
            match schema.find(&column) {
                Some(position) => {
                    let index = HashIndex::build(column.clone(), position, rows);
                    self.hash.insert(column, index);
                }
                None => tracing::debug!(column, "dropped index on removed column"),
            }
        }

        let old_composite = std::mem::take(&mut self.composite);
        for index in old_composite {
            let first = index.first_column().to_string();
            let second = index.second_column().unwrap_or_default().to_string();
            match (schema.find(&first), schema.find(&second)) {
                (Some(first_pos), Some(second_pos)) => {
                    self.composite.push(CompositeIndex::build(
                        (first, first_pos),
                        Some((second, second_pos)),
                        rows,
                    ));
                }
                _ => tracing::debug!(first, second, "dropped composite index on removed column"),
            }
        }

        self.identifier = schema
            .find(id_column)
            .map(|position| CompositeIndex::build((id_column.to_string(), position), None, rows));
        self.stale = false;
    }

    /// Equality lookup through a hash index; `None` if the column has none.
    pub fn lookup(&self, column: &str, value: &str) -> Option<Vec<usize>> {
        self.hash.get(column).map(|index| index.lookup(value))
    }

    /// Lookup through the identifier index; `None` if there is none.
    pub fn lookup_identifier(&self, id: &str, secondary: &str) -> Option<Vec<usize>> {
        self.identifier
            .as_ref()
            .map(|index| index.lookup(id, secondary))
    }

    /// Lookup through a composite index on `(first, second)`; `None` if
    /// there is none.
    pub fn lookup_pair(
        &self,
        first: &str,
        second: &str,
        first_value: &str,
        second_value: &str,
    ) -> Option<Vec<usize>> {
        self.composite
            .iter()
            .find(|index| index.covers(first, Some(second)))
            .map(|index| index.lookup(first_value, second_value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Column;

    fn schema() -> Schema {
        Schema::new(vec![
            Column::integer("ID"),
            Column::string("Name"),
            Column::integer("Age"),
        ])
        .unwrap()
    }

    fn rows() -> Vec<Row> {
        [["1", "Ann", "20"], ["2", "Bob", "22"], ["3", "Cid", "20"]]
            .iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_hash_index_build_and_lookup() {
        let mut manager = IndexManager::new();
        let rows = rows();
        manager.create_index(&schema(), "Age", &rows).unwrap();
        assert_eq!(manager.lookup("Age", "20"), Some(vec![0, 2]));
        assert_eq!(manager.lookup("Age", "99"), Some(vec![]));
        assert_eq!(manager.lookup("Name", "Ann"), None);
    }

    #[test]
    fn test_create_index_unknown_column() {
        let mut manager = IndexManager::new();
        assert_eq!(
            manager.create_index(&schema(), "Height", &rows()),
            Err(Error::ColumnNotFound("Height".into()))
        );
    }

    #[test]
    fn test_incremental_insert_and_update() {
        let mut manager = IndexManager::with_identifier(&schema(), "ID");
        let mut rows = rows();
        manager.rebuild(&rows);
        manager.create_index(&schema(), "Name", &rows).unwrap();

        let new_row: Row = vec!["4".into(), "Ann".into(), "30".into()];
        rows.push(new_row.clone());
        manager.row_inserted(3, &new_row);
        assert_eq!(manager.lookup("Name", "Ann"), Some(vec![0, 3]));
        assert_eq!(manager.lookup_identifier("4", ""), Some(vec![3]));

        let replaced: Row = vec!["4".into(), "Dee".into(), "30".into()];
        manager.row_updated(3, &new_row, &replaced);
        assert_eq!(manager.lookup("Name", "Ann"), Some(vec![0]));
        assert_eq!(manager.lookup("Name", "Dee"), Some(vec![3]));
    }

    #[test]
    fn test_invalidate_and_refresh() {
        let mut manager = IndexManager::new();
        let mut rows = rows();
        manager.create_index(&schema(), "Name", &rows).unwrap();

        rows.remove(0);
        manager.invalidate();
        assert!(manager.is_stale());

        manager.refresh(&rows);
        assert!(!manager.is_stale());
        assert_eq!(manager.lookup("Name", "Bob"), Some(vec![0]));
        assert_eq!(manager.lookup("Name", "Ann"), Some(vec![]));
    }

    #[test]
    fn test_composite_index() {
        let mut manager = IndexManager::new();
        manager
            .create_composite(&schema(), "Name", "Age", &rows())
            .unwrap();
        assert_eq!(
            manager.lookup_pair("Name", "Age", "Cid", "20"),
            Some(vec![2])
        );
        assert_eq!(manager.lookup_pair("Name", "Age", "Cid", "22"), Some(vec![]));
        assert_eq!(manager.lookup_pair("Age", "Name", "20", "Cid"), None);
    }

    #[test]
    fn test_rebind_drops_missing_columns() {
        let mut manager = IndexManager::with_identifier(&schema(), "ID");
        let rows = rows();
        manager.create_index(&schema(), "Name", &rows).unwrap();
        manager.create_index(&schema(), "Age", &rows).unwrap();

        let narrowed = Schema::new(vec![Column::string("Name"), Column::integer("ID")]).unwrap();
        let narrowed_rows: Vec<Row> = vec![vec!["Eve".into(), "9".into()]];
        manager.rebind(&narrowed, "ID", &narrowed_rows);

        assert_eq!(manager.indexed_columns(), vec!["Name".to_string()]);
        assert_eq!(manager.lookup("Name", "Eve"), Some(vec![0]));
        assert_eq!(manager.lookup_identifier("9", ""), Some(vec![0]));
    }
}
