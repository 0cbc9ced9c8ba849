//! The shared table handle
//!
//! `Table` owns a row store and its transaction stack behind one mutex. Every
//! public method holds the lock for its whole duration, reads included, so a
//! `Table` can be shared between threads through `Arc<Table>`.

use crate::config::TableConfig;
use crate::error::{Error, Result};
use crate::execution::aggregator::{self, Aggregate};
use crate::execution::join::{self, JoinInput};
use crate::execution::{select, sort};
use crate::format::{ImportSummary, delimited, tabbed};
use crate::storage::RowStore;
use crate::transaction::{CommitSummary, TransactionStack, TransactionState};
use crate::types::{
    Column, Comparison, Condition, ConditionGroup, LogicalOp, Operator, ResultSet, Row, Schema,
};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

struct TableInner {
    store: RowStore,
    transactions: TransactionStack,
}

/// A named, typed, in-memory table
pub struct Table {
    inner: Mutex<TableInner>,
}

/// Rows of another table copied out under that table's lock
struct Snapshot {
    name: String,
    schema: Schema,
    rows: Vec<Row>,
}

fn into_row<I, S>(cells: I) -> Row
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    cells.into_iter().map(Into::into).collect()
}

impl Table {
    /// Creates an empty table with the default configuration.
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Result<Self> {
        Self::with_config(name, columns, TableConfig::default())
    }

    pub fn with_config(
        name: impl Into<String>,
        columns: Vec<Column>,
        config: TableConfig,
    ) -> Result<Self> {
        let schema = Schema::new(columns)?;
        let store = RowStore::new(name.into(), schema, config)?;
        tracing::debug!(
            table = store.name(),
            schema = %store.schema(),
            identifier_index = store.indexes().has_identifier(),
            "created table"
        );
        Ok(Self {
            inner: Mutex::new(TableInner {
                store,
                transactions: TransactionStack::new(),
            }),
        })
    }

    pub fn name(&self) -> String {
        self.inner.lock().store.name().to_string()
    }

    pub fn schema(&self) -> Schema {
        self.inner.lock().store.schema().clone()
    }

    pub fn config(&self) -> TableConfig {
        self.inner.lock().store.config().clone()
    }

    pub fn count_rows(&self) -> usize {
        self.inner.lock().store.len()
    }

    /// Copy of every row in store order.
    pub fn rows(&self) -> Vec<Row> {
        self.inner.lock().store.rows().to_vec()
    }

    pub fn row(&self, position: usize) -> Result<Row> {
        self.inner.lock().store.row(position).cloned()
    }

    fn snapshot(&self) -> Snapshot {
        let inner = self.inner.lock();
        Snapshot {
            name: inner.store.name().to_string(),
            schema: inner.store.schema().clone(),
            rows: inner.store.rows().to_vec(),
        }
    }

    // ---- Writes ----

    /// Appends a row and returns its position.
    pub fn insert_row<I, S>(&self, cells: I) -> Result<usize>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inner.lock().store.insert(into_row(cells))
    }

    pub fn update_row<I, S>(&self, position: usize, cells: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inner.lock().store.update(position, into_row(cells))
    }

    pub fn delete_row(&self, position: usize) -> Result<Row> {
        self.inner.lock().store.delete(position)
    }

    /// Sets `target_column` to `new_value` on every row whose `match_column`
    /// is `match_value`. Returns how many rows changed.
    pub fn update_rows_where(
        &self,
        match_column: &str,
        match_value: &str,
        target_column: &str,
        new_value: &str,
    ) -> Result<usize> {
        self.inner
            .lock()
            .store
            .update_where(match_column, match_value, target_column, new_value)
    }

    /// Removes every row whose `column` is `value`. Returns how many.
    pub fn delete_rows_where(&self, column: &str, value: &str) -> Result<usize> {
        self.inner.lock().store.delete_where(column, value)
    }

    // ---- Indexes ----

    pub fn create_index(&self, column: &str) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.store.create_index(column)?;
        tracing::debug!(table = inner.store.name(), column, "created index");
        Ok(())
    }

    pub fn drop_index(&self, column: &str) -> Result<()> {
        self.inner.lock().store.drop_index(column)
    }

    pub fn has_index(&self, column: &str) -> bool {
        self.inner.lock().store.indexes().has_index(column)
    }

    pub fn indexed_columns(&self) -> Vec<String> {
        self.inner.lock().store.indexes().indexed_columns()
    }

    pub fn create_composite_index(&self, first: &str, second: &str) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.store.create_composite_index(first, second)?;
        tracing::debug!(
            table = inner.store.name(),
            first,
            second,
            "created composite index"
        );
        Ok(())
    }

    /// Column pairs with a composite index, in creation order.
    pub fn composite_indexes(&self) -> Vec<(String, String)> {
        self.inner.lock().store.indexes().composite_columns()
    }

    /// Positions of rows whose `column` is exactly `value`, in row order.
    pub fn lookup_equality(&self, column: &str, value: &str) -> Result<Vec<usize>> {
        self.inner.lock().store.lookup_positions(column, value)
    }

    /// Positions from the identifier index for an `(id, secondary)` key.
    /// Rows are indexed with an empty secondary key.
    pub fn lookup_identifier(&self, id: &str, secondary: &str) -> Result<Vec<usize>> {
        self.inner.lock().store.lookup_identifier(id, secondary)
    }

    /// Rows matching both values, through a composite index when there is one.
    pub fn lookup_pair(
        &self,
        first: &str,
        second: &str,
        first_value: &str,
        second_value: &str,
    ) -> Result<Vec<Row>> {
        let mut inner = self.inner.lock();
        let positions = inner
            .store
            .lookup_pair(first, second, first_value, second_value)?;
        Ok(inner.store.rows_at(&positions))
    }

    /// The first row whose identifier column holds `id`.
    pub fn find_by_id(&self, id: &str) -> Result<Row> {
        let mut inner = self.inner.lock();
        let id_column = inner.store.config().id_column.clone();
        let positions = inner.store.lookup_positions(&id_column, id)?;
        match positions.first() {
            Some(&position) => inner.store.row(position).cloned(),
            None => Err(Error::NoMatchingRow {
                column: id_column,
                value: id.to_string(),
            }),
        }
    }

    // ---- Queries ----

    /// Rows whose `column` is exactly `value`.
    pub fn select(&self, column: &str, value: &str) -> Result<Vec<Row>> {
        let mut inner = self.inner.lock();
        let positions = inner.store.lookup_positions(column, value)?;
        Ok(inner.store.rows_at(&positions))
    }

    /// Rows whose `column` satisfies `operator value`.
    pub fn filter(&self, column: &str, operator: Operator, value: &str) -> Result<Vec<Row>> {
        let inner = self.inner.lock();
        select::filter(inner.store.schema(), inner.store.rows(), column, operator, value)
    }

    /// Rows matching every (AND) or any (OR) of the comparisons.
    pub fn search_flat(&self, conditions: Vec<Comparison>, op: LogicalOp) -> Result<Vec<Row>> {
        self.search_nested(&Condition::Group(ConditionGroup::flat(op, conditions)))
    }

    pub fn search_group(&self, group: &ConditionGroup) -> Result<Vec<Row>> {
        self.search_nested(&Condition::Group(group.clone()))
    }

    pub fn search_nested(&self, condition: &Condition) -> Result<Vec<Row>> {
        let inner = self.inner.lock();
        select::search(inner.store.schema(), inner.store.rows(), condition)
    }

    /// Stable multi-column sort of the stored rows.
    pub fn sort_by<S: AsRef<str>>(&self, columns: &[S], ascending: &[bool]) -> Result<()> {
        let mut inner = self.inner.lock();
        let keys = sort::sort_keys(inner.store.schema(), columns, ascending)?;
        inner
            .store
            .sort_rows(|a, b| sort::compare_rows(&keys, a, b));
        Ok(())
    }

    /// Equi-join with `other` on `column`.
    pub fn join(&self, other: &Table, column: &str) -> Result<ResultSet> {
        let right = other.snapshot();
        let inner = self.inner.lock();
        join::equi_join(
            JoinInput {
                table: inner.store.name(),
                schema: inner.store.schema(),
                rows: inner.store.rows(),
            },
            JoinInput {
                table: &right.name,
                schema: &right.schema,
                rows: &right.rows,
            },
            column,
        )
    }

    pub fn aggregate(&self, column: &str, function: Aggregate) -> Result<f64> {
        let inner = self.inner.lock();
        aggregator::aggregate(inner.store.schema(), inner.store.rows(), column, function)
    }

    pub fn grouped_aggregate(
        &self,
        group_column: &str,
        column: &str,
        function: Aggregate,
    ) -> Result<BTreeMap<String, f64>> {
        let inner = self.inner.lock();
        aggregator::grouped_aggregate(
            inner.store.schema(),
            inner.store.rows(),
            group_column,
            column,
            function,
        )
    }

    // ---- Transactions ----

    /// Opens a frame and returns the new nesting depth.
    pub fn begin(&self) -> usize {
        let mut inner = self.inner.lock();
        let depth = inner.transactions.begin();
        tracing::debug!(table = inner.store.name(), depth, "began transaction");
        depth
    }

    pub fn stage_insert<I, S>(&self, cells: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let row = into_row(cells);
        let mut inner = self.inner.lock();
        inner.transactions.top()?;
        inner.store.validate(&row)?;
        inner.transactions.stage_insert(row)
    }

    /// Stages a replacement row. The position is checked at commit, so it
    /// may refer to a row inserted earlier in the same frame.
    pub fn stage_update<I, S>(&self, position: usize, cells: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let row = into_row(cells);
        let mut inner = self.inner.lock();
        inner.transactions.top()?;
        inner.store.validate(&row)?;
        inner.transactions.stage_update(position, row)
    }

    pub fn stage_delete(&self, position: usize) -> Result<()> {
        self.inner.lock().transactions.stage_delete(position)
    }

    /// Applies the innermost frame.
    pub fn commit(&self) -> Result<CommitSummary> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        let summary = inner.transactions.commit(&mut inner.store)?;
        tracing::debug!(
            table = inner.store.name(),
            inserted = summary.inserted,
            updated = summary.updated,
            deleted = summary.deleted,
            depth = inner.transactions.depth(),
            "committed transaction"
        );
        Ok(summary)
    }

    /// Discards the innermost frame.
    pub fn rollback(&self) -> Result<()> {
        let mut inner = self.inner.lock();
        let frame = inner.transactions.rollback()?;
        tracing::debug!(
            table = inner.store.name(),
            discarded = frame.len(),
            depth = inner.transactions.depth(),
            "rolled back transaction"
        );
        Ok(())
    }

    pub fn transaction_depth(&self) -> usize {
        self.inner.lock().transactions.depth()
    }

    pub fn transaction_state(&self) -> TransactionState {
        self.inner.lock().transactions.state()
    }

    // ---- Files ----

    pub fn import_delimited<R: Read>(
        &self,
        reader: R,
        clear_existing: bool,
    ) -> Result<ImportSummary> {
        delimited::import(&mut self.inner.lock().store, reader, clear_existing)
    }

    pub fn export_delimited<W: Write>(&self, writer: W) -> Result<()> {
        delimited::export(&self.inner.lock().store, writer)
    }

    pub fn import_delimited_file(
        &self,
        path: impl AsRef<Path>,
        clear_existing: bool,
    ) -> Result<ImportSummary> {
        let file = File::open(path)?;
        self.import_delimited(BufReader::new(file), clear_existing)
    }

    /// Writes the interchange file, replacing any existing file.
    pub fn export_delimited_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = File::create(path)?;
        self.export_delimited(BufWriter::new(file))
    }

    pub fn save<W: Write>(&self, writer: W) -> Result<()> {
        tabbed::save(&self.inner.lock().store, writer)
    }

    /// Replaces the rows and the name with a saved table's.
    pub fn load<R: Read>(&self, reader: R) -> Result<ImportSummary> {
        tabbed::load(&mut self.inner.lock().store, BufReader::new(reader))
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = File::create(path)?;
        self.save(BufWriter::new(file))
    }

    pub fn load_from_file(&self, path: impl AsRef<Path>) -> Result<ImportSummary> {
        self.load(File::open(path)?)
    }
}

impl std::fmt::Debug for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("Table")
            .field("name", &inner.store.name())
            .field("schema", inner.store.schema())
            .field("rows", &inner.store.len())
            .field("transaction_depth", &inner.transactions.depth())
            .finish()
    }
}
