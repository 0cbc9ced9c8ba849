//! Common test utilities for table integration tests
#![allow(dead_code)]

use proven_table::types::{Column, Row};
use proven_table::{Table, TableConfig};

/// Builds a table and fills it with rows
pub struct TableBuilder {
    name: String,
    columns: Vec<Column>,
    config: TableConfig,
    rows: Vec<Vec<String>>,
}

impl TableBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            columns: Vec::new(),
            config: TableConfig::default(),
            rows: Vec::new(),
        }
    }

    pub fn column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    pub fn config(mut self, config: TableConfig) -> Self {
        self.config = config;
        self
    }

    pub fn row(mut self, cells: &[&str]) -> Self {
        self.rows.push(cells.iter().map(|c| c.to_string()).collect());
        self
    }

    pub fn build(self) -> Table {
        let table = Table::with_config(self.name.as_str(), self.columns, self.config)
            .unwrap_or_else(|e| panic!("Failed to create table {}: {}", self.name, e));
        for row in self.rows {
            table
                .insert_row(row.clone())
                .unwrap_or_else(|e| panic!("Failed to insert {:?}: {}", row, e));
        }
        table
    }
}

/// ID, Name, Age, Dept
pub fn people() -> Table {
    people_with(TableConfig::default())
}

pub fn people_with(config: TableConfig) -> Table {
    TableBuilder::new("People")
        .column(Column::integer("ID"))
        .column(Column::string("Name"))
        .column(Column::integer("Age"))
        .column(Column::string("Dept"))
        .config(config)
        .row(&["1", "Alice", "30", "Eng"])
        .row(&["2", "Bob", "25", "Ops"])
        .row(&["3", "Carol", "35", "Eng"])
        .row(&["4", "Dave", "25", "Sales"])
        .row(&["5", "Erin", "41", "Ops"])
        .build()
}

pub fn row(cells: &[&str]) -> Row {
    cells.iter().map(|c| c.to_string()).collect()
}

/// First cell of each row
pub fn ids(rows: &[Row]) -> Vec<String> {
    rows.iter().map(|r| r[0].clone()).collect()
}

/// Asserts that an index lookup returns the same positions as a full scan.
pub fn assert_lookup_matches_scan(table: &Table, column: &str, value: &str) {
    let position = table
        .schema()
        .index_of(column)
        .unwrap_or_else(|e| panic!("{}", e));
    let scanned: Vec<usize> = table
        .rows()
        .iter()
        .enumerate()
        .filter(|(_, r)| r[position] == value)
        .map(|(i, _)| i)
        .collect();
    let looked_up = table.lookup_equality(column, value).unwrap();
    assert_eq!(
        looked_up, scanned,
        "lookup of {} = {} disagrees with scan",
        column, value
    );
}
