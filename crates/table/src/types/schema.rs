//! Table schema types (columns and their order)
//!
//! Column order is significant: cell `i` of every row belongs to column `i`.

use super::Row;
use super::data_type::DataType;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::Display;

/// A table column.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Column {
    /// Column name. Unique within a schema.
    pub name: String,
    /// Column datatype.
    pub datatype: DataType,
}

impl Column {
    /// Creates a new column.
    pub fn new(name: impl Into<String>, datatype: DataType) -> Self {
        Column {
            name: name.into(),
            datatype,
        }
    }

    /// Shorthand for an Integer column.
    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, DataType::Integer)
    }

    /// Shorthand for a String column.
    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, DataType::String)
    }

    /// Shorthand for a Date column.
    pub fn date(name: impl Into<String>) -> Self {
        Self::new(name, DataType::Date)
    }
}

/// The ordered column list of a table.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Schema {
    columns: Vec<Column>,
}

impl Schema {
    /// Creates a schema, rejecting empty and duplicate column lists.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        if columns.is_empty() {
            return Err(Error::InvalidSchema(
                "Table must have at least one column".into(),
            ));
        }

        let mut seen = HashSet::new();
        for column in &columns {
            if column.name.is_empty() {
                return Err(Error::InvalidSchema("Column name cannot be empty".into()));
            }
            if !seen.insert(column.name.as_str()) {
                return Err(Error::DuplicateColumn(column.name.clone()));
            }
        }

        Ok(Schema { columns })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Returns the position of the named column.
    pub fn index_of(&self, name: &str) -> Result<usize> {
        self.find(name)
            .ok_or_else(|| Error::ColumnNotFound(name.to_string()))
    }

    /// Returns the position of the named column, if it exists.
    pub fn find(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Returns the column with the given name, if it exists.
    pub fn get_column(&self, name: &str) -> Option<(usize, &Column)> {
        self.columns
            .iter()
            .enumerate()
            .find(|(_, c)| c.name == name)
    }

    /// Validates a row against this schema.
    pub fn validate_row(&self, table: &str, row: &Row) -> Result<()> {
        if row.len() != self.columns.len() {
            return Err(Error::ColumnCountMismatch {
                table: table.to_string(),
                expected: self.columns.len(),
                found: row.len(),
            });
        }

        for (column, cell) in self.columns.iter().zip(row.iter()) {
            column.datatype.check(&column.name, cell)?;
        }

        Ok(())
    }
}

// Formats the schema as `name:Type` pairs, e.g. `(ID:Integer, Name:String)`.
impl Display for Schema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(")?;
        for (i, column) in self.columns.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}:{}", column.name, column.datatype)?;
        }
        write!(f, ")")
    }
}
