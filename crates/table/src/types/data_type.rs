//! Column data types
//!
//! Cells are stored as text. A column's type only decides which text is
//! accepted on insertion and how cells are ordered when sorting.

use crate::error::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Declared type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    Integer,
    String,
    Date,
}

impl DataType {
    /// Returns true if the cell text is a valid value of this type.
    pub fn accepts(&self, cell: &str) -> bool {
        match self {
            DataType::Integer => cell.parse::<i64>().is_ok(),
            DataType::String => true,
            DataType::Date => is_iso_date(cell),
        }
    }

    /// Checks a cell against this type, naming the column in the error.
    pub fn check(&self, column: &str, cell: &str) -> Result<()> {
        if self.accepts(cell) {
            Ok(())
        } else {
            Err(Error::TypeMismatch {
                column: column.to_string(),
                expected: self.to_string(),
                found: cell.to_string(),
            })
        }
    }

    /// Orders two cells of this type.
    ///
    /// Integers compare numerically. Strings and ISO dates compare as text,
    /// which for `YYYY-MM-DD` is chronological order.
    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        match self {
            DataType::Integer => match (a.parse::<i64>(), b.parse::<i64>()) {
                (Ok(x), Ok(y)) => x.cmp(&y),
                _ => a.cmp(b),
            },
            DataType::String | DataType::Date => a.cmp(b),
        }
    }
}

/// `YYYY-MM-DD` with four-digit year and a date that exists on the calendar.
fn is_iso_date(cell: &str) -> bool {
    let bytes = cell.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return false;
    }
    let digits_ok = bytes
        .iter()
        .enumerate()
        .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
    digits_ok && NaiveDate::parse_from_str(cell, "%Y-%m-%d").is_ok()
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Integer => write!(f, "Integer"),
            DataType::String => write!(f, "String"),
            DataType::Date => write!(f, "Date"),
        }
    }
}

impl FromStr for DataType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "INTEGER" | "INT" => Ok(DataType::Integer),
            "STRING" | "TEXT" => Ok(DataType::String),
            "DATE" => Ok(DataType::Date),
            other => Err(Error::Parse(format!("unknown data type: {}", other))),
        }
    }
}
