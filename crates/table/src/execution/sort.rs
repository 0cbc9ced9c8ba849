//! Multi-key row ordering

use crate::error::{Error, Result};
use crate::types::{DataType, Row, Schema};
use std::cmp::Ordering;

/// One resolved sort column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub position: usize,
    pub datatype: DataType,
    pub ascending: bool,
}

/// Resolves sort columns against a schema. Every column needs a matching
/// direction flag.
pub fn sort_keys<S: AsRef<str>>(
    schema: &Schema,
    columns: &[S],
    ascending: &[bool],
) -> Result<Vec<SortKey>> {
    if columns.is_empty() {
        return Err(Error::InvalidArgument("sort needs at least one column".into()));
    }
    if columns.len() != ascending.len() {
        return Err(Error::InvalidArgument(format!(
            "{} sort columns but {} direction flags",
            columns.len(),
            ascending.len()
        )));
    }

    columns
        .iter()
        .zip(ascending)
        .map(|(column, &ascending)| {
            let (position, column) = schema
                .get_column(column.as_ref())
                .ok_or_else(|| Error::ColumnNotFound(column.as_ref().to_string()))?;
            Ok(SortKey {
                position,
                datatype: column.datatype,
                ascending,
            })
        })
        .collect()
}

/// Compares two rows key by key; the first unequal key decides.
pub fn compare_rows(keys: &[SortKey], a: &Row, b: &Row) -> Ordering {
    for key in keys {
        let ordering = key.datatype.compare(&a[key.position], &b[key.position]);
        if ordering != Ordering::Equal {
            return if key.ascending {
                ordering
            } else {
                ordering.reverse()
            };
        }
    }
    Ordering::Equal
}
