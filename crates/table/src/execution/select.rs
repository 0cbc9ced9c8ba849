//! Row selection: equality scans, single-column filters and predicate search

use super::evaluator::{BoundCondition, compare_cells};
use crate::error::Result;
use crate::types::{Condition, Operator, Row, Schema};

/// Positions of rows whose `column` cell is exactly `value`.
pub fn scan_equal(schema: &Schema, rows: &[Row], column: &str, value: &str) -> Result<Vec<usize>> {
    let pos = schema.index_of(column)?;
    Ok(rows
        .iter()
        .enumerate()
        .filter(|(_, row)| row[pos] == value)
        .map(|(position, _)| position)
        .collect())
}

/// Rows whose `column` cell satisfies `operator value`, numerically when both
/// sides are numbers.
pub fn filter(
    schema: &Schema,
    rows: &[Row],
    column: &str,
    operator: Operator,
    value: &str,
) -> Result<Vec<Row>> {
    let pos = schema.index_of(column)?;
    Ok(rows
        .iter()
        .filter(|row| compare_cells(operator, &row[pos], value))
        .cloned()
        .collect())
}

/// Rows matching a condition tree, in row order.
pub fn search(schema: &Schema, rows: &[Row], condition: &Condition) -> Result<Vec<Row>> {
    let bound = BoundCondition::bind(condition, schema)?;
    Ok(rows.iter().filter(|row| bound.matches(row)).cloned().collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Column;

    fn schema() -> Schema {
        Schema::new(vec![Column::string("Name"), Column::integer("Score")]).unwrap()
    }

    fn rows() -> Vec<Row> {
        [["Ann", "80"], ["Bob", "9"], ["Cid", "100"], ["Bob", "80"]]
            .iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_scan_equal() {
        assert_eq!(scan_equal(&schema(), &rows(), "Name", "Bob").unwrap(), vec![1, 3]);
        assert!(scan_equal(&schema(), &rows(), "Nope", "Bob").is_err());
    }

    #[test]
    fn test_filter_is_numeric() {
        let result = filter(&schema(), &rows(), "Score", Operator::GreaterThan, "50").unwrap();
        let names: Vec<&str> = result.iter().map(|r| r[0].as_str()).collect();
        assert_eq!(names, vec!["Ann", "Cid", "Bob"]);
    }

    #[test]
    fn test_search_keeps_row_order() {
        let condition = Condition::or(vec![
            Condition::leaf("Score", Operator::Equal, "100"),
            Condition::leaf("Name", Operator::Equal, "Ann"),
        ]);
        let result = search(&schema(), &rows(), &condition).unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result[0][0], "Ann");
        assert_eq!(result[1][0], "Cid");
    }
}
