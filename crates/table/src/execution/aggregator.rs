//! Aggregation over numeric cells, globally or per group
//!
//! Cells that do not parse as numbers are skipped, never fatal. A global
//! aggregate with nothing to aggregate is an error; a group with nothing to
//! aggregate is simply absent from the grouped result.

use super::evaluator::parse_number;
use crate::error::{Error, Result};
use crate::types::{Row, Schema};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// An aggregate function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Aggregate {
    Sum,
    Avg,
    Min,
    Max,
}

impl Aggregate {
    /// Create an accumulator for this aggregate
    fn accumulator(&self) -> Box<dyn Accumulator> {
        match self {
            Self::Sum => Box::new(SumAccumulator::default()),
            Self::Avg => Box::new(AvgAccumulator::default()),
            Self::Min => Box::new(MinAccumulator::default()),
            Self::Max => Box::new(MaxAccumulator::default()),
        }
    }
}

impl fmt::Display for Aggregate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sum => write!(f, "SUM"),
            Self::Avg => write!(f, "AVG"),
            Self::Min => write!(f, "MIN"),
            Self::Max => write!(f, "MAX"),
        }
    }
}

impl FromStr for Aggregate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SUM" => Ok(Self::Sum),
            "AVG" | "AVERAGE" => Ok(Self::Avg),
            "MIN" => Ok(Self::Min),
            "MAX" => Ok(Self::Max),
            other => Err(Error::Parse(format!("unknown aggregate: {}", other))),
        }
    }
}

/// An accumulator for a single aggregate function
trait Accumulator: Send {
    /// Add a value to the accumulator
    fn add(&mut self, value: f64);

    /// Finalize and return the result, `None` if nothing was added
    fn finalize(self: Box<Self>) -> Option<f64>;
}

/// SUM accumulator
#[derive(Default)]
struct SumAccumulator {
    sum: Option<f64>,
}

impl Accumulator for SumAccumulator {
    fn add(&mut self, value: f64) {
        self.sum = Some(self.sum.unwrap_or(0.0) + value);
    }

    fn finalize(self: Box<Self>) -> Option<f64> {
        self.sum
    }
}

/// AVG accumulator
#[derive(Default)]
struct AvgAccumulator {
    sum: f64,
    count: u64,
}

impl Accumulator for AvgAccumulator {
    fn add(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn finalize(self: Box<Self>) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

/// MIN accumulator
#[derive(Default)]
struct MinAccumulator {
    min: Option<f64>,
}

impl Accumulator for MinAccumulator {
    fn add(&mut self, value: f64) {
        self.min = Some(self.min.map_or(value, |m| m.min(value)));
    }

    fn finalize(self: Box<Self>) -> Option<f64> {
        self.min
    }
}

/// MAX accumulator
#[derive(Default)]
struct MaxAccumulator {
    max: Option<f64>,
}

impl Accumulator for MaxAccumulator {
    fn add(&mut self, value: f64) {
        self.max = Some(self.max.map_or(value, |m| m.max(value)));
    }

    fn finalize(self: Box<Self>) -> Option<f64> {
        self.max
    }
}

/// An aggregator that groups rows by the text of one column
pub struct Aggregator {
    /// Group column position (`None` for a global aggregate)
    group_by: Option<usize>,
    /// Column whose cells are aggregated
    column: usize,
    function: Aggregate,
    /// Buckets for each group key
    buckets: BTreeMap<String, Box<dyn Accumulator>>,
    /// Cells skipped because they were not numeric
    skipped: usize,
}

impl Aggregator {
    /// Create a new aggregator
    pub fn new(group_by: Option<usize>, column: usize, function: Aggregate) -> Self {
        Self {
            group_by,
            column,
            function,
            buckets: BTreeMap::new(),
            skipped: 0,
        }
    }

    /// Add a row to the aggregator
    pub fn add(&mut self, row: &Row) {
        let Some(value) = row.get(self.column).and_then(|cell| parse_number(cell)) else {
            tracing::trace!(cell = ?row.get(self.column), "skipping non-numeric cell");
            self.skipped += 1;
            return;
        };

        let key = match self.group_by {
            Some(position) => row.get(position).cloned().unwrap_or_default(),
            None => String::new(),
        };
        let function = self.function;
        self.buckets
            .entry(key)
            .or_insert_with(|| function.accumulator())
            .add(value);
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Finalize and return one value per group that saw a numeric cell
    pub fn finalize(self) -> BTreeMap<String, f64> {
        self.buckets
            .into_iter()
            .filter_map(|(key, acc)| acc.finalize().map(|value| (key, value)))
            .collect()
    }
}

/// Aggregates one column over all rows.
pub fn aggregate(schema: &Schema, rows: &[Row], column: &str, function: Aggregate) -> Result<f64> {
    let position = schema.index_of(column)?;
    let mut aggregator = Aggregator::new(None, position, function);
    for row in rows {
        aggregator.add(row);
    }
    aggregator
        .finalize()
        .into_values()
        .next()
        .ok_or_else(|| Error::EmptyAggregate(column.to_string()))
}

/// Aggregates `column` separately for each distinct value of `group_column`.
pub fn grouped_aggregate(
    schema: &Schema,
    rows: &[Row],
    group_column: &str,
    column: &str,
    function: Aggregate,
) -> Result<BTreeMap<String, f64>> {
    let group_position = schema.index_of(group_column)?;
    let position = schema.index_of(column)?;
    let mut aggregator = Aggregator::new(Some(group_position), position, function);
    for row in rows {
        aggregator.add(row);
    }
    if aggregator.skipped() > 0 {
        tracing::debug!(
            column,
            skipped = aggregator.skipped(),
            "skipped non-numeric cells in grouped aggregate"
        );
    }
    Ok(aggregator.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Column;

    fn schema() -> Schema {
        Schema::new(vec![Column::integer("Age"), Column::string("Score")]).unwrap()
    }

    fn rows(data: &[(&str, &str)]) -> Vec<Row> {
        data.iter()
            .map(|(a, s)| vec![a.to_string(), s.to_string()])
            .collect()
    }

    #[test]
    fn test_grouped_average() {
        let rows = rows(&[("20", "80"), ("20", "90"), ("22", "70")]);
        let result = grouped_aggregate(&schema(), &rows, "Age", "Score", Aggregate::Avg).unwrap();
        assert_eq!(result.len(), 2);
        assert_eq!(result["20"], 85.0);
        assert_eq!(result["22"], 70.0);
    }

    #[test]
    fn test_non_numeric_cells_are_skipped() {
        let rows = rows(&[("20", "80"), ("20", "n/a"), ("22", "absent")]);
        let result = grouped_aggregate(&schema(), &rows, "Age", "Score", Aggregate::Sum).unwrap();
        // Group 22 had no numeric values and is dropped
        assert_eq!(result.len(), 1);
        assert_eq!(result["20"], 80.0);
    }

    #[test]
    fn test_global_aggregates() {
        let rows = rows(&[("1", "4"), ("2", "x"), ("3", "-2.5"), ("4", "10")]);
        assert_eq!(aggregate(&schema(), &rows, "Score", Aggregate::Sum).unwrap(), 11.5);
        assert_eq!(aggregate(&schema(), &rows, "Score", Aggregate::Min).unwrap(), -2.5);
        assert_eq!(aggregate(&schema(), &rows, "Score", Aggregate::Max).unwrap(), 10.0);
        let avg = aggregate(&schema(), &rows, "Score", Aggregate::Avg).unwrap();
        assert!((avg - 11.5 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_global_aggregate_is_error() {
        let rows = rows(&[("1", "x"), ("2", "y")]);
        assert_eq!(
            aggregate(&schema(), &rows, "Score", Aggregate::Sum),
            Err(Error::EmptyAggregate("Score".into()))
        );
        assert_eq!(
            aggregate(&schema(), &[], "Age", Aggregate::Max),
            Err(Error::EmptyAggregate("Age".into()))
        );
        assert!(grouped_aggregate(&schema(), &rows, "Age", "Score", Aggregate::Avg)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_parse_function_names() {
        assert_eq!("avg".parse::<Aggregate>().unwrap(), Aggregate::Avg);
        assert_eq!("MAX".parse::<Aggregate>().unwrap(), Aggregate::Max);
        assert!("median".parse::<Aggregate>().is_err());
    }
}
