//! Predicate evaluation against rows
//!
//! Conditions are first bound to a schema, which resolves every column name
//! to a cell position. Binding fails on an unknown column, so a search never
//! reports a partial result because one branch happened to short-circuit.
//! A bound condition then evaluates infallibly against any row of that
//! schema.

use crate::error::Result;
use crate::types::predicate::{Comparison, Condition, ConditionGroup, LogicalOp, Operator};
use crate::types::{Row, Schema};

/// Parses a cell as a finite number. `NaN` and infinities are treated as
/// text.
pub fn parse_number(cell: &str) -> Option<f64> {
    cell.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Compares a cell with a literal: numerically when both are numbers,
/// otherwise as text (equality and inequality only).
pub fn compare_cells(operator: Operator, cell: &str, literal: &str) -> bool {
    match (parse_number(cell), parse_number(literal)) {
        (Some(left), Some(right)) => operator.apply_numeric(left, right),
        _ => operator.apply_text(cell, literal),
    }
}

/// A condition with its column names resolved to positions
#[derive(Debug, Clone, PartialEq)]
pub enum BoundCondition {
    Leaf {
        column: usize,
        operator: Operator,
        value: String,
        number: Option<f64>,
    },
    Group {
        op: LogicalOp,
        children: Vec<BoundCondition>,
    },
}

impl BoundCondition {
    /// Binds a condition tree to a schema.
    pub fn bind(condition: &Condition, schema: &Schema) -> Result<Self> {
        match condition {
            Condition::Leaf(comparison) => Self::bind_leaf(comparison, schema),
            Condition::Group(group) => Self::bind_group(group, schema),
        }
    }

    pub fn bind_leaf(comparison: &Comparison, schema: &Schema) -> Result<Self> {
        Ok(BoundCondition::Leaf {
            column: schema.index_of(&comparison.column)?,
            operator: comparison.operator,
            value: comparison.value.clone(),
            number: parse_number(&comparison.value),
        })
    }

    pub fn bind_group(group: &ConditionGroup, schema: &Schema) -> Result<Self> {
        let children = group
            .conditions
            .iter()
            .map(|c| Self::bind(c, schema))
            .collect::<Result<Vec<_>>>()?;
        Ok(BoundCondition::Group {
            op: group.op,
            children,
        })
    }

    /// Evaluates against a row, short-circuiting groups.
    pub fn matches(&self, row: &Row) -> bool {
        match self {
            BoundCondition::Leaf {
                column,
                operator,
                value,
                number,
            } => {
                let Some(cell) = row.get(*column) else {
                    return false;
                };
                match (parse_number(cell), number) {
                    (Some(left), Some(right)) => operator.apply_numeric(left, *right),
                    _ => operator.apply_text(cell, value),
                }
            }
            BoundCondition::Group { op, children } => match op {
                LogicalOp::And => children.iter().all(|child| child.matches(row)),
                LogicalOp::Or => children.iter().any(|child| child.matches(row)),
            },
        }
    }
}

/// Evaluates a single comparison against a row.
pub fn evaluate_leaf(comparison: &Comparison, row: &Row, schema: &Schema) -> Result<bool> {
    Ok(BoundCondition::bind_leaf(comparison, schema)?.matches(row))
}

/// Evaluates a group of conditions against a row. An empty AND group is
/// true, an empty OR group is false.
pub fn evaluate_group(group: &ConditionGroup, row: &Row, schema: &Schema) -> Result<bool> {
    Ok(BoundCondition::bind_group(group, schema)?.matches(row))
}

/// Evaluates an arbitrarily nested condition tree against a row.
pub fn evaluate_nested(condition: &Condition, row: &Row, schema: &Schema) -> Result<bool> {
    Ok(BoundCondition::bind(condition, schema)?.matches(row))
}
