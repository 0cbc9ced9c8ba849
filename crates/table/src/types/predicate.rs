//! Predicate trees over table rows
//!
//! A [`Condition`] is either a single column comparison or a group of
//! conditions joined by AND/OR. Groups nest to any depth.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Comparison operator of a leaf condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "==", alias = "=")]
    Equal,
    #[serde(rename = "!=", alias = "<>")]
    NotEqual,
    #[serde(rename = "<")]
    LessThan,
    #[serde(rename = ">")]
    GreaterThan,
    #[serde(rename = "<=")]
    LessThanOrEqual,
    #[serde(rename = ">=")]
    GreaterThanOrEqual,
}

impl Operator {
    /// Applies the operator to two numbers.
    pub fn apply_numeric(&self, left: f64, right: f64) -> bool {
        match self {
            Operator::Equal => left == right,
            Operator::NotEqual => left != right,
            Operator::LessThan => left < right,
            Operator::GreaterThan => left > right,
            Operator::LessThanOrEqual => left <= right,
            Operator::GreaterThanOrEqual => left >= right,
        }
    }

    /// Applies the operator to two non-numeric cells. Only equality and
    /// inequality are defined on text; ordering operators yield false.
    pub fn apply_text(&self, left: &str, right: &str) -> bool {
        match self {
            Operator::Equal => left == right,
            Operator::NotEqual => left != right,
            _ => false,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Operator::Equal => "==",
            Operator::NotEqual => "!=",
            Operator::LessThan => "<",
            Operator::GreaterThan => ">",
            Operator::LessThanOrEqual => "<=",
            Operator::GreaterThanOrEqual => ">=",
        };
        write!(f, "{}", symbol)
    }
}

impl FromStr for Operator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "==" | "=" => Ok(Operator::Equal),
            "!=" | "<>" => Ok(Operator::NotEqual),
            "<" => Ok(Operator::LessThan),
            ">" => Ok(Operator::GreaterThan),
            "<=" => Ok(Operator::LessThanOrEqual),
            ">=" => Ok(Operator::GreaterThanOrEqual),
            other => Err(Error::Parse(format!("unknown operator: {}", other))),
        }
    }
}

/// Logical connective of a condition group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicalOp {
    #[serde(rename = "AND", alias = "and")]
    And,
    #[serde(rename = "OR", alias = "or")]
    Or,
}

impl fmt::Display for LogicalOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalOp::And => write!(f, "AND"),
            LogicalOp::Or => write!(f, "OR"),
        }
    }
}

impl FromStr for LogicalOp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AND" | "&&" => Ok(LogicalOp::And),
            "OR" | "||" => Ok(LogicalOp::Or),
            other => Err(Error::Parse(format!("unknown logical operator: {}", other))),
        }
    }
}

/// A single `column operator value` test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub column: String,
    pub operator: Operator,
    pub value: String,
}

impl Comparison {
    pub fn new(column: impl Into<String>, operator: Operator, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            operator,
            value: value.into(),
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {:?}", self.column, self.operator, self.value)
    }
}

/// Conditions combined with one logical operator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionGroup {
    pub op: LogicalOp,
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl ConditionGroup {
    pub fn new(op: LogicalOp, conditions: Vec<Condition>) -> Self {
        Self { op, conditions }
    }

    /// Builds a flat group out of plain comparisons.
    pub fn flat(op: LogicalOp, comparisons: Vec<Comparison>) -> Self {
        Self {
            op,
            conditions: comparisons.into_iter().map(Condition::Leaf).collect(),
        }
    }
}

/// A predicate tree: a leaf comparison or a nested group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Condition {
    Leaf(Comparison),
    Group(ConditionGroup),
}

impl Condition {
    pub fn leaf(column: impl Into<String>, operator: Operator, value: impl Into<String>) -> Self {
        Condition::Leaf(Comparison::new(column, operator, value))
    }

    pub fn and(conditions: Vec<Condition>) -> Self {
        Condition::Group(ConditionGroup::new(LogicalOp::And, conditions))
    }

    pub fn or(conditions: Vec<Condition>) -> Self {
        Condition::Group(ConditionGroup::new(LogicalOp::Or, conditions))
    }

    /// Depth of the tree; a leaf has depth 1.
    pub fn depth(&self) -> usize {
        match self {
            Condition::Leaf(_) => 1,
            Condition::Group(group) => {
                1 + group.conditions.iter().map(|c| c.depth()).max().unwrap_or(0)
            }
        }
    }
}

impl From<Comparison> for Condition {
    fn from(comparison: Comparison) -> Self {
        Condition::Leaf(comparison)
    }
}

impl From<ConditionGroup> for Condition {
    fn from(group: ConditionGroup) -> Self {
        Condition::Group(group)
    }
}
