//! Core types: data types, schemas, predicates and result sets

pub mod data_type;
pub mod predicate;
pub mod result;
pub mod schema;

pub use data_type::DataType;
pub use predicate::{Comparison, Condition, ConditionGroup, LogicalOp, Operator};
pub use result::ResultSet;
pub use schema::{Column, Schema};

/// A row of cells, positionally aligned with the table's columns
pub type Row = Vec<String>;
