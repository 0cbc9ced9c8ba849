//! Read-only query operations over a table's rows
//!
//! Everything here works on a schema plus a row slice; locking and index
//! use are the caller's business.

pub mod aggregator;
pub mod evaluator;
pub mod join;
pub mod select;
pub mod sort;

pub use aggregator::Aggregate;
pub use evaluator::{BoundCondition, evaluate_group, evaluate_leaf, evaluate_nested};
