//! Storage module for proven-table
//!
//! The row store owns a table's schema, rows and indexes; the index module
//! provides the derived lookup structures it maintains.

pub mod index;
pub mod store;

pub use index::{CompositeIndex, HashIndex, IndexManager};
pub use store::RowStore;
