//! In-process typed table engine
//!
//! A [`Table`] holds an ordered sequence of rows under a fixed schema of
//! Integer, String and Date columns. On top of the row store it offers:
//!
//! - hash indexes on single columns, an identifier index and composite
//!   indexes over column pairs, all kept in step with the rows
//! - equality selects, operator filters and nested AND/OR predicate search
//! - multi-column sorting, equi-joins and grouped aggregates
//! - stacked transactions that buffer writes until commit
//! - a comma-delimited interchange format and a tab-delimited save format
//!
//! ```
//! use proven_table::{Aggregate, Table, types::Column};
//!
//! let table = Table::new(
//!     "Employees",
//!     vec![Column::integer("ID"), Column::string("Dept"), Column::integer("Salary")],
//! )?;
//! table.insert_row(["1", "Eng", "100"])?;
//! table.insert_row(["2", "Eng", "200"])?;
//! table.insert_row(["3", "Ops", "50"])?;
//!
//! let averages = table.grouped_aggregate("Dept", "Salary", Aggregate::Avg)?;
//! assert_eq!(averages["Eng"], 150.0);
//! # Ok::<(), proven_table::Error>(())
//! ```

pub mod config;
pub mod error;
pub mod execution;
pub mod format;
pub mod storage;
pub mod table;
pub mod transaction;
pub mod types;

pub use config::{IndexMaintenance, TableConfig};
pub use error::{Error, ErrorKind, Result};
pub use execution::Aggregate;
pub use format::ImportSummary;
pub use table::Table;
pub use transaction::{CommitSummary, TransactionState};
