//! Text formats for bulk loading and dumping a table

pub mod delimited;
pub mod tabbed;

pub use delimited::ImportSummary;
