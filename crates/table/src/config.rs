//! Table configuration

use serde::{Deserialize, Serialize};

/// How secondary indexes are repaired after a mutation that shifts row
/// positions (deletes and sorts).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum IndexMaintenance {
    /// Rebuild every index as part of the mutating operation.
    #[default]
    Eager,
    /// Mark indexes stale and rebuild them on the next lookup.
    Lazy,
}

/// Per-table configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableConfig {
    /// Column that receives the automatic identifier index (default: `ID`)
    pub id_column: String,

    /// Index repair strategy for position-shifting mutations
    pub index_maintenance: IndexMaintenance,

    /// Cell separator of the interchange format (default: `,`)
    pub delimiter: char,

    /// Whether exported interchange headers carry `name:Type` annotations
    pub typed_headers: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            id_column: "ID".to_string(),
            index_maintenance: IndexMaintenance::Eager,
            delimiter: ',',
            typed_headers: true,
        }
    }
}

impl TableConfig {
    /// Sets the identifier column name.
    pub fn with_id_column(mut self, column: impl Into<String>) -> Self {
        self.id_column = column.into();
        self
    }

    /// Sets the index repair strategy.
    pub fn with_index_maintenance(mut self, maintenance: IndexMaintenance) -> Self {
        self.index_maintenance = maintenance;
        self
    }

    /// Sets the interchange delimiter.
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Sets whether exported headers are type-annotated.
    pub fn with_typed_headers(mut self, typed: bool) -> Self {
        self.typed_headers = typed;
        self
    }
}
