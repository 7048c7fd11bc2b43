//! Storage layer
//!
//! The SQL engine only talks to tables through the [`Storage`] trait. Every
//! statement loads a fresh snapshot; nothing is cached between statements.

pub mod file_manager;
pub mod memory;

pub use file_manager::FileStorage;
pub use memory::MemoryStorage;

use crate::error::Result;
use crate::types::{Column, Row, Table};

/// Table persistence used by the query executor
///
/// Operations that report success as `bool` return `Ok(false)` for the
/// expected failure (table exists, nothing to remove) and `Err` for I/O
/// problems.
pub trait Storage: Send + Sync {
    /// Create an empty table. `Ok(false)` if the name is taken.
    fn create_table(&self, name: &str, columns: &[Column]) -> Result<bool>;

    /// Load schema and rows. Unknown tables come back as [`Table::missing`].
    fn load_table(&self, name: &str) -> Result<Table>;

    /// Replace all rows of `table.name`. The schema is not rewritten.
    fn save_table(&self, table: &Table) -> Result<bool>;

    fn append_row(&self, name: &str, row: &Row) -> Result<bool>;

    fn drop_table(&self, name: &str) -> Result<bool>;

    /// Table names in ascending order
    fn list_tables(&self) -> Result<Vec<String>>;

    /// Columns only, no rows
    fn get_table_schema(&self, name: &str) -> Result<Table>;
}
