//! FeatherDB
//!
//! A small SQL front-end and evaluator over flat-file tables.
//!
//! ## Pipeline
//! text → [`sql::Tokenizer`] → [`sql::Parser`] → [`sql::Statement`] →
//! [`sql::QueryExecutor`] → [`storage::Storage`] → result table or row count
//!
//! ```no_run
//! use featherdb::{execute_sql, DbConfig, FileStorage};
//! use std::sync::Arc;
//!
//! let storage = Arc::new(FileStorage::new(&DbConfig::default()));
//! execute_sql(storage.clone(), "CREATE TABLE t (id INT, name STRING)")?;
//! execute_sql(storage.clone(), "INSERT INTO t (id, name) VALUES (1, 'x')")?;
//! let result = execute_sql(storage, "SELECT * FROM t")?;
//! print!("{}", result);
//! # Ok::<(), featherdb::FeatherError>(())
//! ```

pub mod config;
pub mod storage;
pub mod types;
pub mod sql;

mod error;

pub use config::DbConfig;
pub use error::{FeatherError, Result};
pub use storage::{FileStorage, MemoryStorage, Storage};
pub use types::{Column, Row, Table};
pub use sql::{execute_sql, parse_sql, QueryResult};
