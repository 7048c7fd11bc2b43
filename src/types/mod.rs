//! Tabular data model for FeatherDB
//!
//! Everything is a string until a comparison needs it to be a number.

mod table;

pub use table::{Column, Row, Table};
