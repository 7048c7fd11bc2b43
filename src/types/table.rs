/// Table snapshot types shared by storage and the SQL engine
use serde::{Deserialize, Serialize};
use std::fmt;

/// Width of one cell when a table is rendered as text.
const CELL_WIDTH: usize = 15;

/// Column definition
///
/// The type is kept as written in `CREATE TABLE`; only `INT` (any case) gets
/// numeric semantics, everything else is compared as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub col_type: String,
}

impl Column {
    pub fn new(name: impl Into<String>, col_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            col_type: col_type.into(),
        }
    }

    pub fn is_int(&self) -> bool {
        self.col_type.eq_ignore_ascii_case("INT")
    }
}

/// One row: string values aligned by position with the table's columns
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    pub values: Vec<String>,
}

impl Row {
    pub fn new(values: Vec<String>) -> Self {
        Self { values }
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.values.get(index).map(String::as_str)
    }
}

impl From<Vec<String>> for Row {
    fn from(values: Vec<String>) -> Self {
        Self { values }
    }
}

impl From<Vec<&str>> for Row {
    fn from(values: Vec<&str>) -> Self {
        Self {
            values: values.into_iter().map(str::to_string).collect(),
        }
    }
}

/// Transient table snapshot
///
/// A table with no columns means "not found": storage hands one back (with
/// the requested name) instead of failing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
    pub rows: Vec<Row>,
}

impl Table {
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    /// Schema-only placeholder returned for unknown tables
    pub fn missing(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new())
    }

    pub fn is_missing(&self) -> bool {
        self.columns.is_empty()
    }

    /// Position of a column by exact (case-sensitive) name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Copy of this table's name and columns with no rows
    pub fn schema(&self) -> Table {
        Table::new(self.name.clone(), self.columns.clone())
    }

    /// `CREATE TABLE` statement that reproduces this schema
    pub fn create_sql(&self) -> String {
        let columns: Vec<String> = self
            .columns
            .iter()
            .map(|c| format!("{} {}", c.name, c.col_type))
            .collect();
        format!("CREATE TABLE {} ({})", self.name, columns.join(", "))
    }
}

impl fmt::Display for Table {
    /// Fixed-width layout: header, underline, then one line per row
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for col in &self.columns {
            write!(f, "{:<width$}", col.name, width = CELL_WIDTH)?;
        }
        writeln!(f)?;
        for _ in &self.columns {
            write!(f, "{}", "-".repeat(CELL_WIDTH))?;
        }
        writeln!(f)?;
        for row in &self.rows {
            for value in &row.values {
                write!(f, "{:<width$}", value, width = CELL_WIDTH)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users() -> Table {
        let mut table = Table::new(
            "users",
            vec![Column::new("id", "INT"), Column::new("name", "STRING")],
        );
        table.rows.push(Row::from(vec!["1", "alice"]));
        table
    }

    #[test]
    fn test_int_type_is_case_insensitive() {
        assert!(Column::new("a", "INT").is_int());
        assert!(Column::new("a", "int").is_int());
        assert!(Column::new("a", "Int").is_int());
        assert!(!Column::new("a", "INTEGER").is_int());
        assert!(!Column::new("a", "STRING").is_int());
    }

    #[test]
    fn test_column_index() {
        let table = users();
        assert_eq!(table.column_index("name"), Some(1));
        assert_eq!(table.column_index("NAME"), None);
        assert_eq!(table.column_index("age"), None);
    }

    #[test]
    fn test_missing_sentinel() {
        let missing = Table::missing("ghost");
        assert!(missing.is_missing());
        assert_eq!(missing.name, "ghost");
        assert!(!users().is_missing());
    }

    #[test]
    fn test_create_sql() {
        assert_eq!(users().create_sql(), "CREATE TABLE users (id INT, name STRING)");
    }

    #[test]
    fn test_display_layout() {
        let text = users().to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("id             name"));
        assert_eq!(lines[1], "-".repeat(30));
        assert!(lines[2].starts_with("1              alice"));
    }
}
