/// Abstract Syntax Tree for SQL statements
///
/// WHERE clauses are kept as condition text rather than an expression tree;
/// see [`crate::sql::evaluator`] for how that text is interpreted.
use super::evaluator::is_integer_literal;
use std::fmt;

/// Top-level SQL statement
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Select(SelectStmt),
    Insert(InsertStmt),
    Update(UpdateStmt),
    Delete(DeleteStmt),
    CreateTable(CreateTableStmt),
}

/// Row source of a SELECT
#[derive(Debug, Clone, PartialEq)]
pub enum TableSource {
    Table(String),
    /// `FROM (SELECT ...)`
    Subquery(Box<SelectStmt>),
}

/// SELECT statement
#[derive(Debug, Clone, PartialEq)]
pub struct SelectStmt {
    /// Requested column names, or a single `*`
    pub columns: Vec<String>,
    pub from: TableSource,
    /// Raw condition text; empty when there is no WHERE
    pub condition: String,
    /// Single sort column; empty when there is no ORDER BY
    pub order_by: String,
}

impl SelectStmt {
    pub fn is_select_star(&self) -> bool {
        self.columns.len() == 1 && self.columns[0] == "*"
    }

    /// Name of the source table, `None` for a nested FROM
    pub fn table(&self) -> Option<&str> {
        match &self.from {
            TableSource::Table(name) => Some(name),
            TableSource::Subquery(_) => None,
        }
    }
}

/// INSERT statement
#[derive(Debug, Clone, PartialEq)]
pub struct InsertStmt {
    pub table: String,
    pub columns: Vec<String>,
    /// Literal values; the column count is only checked at execution time
    pub values: Vec<String>,
}

/// UPDATE statement (one assignment)
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStmt {
    pub table: String,
    pub column: String,
    pub value: String,
    pub condition: String,
}

/// DELETE statement
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteStmt {
    pub table: String,
    pub condition: String,
}

/// CREATE TABLE statement
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTableStmt {
    pub table: String,
    /// `(name, type)` pairs; the type is kept verbatim
    pub columns: Vec<(String, String)>,
}

impl Statement {
    /// Upper-case verb of the statement, as used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            Statement::Select(_) => "SELECT",
            Statement::Insert(_) => "INSERT",
            Statement::Update(_) => "UPDATE",
            Statement::Delete(_) => "DELETE",
            Statement::CreateTable(_) => "CREATE",
        }
    }
}

/// Integer literals as-is, anything else single-quoted
fn quote_value(value: &str) -> String {
    if is_integer_literal(value) {
        value.to_string()
    } else {
        format!("'{}'", value)
    }
}

fn write_condition(f: &mut fmt::Formatter<'_>, condition: &str) -> fmt::Result {
    if condition.is_empty() {
        Ok(())
    } else {
        write!(f, " WHERE {}", condition.trim_end())
    }
}

impl fmt::Display for SelectStmt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SELECT {} FROM ", self.columns.join(", "))?;
        match &self.from {
            TableSource::Table(name) => write!(f, "{}", name)?,
            TableSource::Subquery(inner) => write!(f, "({})", inner)?,
        }
        write_condition(f, &self.condition)?;
        if !self.order_by.is_empty() {
            write!(f, " ORDER BY {}", self.order_by)?;
        }
        Ok(())
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Select(s) => write!(f, "{}", s),
            Statement::Insert(i) => write!(
                f,
                "INSERT INTO {} ({}) VALUES ({})",
                i.table,
                i.columns.join(", "),
                i.values.iter().map(|v| quote_value(v)).collect::<Vec<_>>().join(", ")
            ),
            Statement::Update(u) => {
                write!(f, "UPDATE {} SET {} = {}", u.table, u.column, quote_value(&u.value))?;
                write_condition(f, &u.condition)
            }
            Statement::Delete(d) => {
                write!(f, "DELETE FROM {}", d.table)?;
                write_condition(f, &d.condition)
            }
            Statement::CreateTable(c) => {
                let columns: Vec<String> = c
                    .columns
                    .iter()
                    .map(|(name, ty)| format!("{} {}", name, ty))
                    .collect();
                write!(f, "CREATE TABLE {} ({})", c.table, columns.join(", "))
            }
        }
    }
}
