/// Query executor - runs parsed statements against a [`Storage`]
///
/// Each statement works on a fresh snapshot: SELECT reads the whole table,
/// UPDATE and DELETE read it, change it in memory and write every row back.
use super::ast::*;
use super::evaluator::{find_in_subquery, is_integer_literal, ConditionEvaluator};
use super::lexer::Tokenizer;
use super::parser::Parser;
use crate::error::{FeatherError, Result};
use crate::storage::Storage;
use crate::types::{Column, Row, Table};
use ahash::AHashSet;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Name given to the result of a nested `FROM (SELECT ...)`
pub const NESTED_TABLE_NAME: &str = "nested";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Insert,
    Update,
    Delete,
}

/// Query result
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    /// SELECT result
    Select(Table),

    /// INSERT/UPDATE/DELETE result
    Modification {
        kind: Mutation,
        affected_rows: usize,
    },

    /// CREATE result
    Definition { message: String },
}

impl QueryResult {
    pub fn affected_rows(&self) -> usize {
        match self {
            QueryResult::Modification { affected_rows, .. } => *affected_rows,
            _ => 0,
        }
    }

    /// Result table of a SELECT, `None` otherwise
    pub fn table(&self) -> Option<&Table> {
        match self {
            QueryResult::Select(table) => Some(table),
            _ => None,
        }
    }
}

impl fmt::Display for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryResult::Select(table) => write!(f, "{}", table),
            QueryResult::Definition { message } => writeln!(f, "{}", message),
            QueryResult::Modification { kind, affected_rows } => match kind {
                Mutation::Insert if *affected_rows == 1 => writeln!(f, "1 row inserted."),
                Mutation::Insert => writeln!(f, "{} rows inserted.", affected_rows),
                Mutation::Update => writeln!(f, "{} rows updated.", affected_rows),
                Mutation::Delete => writeln!(f, "{} rows deleted.", affected_rows),
            },
        }
    }
}

/// Sort key for ORDER BY on one column.
///
/// Integers order numerically and before anything that fails to parse; the
/// rest compare byte-wise. Mixing numeric and lexical comparison per pair
/// would not be a total order, which `sort_by` requires.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum SortKey<'a> {
    Int(i64),
    Text(&'a str),
}

impl<'a> SortKey<'a> {
    fn of(row: &'a Row, index: usize, numeric: bool) -> Self {
        let cell = row.get(index).unwrap_or("");
        match cell.parse::<i64>() {
            Ok(n) if numeric => SortKey::Int(n),
            _ => SortKey::Text(cell),
        }
    }
}

/// Stable sort of `rows` by the column at `index`
pub fn sort_rows(rows: &mut [Row], index: usize, numeric: bool) {
    rows.sort_by(|a, b| SortKey::of(a, index, numeric).cmp(&SortKey::of(b, index, numeric)));
}

/// A WHERE condition ready to test rows
enum RowFilter<'t> {
    /// No condition
    All,
    /// `<column> IN (...)`; an unknown probe column matches nothing
    In {
        index: Option<usize>,
        allowed: AHashSet<String>,
    },
    /// Single predicate text handed to the evaluator
    Condition {
        evaluator: ConditionEvaluator<'t>,
        condition: &'t str,
    },
}

impl RowFilter<'_> {
    fn matches(&self, row: &Row) -> bool {
        match self {
            RowFilter::All => true,
            RowFilter::In { index, allowed } => index
                .and_then(|i| row.get(i))
                .is_some_and(|value| allowed.contains(value)),
            RowFilter::Condition {
                evaluator,
                condition,
            } => evaluator.matches(row, condition),
        }
    }
}

pub struct QueryExecutor {
    storage: Arc<dyn Storage>,
}

impl QueryExecutor {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Execute one statement
    pub fn execute(&self, statement: Statement) -> Result<QueryResult> {
        debug!(kind = statement.kind(), sql = %statement, "executing statement");
        match statement {
            Statement::CreateTable(stmt) => self.execute_create(&stmt),
            Statement::Insert(stmt) => self.execute_insert(&stmt),
            Statement::Select(stmt) => self.execute_select(&stmt).map(QueryResult::Select),
            Statement::Update(stmt) => self.execute_update(&stmt),
            Statement::Delete(stmt) => self.execute_delete(&stmt),
        }
    }

    fn execute_create(&self, stmt: &CreateTableStmt) -> Result<QueryResult> {
        let columns: Vec<Column> = stmt
            .columns
            .iter()
            .map(|(name, col_type)| Column::new(name.as_str(), col_type.as_str()))
            .collect();

        if !self.storage.create_table(&stmt.table, &columns)? {
            return Err(FeatherError::TableExists(stmt.table.clone()));
        }
        Ok(QueryResult::Definition {
            message: format!("Table '{}' created.", stmt.table),
        })
    }

    /// Validate everything first, then append exactly one row.
    fn execute_insert(&self, stmt: &InsertStmt) -> Result<QueryResult> {
        let schema = self.storage.get_table_schema(&stmt.table)?;
        if schema.is_missing() {
            return Err(FeatherError::TableNotFound(stmt.table.clone()));
        }

        if stmt.values.len() != schema.columns.len() {
            return Err(FeatherError::ColumnCountMismatch {
                expected: schema.columns.len(),
                found: stmt.values.len(),
            });
        }
        if stmt.columns.len() != stmt.values.len() {
            return Err(FeatherError::ColumnCountMismatch {
                expected: stmt.columns.len(),
                found: stmt.values.len(),
            });
        }

        // Place each value at its named column's position
        let mut slots: Vec<Option<String>> = vec![None; schema.columns.len()];
        for (name, value) in stmt.columns.iter().zip(&stmt.values) {
            let index = schema
                .column_index(name)
                .ok_or_else(|| FeatherError::ColumnNotFound(name.clone()))?;
            if slots[index].is_some() {
                return Err(FeatherError::DuplicateColumn(name.clone()));
            }
            slots[index] = Some(value.clone());
        }
        let values: Vec<String> = slots.into_iter().map(Option::unwrap_or_default).collect();

        for (column, value) in schema.columns.iter().zip(&values) {
            if column.is_int() && !is_integer_literal(value) {
                return Err(FeatherError::InvalidInteger {
                    value: value.clone(),
                    column: column.name.clone(),
                });
            }
        }

        if !self.storage.append_row(&stmt.table, &Row::new(values))? {
            return Err(FeatherError::WriteFailed(stmt.table.clone()));
        }
        Ok(QueryResult::Modification {
            kind: Mutation::Insert,
            affected_rows: 1,
        })
    }

    /// Run a SELECT and return its result table.
    ///
    /// A missing named table is an error here; nested FROM and IN subqueries
    /// downgrade it to an empty table.
    pub fn execute_select(&self, stmt: &SelectStmt) -> Result<Table> {
        let source = match &stmt.from {
            TableSource::Table(name) => {
                let table = self.storage.load_table(name)?;
                if table.is_missing() {
                    return Err(FeatherError::TableNotFound(name.clone()));
                }
                table
            }
            TableSource::Subquery(inner) => {
                let mut table = self.select_or_empty(inner)?;
                table.name = NESTED_TABLE_NAME.to_string();
                table
            }
        };

        let mut filtered = self.filter(source, &stmt.condition)?;

        if !stmt.order_by.is_empty() {
            match filtered.column_index(&stmt.order_by) {
                Some(index) => {
                    let numeric = filtered.columns[index].is_int();
                    sort_rows(&mut filtered.rows, index, numeric);
                }
                None => warn!(
                    column = %stmt.order_by,
                    "ORDER BY column not found, rows left unsorted"
                ),
            }
        }

        if stmt.is_select_star() {
            return Ok(filtered);
        }
        Ok(project(filtered, &stmt.columns))
    }

    fn select_or_empty(&self, stmt: &SelectStmt) -> Result<Table> {
        match self.execute_select(stmt) {
            Err(FeatherError::TableNotFound(name)) => {
                warn!(table = %name, "table not found in subquery, using empty result");
                Ok(Table::default())
            }
            other => other,
        }
    }

    fn filter(&self, mut source: Table, condition: &str) -> Result<Table> {
        if condition.is_empty() {
            return Ok(source);
        }

        let rows = std::mem::take(&mut source.rows);
        let kept = {
            let row_filter = self.row_filter(&source, condition)?;
            rows.into_iter().filter(|row| row_filter.matches(row)).collect()
        };
        source.rows = kept;
        Ok(source)
    }

    /// Resolve a WHERE condition against `table`, running an IN subquery once
    fn row_filter<'t>(&self, table: &'t Table, condition: &'t str) -> Result<RowFilter<'t>> {
        if condition.is_empty() {
            return Ok(RowFilter::All);
        }
        match find_in_subquery(condition) {
            Some(subquery) => Ok(RowFilter::In {
                index: table.column_index(subquery.column),
                allowed: self.subquery_values(subquery.sql)?,
            }),
            None => Ok(RowFilter::Condition {
                evaluator: ConditionEvaluator::new(table),
                condition,
            }),
        }
    }

    /// First-column values of an `IN (...)` subquery
    fn subquery_values(&self, sql: &str) -> Result<AHashSet<String>> {
        let statement = Parser::new(Tokenizer::new(sql))?.parse()?;
        let Statement::Select(select) = statement else {
            warn!(sql, "IN subquery is not a SELECT, matching nothing");
            return Ok(AHashSet::new());
        };

        let result = self.select_or_empty(&select)?;
        Ok(result
            .rows
            .into_iter()
            .filter_map(|row| row.values.into_iter().next())
            .collect())
    }

    fn execute_update(&self, stmt: &UpdateStmt) -> Result<QueryResult> {
        let mut table = self.storage.load_table(&stmt.table)?;
        if table.is_missing() {
            return Err(FeatherError::TableNotFound(stmt.table.clone()));
        }
        let index = table
            .column_index(&stmt.column)
            .ok_or_else(|| FeatherError::ColumnNotFound(stmt.column.clone()))?;

        let mut rows = std::mem::take(&mut table.rows);
        let mut count = 0;
        {
            let row_filter = self.row_filter(&table, &stmt.condition)?;
            for row in rows.iter_mut() {
                if !row_filter.matches(row) {
                    continue;
                }
                if let Some(cell) = row.values.get_mut(index) {
                    *cell = stmt.value.clone();
                    count += 1;
                }
            }
        }
        table.rows = rows;

        if !self.storage.save_table(&table)? {
            return Err(FeatherError::WriteFailed(stmt.table.clone()));
        }
        Ok(QueryResult::Modification {
            kind: Mutation::Update,
            affected_rows: count,
        })
    }

    /// Without a condition nothing is removed.
    fn execute_delete(&self, stmt: &DeleteStmt) -> Result<QueryResult> {
        let mut table = self.storage.load_table(&stmt.table)?;
        if table.is_missing() {
            return Err(FeatherError::TableNotFound(stmt.table.clone()));
        }

        let rows = std::mem::take(&mut table.rows);
        let before = rows.len();
        let kept: Vec<Row> = if stmt.condition.is_empty() {
            rows
        } else {
            let row_filter = self.row_filter(&table, &stmt.condition)?;
            rows.into_iter().filter(|row| !row_filter.matches(row)).collect()
        };
        let removed = before - kept.len();
        table.rows = kept;

        if !self.storage.save_table(&table)? {
            return Err(FeatherError::WriteFailed(stmt.table.clone()));
        }
        Ok(QueryResult::Modification {
            kind: Mutation::Delete,
            affected_rows: removed,
        })
    }
}

/// Keep the requested columns in the requested order. Unknown names are
/// dropped without complaint.
fn project(table: Table, names: &[String]) -> Table {
    let indices: Vec<usize> = names
        .iter()
        .filter_map(|name| table.column_index(name))
        .collect();

    let columns = indices.iter().map(|&i| table.columns[i].clone()).collect();
    let rows = table
        .rows
        .iter()
        .map(|row| {
            Row::new(
                indices
                    .iter()
                    .map(|&i| row.get(i).unwrap_or_default().to_string())
                    .collect(),
            )
        })
        .collect();

    Table {
        name: table.name,
        columns,
        rows,
    }
}
