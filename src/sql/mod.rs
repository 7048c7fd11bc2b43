/// FeatherDB SQL engine
///
/// Architecture:
/// - Tokenizer: classifies SQL text into tokens, lazily
/// - Parser: builds an AST with one token of lookahead
/// - Evaluator: applies single-predicate WHERE text to rows
/// - Executor: runs statements against a storage backend

pub mod token;
pub mod lexer;
pub mod ast;
pub mod parser;
pub mod evaluator;
pub mod executor;

pub use token::{Token, TokenKind};
pub use lexer::Tokenizer;
pub use ast::{
    CreateTableStmt, DeleteStmt, InsertStmt, SelectStmt, Statement, TableSource, UpdateStmt,
};
pub use parser::Parser;
pub use evaluator::ConditionEvaluator;
pub use executor::{QueryExecutor, QueryResult, Mutation};

use crate::error::Result;
use crate::storage::Storage;
use std::sync::Arc;

/// Parse one SQL statement
pub fn parse_sql(sql: &str) -> Result<Statement> {
    Parser::new(Tokenizer::new(sql))?.parse()
}

/// Parse and execute a SQL statement
pub fn execute_sql(storage: Arc<dyn Storage>, sql: &str) -> Result<QueryResult> {
    let statement = parse_sql(sql)?;
    QueryExecutor::new(storage).execute(statement)
}
