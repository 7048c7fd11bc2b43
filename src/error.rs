//! Error types for FeatherDB

use thiserror::Error;

pub type Result<T> = std::result::Result<T, FeatherError>;

#[derive(Error, Debug)]
pub enum FeatherError {
    // Tokenizer errors
    #[error("Unterminated string literal")]
    UnterminatedString,

    #[error("Invalid character encountered: '{0}'")]
    InvalidCharacter(char),

    // Parser errors
    #[error("Parse error: {0}")]
    Parse(String),

    // Execution errors (detected before any side effect)
    #[error("Table '{0}' not found")]
    TableNotFound(String),

    #[error("Table '{0}' already exists or create failed")]
    TableExists(String),

    #[error("Column '{0}' not found")]
    ColumnNotFound(String),

    #[error("Column count mismatch: expected {expected}, found {found}")]
    ColumnCountMismatch { expected: usize, found: usize },

    #[error("Column '{0}' given more than once")]
    DuplicateColumn(String),

    #[error("Could not write to table '{0}'")]
    WriteFailed(String),

    #[error("Invalid INT value '{value}' for column '{column}'")]
    InvalidInteger { value: String, column: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),
}

impl FeatherError {
    /// True for errors raised while turning text into an AST.
    pub fn is_syntax(&self) -> bool {
        matches!(
            self,
            FeatherError::UnterminatedString
                | FeatherError::InvalidCharacter(_)
                | FeatherError::Parse(_)
        )
    }
}

impl From<serde_json::Error> for FeatherError {
    fn from(err: serde_json::Error) -> Self {
        FeatherError::Config(err.to_string())
    }
}
