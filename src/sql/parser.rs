/// SQL Parser - recursive descent with a single token of lookahead
use super::ast::*;
use super::lexer::Tokenizer;
use super::token::{Token, TokenKind};
use crate::error::{FeatherError, Result};

/// Comparison operators the tokenizer splits into two tokens
const COMPOUND_OPERATORS: &[&str] = &[">=", "<=", "!="];

/// Where a WHERE clause stops collecting tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConditionEnd {
    /// SELECT: an unbalanced `)`, `ORDER`, `;` or end of input
    Select,
    /// UPDATE / DELETE: `;` or end of input
    Statement,
}

pub struct Parser {
    tokenizer: Tokenizer,
    current: Token,
}

impl Parser {
    /// Wrap a tokenizer and load the first token
    pub fn new(tokenizer: Tokenizer) -> Result<Self> {
        let mut parser = Self {
            tokenizer,
            current: Token::end(0),
        };
        parser.advance()?;
        Ok(parser)
    }

    /// Parse one statement starting at the current token.
    ///
    /// Anything after the statement (such as a trailing `;`) is left unread.
    pub fn parse(&mut self) -> Result<Statement> {
        if self.current.kind != TokenKind::Keyword {
            return Err(self.error(&format!("Expected SQL keyword, got '{}'", self.current.text)));
        }

        match self.current.text.as_str() {
            "SELECT" => Ok(Statement::Select(self.parse_select()?)),
            "INSERT" => Ok(Statement::Insert(self.parse_insert()?)),
            "UPDATE" => Ok(Statement::Update(self.parse_update()?)),
            "DELETE" => Ok(Statement::Delete(self.parse_delete()?)),
            "CREATE" => Ok(Statement::CreateTable(self.parse_create()?)),
            other => Err(self.error(&format!("unknown command '{}'", other))),
        }
    }

    /// CREATE TABLE name ( col type [, ...] )
    fn parse_create(&mut self) -> Result<CreateTableStmt> {
        self.advance()?; // CREATE
        self.expect("TABLE")?;
        let table = self.expect_kind(TokenKind::Identifier)?;
        self.expect("(")?;

        let mut columns = Vec::new();
        while !self.current.is_symbol(")") && !self.current.is_symbol(";") {
            let name = self.expect_kind(TokenKind::Identifier)?;
            // Type names may be keywords (INT, STRING) or any identifier
            if !matches!(self.current.kind, TokenKind::Identifier | TokenKind::Keyword) {
                return Err(self.error(&format!(
                    "Expected type definition for column '{}', got '{}'",
                    name, self.current.text
                )));
            }
            let col_type = self.current.text.clone();
            self.advance()?;
            columns.push((name, col_type));

            if self.current.is_symbol(",") {
                self.advance()?;
            }
        }
        self.expect(")")?;

        Ok(CreateTableStmt { table, columns })
    }

    /// SELECT cols FROM (table | ( SELECT ... )) [WHERE ...] [ORDER BY col]
    fn parse_select(&mut self) -> Result<SelectStmt> {
        self.advance()?; // SELECT
        let columns = self.parse_list()?;
        self.expect("FROM")?;

        let from = if self.current.is_symbol("(") {
            self.advance()?;
            let inner = match self.parse()? {
                Statement::Select(inner) => inner,
                other => {
                    return Err(self.error(&format!(
                        "Nested FROM must be a SELECT, got {}",
                        other.kind()
                    )))
                }
            };
            self.expect(")")?;
            TableSource::Subquery(Box::new(inner))
        } else {
            TableSource::Table(self.expect_kind(TokenKind::Identifier)?)
        };

        let condition = if self.current.is_keyword("WHERE") {
            self.advance()?;
            self.parse_condition(ConditionEnd::Select)?
        } else {
            String::new()
        };

        let order_by = if self.current.is_keyword("ORDER") {
            self.advance()?;
            self.expect("BY")?;
            self.expect_kind(TokenKind::Identifier)?
        } else {
            String::new()
        };

        Ok(SelectStmt {
            columns,
            from,
            condition,
            order_by,
        })
    }

    /// INSERT INTO table ( cols ) VALUES ( vals )
    fn parse_insert(&mut self) -> Result<InsertStmt> {
        self.advance()?; // INSERT
        self.expect("INTO")?;
        let table = self.expect_kind(TokenKind::Identifier)?;

        self.expect("(")?;
        let columns = self.parse_list()?;
        self.expect(")")?;

        self.expect("VALUES")?;

        self.expect("(")?;
        let mut values = vec![self.parse_value()?];
        while self.current.is_symbol(",") {
            self.advance()?;
            values.push(self.parse_value()?);
        }
        self.expect(")")?;

        Ok(InsertStmt {
            table,
            columns,
            values,
        })
    }

    /// UPDATE table SET col = value [WHERE ...]
    fn parse_update(&mut self) -> Result<UpdateStmt> {
        self.advance()?; // UPDATE
        let table = self.expect_kind(TokenKind::Identifier)?;
        self.expect("SET")?;
        let column = self.expect_kind(TokenKind::Identifier)?;
        self.expect("=")?;
        let value = self.parse_value()?;
        let condition = self.parse_where(ConditionEnd::Statement)?;

        Ok(UpdateStmt {
            table,
            column,
            value,
            condition,
        })
    }

    /// DELETE FROM table [WHERE ...]
    fn parse_delete(&mut self) -> Result<DeleteStmt> {
        self.advance()?; // DELETE
        self.expect("FROM")?;
        let table = self.expect_kind(TokenKind::Identifier)?;
        let condition = self.parse_where(ConditionEnd::Statement)?;

        Ok(DeleteStmt { table, condition })
    }

    fn parse_where(&mut self, end: ConditionEnd) -> Result<String> {
        if self.current.is_keyword("WHERE") {
            self.advance()?;
            self.parse_condition(end)
        } else {
            Ok(String::new())
        }
    }

    /// Collect raw condition tokens into text.
    ///
    /// String literals get their quotes back so the text can be tokenized
    /// again (IN subqueries). Split operators are rejoined (`>` `=` becomes
    /// `>=`) and a sign directly after an operator sticks to its number.
    fn parse_condition(&mut self, end: ConditionEnd) -> Result<String> {
        let mut words: Vec<String> = Vec::new();
        let mut depth = 0usize;
        let mut prev_operator = false;
        let mut sign_pending = false;

        loop {
            let token = &self.current;
            if token.is_end() || (token.is_symbol(";") && depth == 0) {
                break;
            }
            if end == ConditionEnd::Select
                && depth == 0
                && (token.is_symbol(")") || token.is_keyword("ORDER"))
            {
                break;
            }

            if token.is_symbol("(") {
                depth += 1;
            } else if token.is_symbol(")") {
                depth = depth.saturating_sub(1);
            }

            let is_operator = token.kind == TokenKind::Operator;
            let word = match token.kind {
                TokenKind::String => format!("'{}'", token.text),
                _ => token.text.clone(),
            };
            let glue = match words.last() {
                Some(last) if is_operator && prev_operator => {
                    COMPOUND_OPERATORS.contains(&format!("{}{}", last, word).as_str())
                }
                Some(_) => token.kind == TokenKind::Number && sign_pending,
                None => false,
            };
            sign_pending = !glue
                && (token.is_symbol("-") || token.is_symbol("+"))
                && (words.is_empty() || prev_operator);

            match words.last_mut() {
                Some(last) if glue => last.push_str(&word),
                _ => words.push(word),
            }
            prev_operator = is_operator;
            self.advance()?;
        }

        Ok(words.join(" "))
    }

    /// Comma-separated run of single tokens, taken verbatim
    fn parse_list(&mut self) -> Result<Vec<String>> {
        let mut list = vec![self.current.text.clone()];
        self.advance()?;
        while self.current.is_symbol(",") {
            self.advance()?;
            list.push(self.current.text.clone());
            self.advance()?;
        }
        Ok(list)
    }

    /// One literal; a leading `-`/`+` is folded into the number after it
    fn parse_value(&mut self) -> Result<String> {
        let mut value = self.current.text.clone();
        let signed = self.current.is_symbol("-") || self.current.is_symbol("+");
        self.advance()?;
        if signed && self.current.kind == TokenKind::Number {
            value.push_str(&self.current.text);
            self.advance()?;
        }
        Ok(value)
    }

    fn advance(&mut self) -> Result<()> {
        self.current = if self.tokenizer.has_next() {
            self.tokenizer.next_token()?
        } else {
            Token::end(self.tokenizer.position())
        };
        Ok(())
    }

    /// Consume a keyword or symbol with exactly this text
    fn expect(&mut self, text: &str) -> Result<()> {
        if self.current.kind == TokenKind::String || self.current.text != text {
            return Err(self.error(&format!(
                "Expected '{}', got '{}'",
                text, self.current.text
            )));
        }
        self.advance()
    }

    /// Consume a token of the given kind and return its text
    fn expect_kind(&mut self, kind: TokenKind) -> Result<String> {
        if self.current.kind != kind {
            return Err(self.error(&format!(
                "Expected {}, got {} '{}'",
                kind, self.current.kind, self.current.text
            )));
        }
        let text = self.current.text.clone();
        self.advance()?;
        Ok(text)
    }

    fn error(&self, msg: &str) -> FeatherError {
        FeatherError::Parse(format!("{} at position {}", msg, self.current.offset))
    }
}
