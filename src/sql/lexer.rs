/// SQL Tokenizer - converts SQL text into classified tokens, one at a time

use super::token::{keyword, Token, TokenKind};
use crate::error::{FeatherError, Result};

pub struct Tokenizer {
    input: Vec<char>,
    position: usize,
    last_kind: TokenKind,
}

impl Tokenizer {
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            last_kind: TokenKind::Invalid,
        }
    }

    /// True while unread input remains, trailing whitespace included.
    ///
    /// When only whitespace is left this is still true and the following
    /// [`next_token`](Self::next_token) yields an `End` token.
    pub fn has_next(&self) -> bool {
        self.position < self.input.len()
    }

    /// Index of the next unread character
    pub fn position(&self) -> usize {
        self.position
    }

    /// Kind of the token most recently produced (`Invalid` after an error)
    pub fn last_token_kind(&self) -> TokenKind {
        self.last_kind
    }

    /// Drain the remaining input, `End` token included
    pub fn tokenize(&mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let is_end = token.is_end();
            tokens.push(token);
            if is_end {
                break;
            }
        }
        Ok(tokens)
    }

    pub fn next_token(&mut self) -> Result<Token> {
        self.last_kind = TokenKind::Invalid;
        self.skip_whitespace();

        let start = self.position;
        let Some(ch) = self.current_char() else {
            self.last_kind = TokenKind::End;
            return Ok(Token::end(start));
        };

        let token = match ch {
            '\'' => self.read_string()?,
            c if c.is_ascii_digit() => self.read_number(),
            c if c.is_ascii_alphabetic() || c == '_' => self.read_word(),
            '=' | '>' | '<' | '!' | '+' | '-' | '*' | '/' | '%' => {
                self.advance();
                Token::new(ch, TokenKind::Operator, start)
            }
            ',' | '(' | ')' | ';' => {
                self.advance();
                Token::new(ch, TokenKind::Punctuation, start)
            }
            _ => return Err(FeatherError::InvalidCharacter(ch)),
        };

        self.last_kind = token.kind;
        Ok(token)
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn advance(&mut self) {
        if self.position < self.input.len() {
            self.position += 1;
        }
    }

    fn skip_whitespace(&mut self) {
        while self.current_char().is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let mut value = String::new();
        while let Some(ch) = self.current_char().filter(|c| pred(*c)) {
            value.push(ch);
            self.advance();
        }
        value
    }

    /// Quotes cannot be escaped; the literal ends at the next `'`.
    fn read_string(&mut self) -> Result<Token> {
        let start = self.position;
        self.advance(); // opening quote
        let value = self.take_while(|c| c != '\'');
        if self.current_char().is_none() {
            return Err(FeatherError::UnterminatedString);
        }
        self.advance(); // closing quote
        Ok(Token::new(value, TokenKind::String, start))
    }

    /// Unsigned digits only: no sign, decimal point or exponent.
    fn read_number(&mut self) -> Token {
        let start = self.position;
        let value = self.take_while(|c| c.is_ascii_digit());
        Token::new(value, TokenKind::Number, start)
    }

    fn read_word(&mut self) -> Token {
        let start = self.position;
        let value = self.take_while(|c| c.is_ascii_alphanumeric() || c == '_');
        match keyword(&value) {
            Some(upper) => Token::new(upper, TokenKind::Keyword, start),
            None => Token::new(value, TokenKind::Identifier, start),
        }
    }
}
