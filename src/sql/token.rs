/// Token types for the SQL tokenizer
use std::fmt;

/// Reserved words, matched case-insensitively
pub const KEYWORDS: &[&str] = &[
    "SELECT", "INSERT", "UPDATE", "DELETE", "FROM", "WHERE", "AND", "OR", "VALUES", "LIMIT",
    "CREATE", "TABLE", "INTO", "SET", "ORDER", "BY", "INT", "STRING", "IN",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Keyword,
    Identifier,
    Number,
    /// Quoted literal; the token text excludes the quotes
    String,
    Operator,
    Punctuation,
    End,
    Invalid,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Keyword => "keyword",
            TokenKind::Identifier => "identifier",
            TokenKind::Number => "number",
            TokenKind::String => "string",
            TokenKind::Operator => "operator",
            TokenKind::Punctuation => "punctuation",
            TokenKind::End => "end of input",
            TokenKind::Invalid => "invalid token",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Keywords are upper-cased; everything else keeps its original spelling
    pub text: String,
    pub kind: TokenKind,
    /// Character offset of the token's first character in the input
    pub offset: usize,
}

impl Token {
    pub fn new(text: impl Into<String>, kind: TokenKind, offset: usize) -> Self {
        Self {
            text: text.into(),
            kind,
            offset,
        }
    }

    pub fn end(offset: usize) -> Self {
        Self::new(String::new(), TokenKind::End, offset)
    }

    pub fn is_end(&self) -> bool {
        self.kind == TokenKind::End
    }

    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.kind == TokenKind::Keyword && self.text == keyword
    }

    /// Punctuation or operator with exactly this text
    pub fn is_symbol(&self, symbol: &str) -> bool {
        matches!(self.kind, TokenKind::Punctuation | TokenKind::Operator) && self.text == symbol
    }
}

/// Upper-cased keyword if `word` is reserved
pub fn keyword(word: &str) -> Option<String> {
    let upper = word.to_ascii_uppercase();
    KEYWORDS.contains(&upper.as_str()).then_some(upper)
}
