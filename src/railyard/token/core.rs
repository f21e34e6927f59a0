//! Core token data: positions and the [Token] itself.

use std::fmt;

use serde::Serialize;

use super::types::TokenTypeRef;

/// A line/column pair. Lines start at 1; columns count the characters of the line up to and
/// including the one referred to, so the first character of a line sits in column 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// Position of `ch` when it follows the character at `self`. A linefeed ends its line, so
    /// it sits in column 0 of the next one; a tab takes `tab_size` columns.
    pub fn advance(self, ch: char, tab_size: usize) -> Position {
        match ch {
            '\n' => Position::new(self.line + 1, 0),
            '\t' => Position::new(self.line, self.column + tab_size),
            _ => Position::new(self.line, self.column + 1),
        }
    }

    /// Position of the last character of `text` when it follows `self`.
    pub fn advance_over(self, text: &str, tab_size: usize) -> Position {
        text.chars().fold(self, |at, ch| at.advance(ch, tab_size))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A classified span of input.
///
/// Tokens are immutable once built. The type list is never empty and keeps the order in which
/// the classifiers matched.
#[derive(Debug, Clone)]
pub struct Token {
    text: String,
    types: Vec<TokenTypeRef>,
    start: Position,
    end: Position,
}

impl Token {
    pub fn new(
        text: impl Into<String>,
        types: Vec<TokenTypeRef>,
        start: Position,
        end: Position,
    ) -> Self {
        debug_assert!(!types.is_empty(), "a token needs at least one type");
        Self {
            text: text.into(),
            types,
            start,
            end,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn types(&self) -> &[TokenTypeRef] {
        &self.types
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn end(&self) -> Position {
        self.end
    }

    /// Whether one of the token's types has the given id.
    pub fn has_type(&self, id: usize) -> bool {
        self.types.iter().any(|t| t.id() == id)
    }

    /// The first keyword type carried by the token.
    pub fn keyword_type(&self) -> Option<&TokenTypeRef> {
        self.types.iter().find(|t| t.is_keyword())
    }

    /// Same token relocated to other positions.
    pub(crate) fn at(mut self, start: Position, end: Position) -> Self {
        self.start = start;
        self.end = end;
        self
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
            && self.start == other.start
            && self.end == other.end
            && self.types.len() == other.types.len()
            && self
                .types
                .iter()
                .zip(other.types.iter())
                .all(|(a, b)| a.id() == b.id())
    }
}

impl Eq for Token {}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' at {}", self.text, self.start)
    }
}
