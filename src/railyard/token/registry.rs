//! Token type registry
//!
//! The registry hands out token type ids (starting at 1) and guards the literal singleton.
//! A grammar keeps its registry and configures its lexer from it.

use std::sync::Arc;

use regex::Regex;

use super::types::{TokenKind, TokenType, TokenTypeRef, WordFilter};
use crate::railyard::error::GrammarError;

/// Declared token types, in declaration order.
#[derive(Debug, Clone)]
pub struct TokenTypes {
    types: Vec<TokenTypeRef>,
    next_id: usize,
    literal: Option<TokenTypeRef>,
}

impl TokenTypes {
    pub fn new() -> Self {
        TokenTypes {
            types: Vec::new(),
            next_id: 1,
            literal: None,
        }
    }

    fn register(&mut self, kind: TokenKind) -> TokenTypeRef {
        let token_type = Arc::new(TokenType::new(self.next_id, kind));
        self.next_id += 1;
        self.types.push(Arc::clone(&token_type));
        token_type
    }

    /// A word matching the whole of `pattern`.
    pub fn word(&mut self, pattern: &str) -> Result<TokenTypeRef, GrammarError> {
        self.word_with(pattern, None)
    }

    /// A word whose matches must also pass `filter`.
    pub fn word_filtered(
        &mut self,
        pattern: &str,
        filter: WordFilter,
    ) -> Result<TokenTypeRef, GrammarError> {
        self.word_with(pattern, Some(filter))
    }

    fn word_with(
        &mut self,
        pattern: &str,
        filter: Option<WordFilter>,
    ) -> Result<TokenTypeRef, GrammarError> {
        let regex = compile(&format!("^(?:{pattern})$"))?;
        Ok(self.register(TokenKind::Word {
            pattern: pattern.to_string(),
            regex,
            filter,
        }))
    }

    /// A case-sensitive keyword.
    pub fn keyword(&mut self, keyword: &str) -> TokenTypeRef {
        self.register(TokenKind::Keyword {
            keyword: keyword.to_string(),
            case_sensitive: true,
        })
    }

    /// A keyword matched regardless of case.
    pub fn keyword_insensitive(&mut self, keyword: &str) -> TokenTypeRef {
        self.register(TokenKind::Keyword {
            keyword: keyword.to_uppercase(),
            case_sensitive: false,
        })
    }

    /// The literal type of this registry, created on first use.
    pub fn literal(&mut self) -> TokenTypeRef {
        match &self.literal {
            Some(literal) => Arc::clone(literal),
            None => {
                let literal = self.register(TokenKind::Literal);
                self.literal = Some(Arc::clone(&literal));
                literal
            }
        }
    }

    /// Declare the literal type, failing when one already exists.
    pub fn new_literal(&mut self) -> Result<TokenTypeRef, GrammarError> {
        if self.literal.is_some() {
            return Err(GrammarError::SingletonViolation);
        }
        Ok(self.literal())
    }

    pub fn prefix(&mut self, marker: &str) -> TokenTypeRef {
        let escaped = regex::escape(marker);
        self.register(TokenKind::Prefix {
            marker: marker.to_string(),
            regex: anchored(&format!(r"^({escaped})(\S+)$")),
        })
    }

    pub fn postfix(&mut self, marker: &str) -> TokenTypeRef {
        let escaped = regex::escape(marker);
        self.register(TokenKind::Postfix {
            marker: marker.to_string(),
            regex: anchored(&format!(r"^(\S+)({escaped})$")),
        })
    }

    /// A separator that may sit next to whitespace.
    pub fn separator(&mut self, marker: &str) -> TokenTypeRef {
        self.marker_separator(marker, true)
    }

    /// A separator that only counts between two non-blank runs, as the `.` in `a.b`.
    pub fn separator_tight(&mut self, marker: &str) -> TokenTypeRef {
        self.marker_separator(marker, false)
    }

    fn marker_separator(&mut self, marker: &str, whitespace_allowed: bool) -> TokenTypeRef {
        let escaped = regex::escape(marker);
        let split = anchored(&format!("(?s)^(.*)({escaped})(.*)$"));
        let strict = if whitespace_allowed {
            split.clone()
        } else {
            anchored(&format!(r"^(\S+)({escaped})(\S+)$"))
        };
        self.register(TokenKind::Separator {
            marker: marker.to_string(),
            split,
            strict,
            whitespace_allowed,
        })
    }

    /// A separator given as a raw pattern with zero, one or three groups. With three groups
    /// the middle one is the separator and the outer ones the text around it. With one group
    /// the group is the separator, with none the whole match is; the text before and after
    /// the separator is kept in both cases, so the match need not cover the span.
    pub fn separator_pattern(&mut self, pattern: &str) -> Result<TokenTypeRef, GrammarError> {
        let split = compile(pattern)?;
        Ok(self.register(TokenKind::Separator {
            marker: pattern.to_string(),
            strict: split.clone(),
            split,
            whitespace_allowed: true,
        }))
    }

    /// All declared types, in declaration order.
    pub fn all(&self) -> &[TokenTypeRef] {
        &self.types
    }

    pub fn get(&self, id: usize) -> Option<&TokenTypeRef> {
        self.types.iter().find(|t| t.id() == id)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl Default for TokenTypes {
    fn default() -> Self {
        Self::new()
    }
}

fn compile(pattern: &str) -> Result<Regex, GrammarError> {
    Regex::new(pattern).map_err(|source| GrammarError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

/// Compile a pattern built around an escaped marker.
fn anchored(pattern: &str) -> Regex {
    match Regex::new(pattern) {
        Ok(regex) => regex,
        // Markers go through `regex::escape`, so the surrounding pattern is always valid.
        Err(err) => unreachable!("escaped marker produced an invalid pattern: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_start_at_one_and_increase() {
        let mut types = TokenTypes::new();
        let a = types.keyword("a");
        let b = types.word("[0-9]+").unwrap();
        let c = types.separator(";");
        assert_eq!((a.id(), b.id(), c.id()), (1, 2, 3));
        assert_eq!(types.len(), 3);
        assert_eq!(types.get(2).map(|t| t.id()), Some(2));
    }

    #[test]
    fn test_literal_is_singleton() {
        let mut types = TokenTypes::new();
        let first = types.literal();
        let again = types.literal();
        assert_eq!(first.id(), again.id());
        assert!(matches!(
            types.new_literal(),
            Err(GrammarError::SingletonViolation)
        ));
    }

    #[test]
    fn test_new_literal_on_fresh_registry() {
        let mut types = TokenTypes::new();
        assert!(types.new_literal().is_ok());
    }

    #[test]
    fn test_invalid_word_pattern() {
        let mut types = TokenTypes::new();
        let err = types.word("[a-").unwrap_err();
        assert!(matches!(err, GrammarError::InvalidPattern { .. }));
    }

    #[test]
    fn test_markers_are_escaped() {
        let mut types = TokenTypes::new();
        let sep = types.separator("+");
        let caps = sep.split_pattern().unwrap().captures("1+2").unwrap();
        assert_eq!(&caps[2], "+");
        let star = types.prefix("*");
        assert_eq!(star.remaining_right("*ptr"), Some("ptr"));
    }
}
