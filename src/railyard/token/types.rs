//! Token type classifiers.

use std::fmt;
use std::sync::Arc;

use regex::Regex;

use super::core::{Position, Token};

/// Shared handle to a token type. Tokens, grammar slots and the lexer all point at the same
/// classifier.
pub type TokenTypeRef = Arc<TokenType>;

/// Extra check a word applies to text its pattern already accepted.
pub type WordFilter = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Characters opening and closing a literal.
pub const LITERAL_DELIMITERS: [char; 2] = ['\'', '"'];

/// Character escaping a delimiter inside a literal.
pub const LITERAL_ESCAPE: char = '\\';

/// What a token type recognizes.
#[derive(Clone)]
pub enum TokenKind {
    Word {
        pattern: String,
        regex: Regex,
        filter: Option<WordFilter>,
    },
    Keyword {
        keyword: String,
        case_sensitive: bool,
    },
    Literal,
    Prefix {
        marker: String,
        regex: Regex,
    },
    Postfix {
        marker: String,
        regex: Regex,
    },
    /// Splits text apart. `split` feeds the tokenizer and `strict` decides whether a whole span
    /// is a separator use (both sides non-blank unless whitespace is allowed).
    Separator {
        marker: String,
        split: Regex,
        strict: Regex,
        whitespace_allowed: bool,
    },
}

impl fmt::Debug for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Word { pattern, .. } => write!(f, "Word({pattern})"),
            TokenKind::Keyword {
                keyword,
                case_sensitive,
            } => {
                if *case_sensitive {
                    write!(f, "Keyword({keyword})")
                } else {
                    write!(f, "Keyword({keyword}, insensitive)")
                }
            }
            TokenKind::Literal => write!(f, "Literal"),
            TokenKind::Prefix { marker, .. } => write!(f, "Prefix({marker})"),
            TokenKind::Postfix { marker, .. } => write!(f, "Postfix({marker})"),
            TokenKind::Separator { marker, .. } => write!(f, "Separator({marker})"),
        }
    }
}

/// A classifier with a registry-assigned id.
///
/// Two token types are the same type exactly when their ids are equal.
#[derive(Clone)]
pub struct TokenType {
    id: usize,
    kind: TokenKind,
}

impl TokenType {
    pub(crate) fn new(id: usize, kind: TokenKind) -> Self {
        Self { id, kind }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn kind(&self) -> &TokenKind {
        &self.kind
    }

    pub fn is_word(&self) -> bool {
        matches!(self.kind, TokenKind::Word { .. })
    }

    pub fn is_keyword(&self) -> bool {
        matches!(self.kind, TokenKind::Keyword { .. })
    }

    pub fn is_literal(&self) -> bool {
        matches!(self.kind, TokenKind::Literal)
    }

    pub fn is_prefix(&self) -> bool {
        matches!(self.kind, TokenKind::Prefix { .. })
    }

    pub fn is_postfix(&self) -> bool {
        matches!(self.kind, TokenKind::Postfix { .. })
    }

    pub fn is_separator(&self) -> bool {
        matches!(self.kind, TokenKind::Separator { .. })
    }

    /// Keyword text as stored (upper-cased for case-insensitive keywords).
    pub fn keyword(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Keyword { keyword, .. } => Some(keyword),
            _ => None,
        }
    }

    /// Fixed marker of a prefix, postfix or separator. Pattern separators report their pattern.
    pub fn marker(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Prefix { marker, .. }
            | TokenKind::Postfix { marker, .. }
            | TokenKind::Separator { marker, .. } => Some(marker),
            _ => None,
        }
    }

    /// Length used to order prefixes, postfixes and separators, longest first.
    pub fn precedence_len(&self) -> usize {
        match &self.kind {
            TokenKind::Word { pattern, .. } => pattern.chars().count(),
            TokenKind::Keyword { .. } | TokenKind::Literal => 0,
            TokenKind::Prefix { marker, .. }
            | TokenKind::Postfix { marker, .. }
            | TokenKind::Separator { marker, .. } => marker.chars().count(),
        }
    }

    /// The pattern the tokenizer splits spans with. Marker separators produce three groups:
    /// left remainder, marker and right remainder.
    pub fn split_pattern(&self) -> Option<&Regex> {
        match &self.kind {
            TokenKind::Separator { split, .. } => Some(split),
            _ => None,
        }
    }

    /// Whether the whole text is recognized by this type.
    pub fn matches(&self, text: &str) -> bool {
        match &self.kind {
            TokenKind::Word { regex, filter, .. } => {
                regex.is_match(text) && filter.as_ref().map_or(true, |accept| accept(text))
            }
            TokenKind::Keyword {
                keyword,
                case_sensitive,
            } => {
                if *case_sensitive {
                    text == keyword
                } else {
                    text.to_uppercase() == *keyword
                }
            }
            TokenKind::Literal => is_literal_text(text),
            TokenKind::Prefix { regex, .. } | TokenKind::Postfix { regex, .. } => {
                regex.is_match(text)
            }
            TokenKind::Separator { strict, .. } => strict.is_match(text),
        }
    }

    /// Build a token for `text` if this type recognizes it. Prefixes, postfixes and separators
    /// produce a token for their marker only.
    pub fn create_token(self: &Arc<Self>, text: &str) -> Option<Token> {
        if !self.matches(text) {
            return None;
        }
        let token_text = match &self.kind {
            TokenKind::Prefix { marker, .. } | TokenKind::Postfix { marker, .. } => marker.clone(),
            TokenKind::Separator { strict, marker, .. } => strict
                .captures(text)
                .and_then(|caps| caps.get(2).or_else(|| caps.get(0)))
                .map_or_else(|| marker.clone(), |m| m.as_str().to_string()),
            _ => text.to_string(),
        };
        Some(Token::new(
            token_text,
            vec![Arc::clone(self)],
            Position::default(),
            Position::default(),
        ))
    }

    /// Text right of a prefix marker.
    pub fn remaining_right<'t>(&self, text: &'t str) -> Option<&'t str> {
        match &self.kind {
            TokenKind::Prefix { regex, .. } => regex
                .captures(text)
                .and_then(|caps| caps.get(2))
                .map(|m| m.as_str()),
            _ => None,
        }
    }

    /// Text left of a postfix marker.
    pub fn remaining_left<'t>(&self, text: &'t str) -> Option<&'t str> {
        match &self.kind {
            TokenKind::Postfix { regex, .. } => regex
                .captures(text)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str()),
            _ => None,
        }
    }
}

impl PartialEq for TokenType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TokenType {}

impl fmt::Debug for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {:?}", self.id, self.kind)
    }
}

/// Whether `text` is a complete literal: at least two characters, opened by a delimiter and
/// closed by the same one.
pub fn is_literal_text(text: &str) -> bool {
    let mut chars = text.chars();
    match (chars.next(), chars.next_back()) {
        (Some(first), Some(last)) => LITERAL_DELIMITERS.contains(&first) && first == last,
        _ => false,
    }
}

pub(crate) fn is_literal_delimiter(ch: char) -> bool {
    LITERAL_DELIMITERS.contains(&ch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::railyard::token::TokenTypes;

    #[test]
    fn test_is_literal_text() {
        assert!(is_literal_text("'abc'"));
        assert!(is_literal_text("\"\""));
        assert!(!is_literal_text("'"));
        assert!(!is_literal_text("'abc\""));
        assert!(!is_literal_text("abc"));
    }

    #[test]
    fn test_word_matches_whole_text_only() {
        let mut types = TokenTypes::new();
        let id = types.word("[a-z]+").unwrap();
        assert!(id.matches("abc"));
        assert!(!id.matches("abc1"));
        assert_eq!(id.create_token("abc").unwrap().text(), "abc");
        assert!(id.create_token("ABC").is_none());
    }

    #[test]
    fn test_word_alternation_is_anchored() {
        let mut types = TokenTypes::new();
        let word = types.word("ab|cd").unwrap();
        assert!(word.matches("ab"));
        assert!(!word.matches("abx"));
        assert!(!word.matches("xcd"));
    }

    #[test]
    fn test_word_filter_rejects() {
        let mut types = TokenTypes::new();
        let id = types
            .word_filtered("[a-z]+", Arc::new(|text: &str| text != "in"))
            .unwrap();
        assert!(id.matches("for"));
        assert!(!id.matches("in"));
    }

    #[test]
    fn test_keyword_case_handling() {
        let mut types = TokenTypes::new();
        let strict = types.keyword("select");
        let loose = types.keyword_insensitive("from");
        assert!(strict.matches("select"));
        assert!(!strict.matches("SELECT"));
        assert_eq!(loose.keyword(), Some("FROM"));
        assert!(loose.matches("From"));
    }

    #[test]
    fn test_prefix_and_postfix_remainders() {
        let mut types = TokenTypes::new();
        let prefix = types.prefix("$");
        let postfix = types.postfix("++");
        assert_eq!(prefix.remaining_right("$var"), Some("var"));
        assert_eq!(prefix.remaining_right("var"), None);
        assert_eq!(postfix.remaining_left("i++"), Some("i"));
        assert_eq!(prefix.create_token("$var").unwrap().text(), "$");
    }

    #[test]
    fn test_separator_split_contract() {
        let mut types = TokenTypes::new();
        let sep = types.separator("::");
        let caps = sep.split_pattern().unwrap().captures("a::b::c").unwrap();
        assert_eq!(&caps[1], "a::b");
        assert_eq!(&caps[2], "::");
        assert_eq!(&caps[3], "c");
    }

    #[test]
    fn test_tight_separator_requires_neighbours() {
        let mut types = TokenTypes::new();
        let sep = types.separator_tight(".");
        assert!(sep.matches("a.b"));
        assert!(!sep.matches("a. b"));
        assert!(!sep.matches(".b"));
        assert_eq!(sep.create_token("a.b").unwrap().text(), ".");
    }

    #[test]
    fn test_precedence_len_uses_marker() {
        let mut types = TokenTypes::new();
        assert_eq!(types.separator("::").precedence_len(), 2);
        assert_eq!(types.prefix("-").precedence_len(), 1);
        assert_eq!(types.keyword("if").precedence_len(), 0);
    }
}
