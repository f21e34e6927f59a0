//! Parser and lexer configuration
//!
//!     [ParserConfig] collects the knobs of a [Parser](crate::railyard::parsing::Parser):
//!     comment markers, backtracking mode, tab width and the kind of tree to produce.
//!
//!     A [Lexicon] describes a set of token types in YAML, so a lexer can be set up without
//!     writing a grammar. The CLI uses it for its `tokens` command:
//!
//!         literal: true
//!         words: ["[_a-zA-Z][_a-zA-Z0-9]*", "[0-9]+"]
//!         keywords: [foreach, { keyword: select, case_sensitive: false }]
//!         separators: ["{", "}", { marker: "-", tight: true }, { pattern: "\\s+" }]
//!         prefixes: ["$"]
//!         line_comment: "//"
//!         block_comment: { start: "/*", end: "*/" }

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::railyard::error::ConfigError;
use crate::railyard::lexing::Lexer;
use crate::railyard::token::TokenTypes;

/// Which tree a parse produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TreeKind {
    /// Rule transforms applied
    #[default]
    Ast,
    /// One node per rule instance, no transforms
    ParseTree,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockComment {
    pub start: String,
    pub end: String,
}

fn default_tab_size() -> usize {
    1
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    pub line_comment: Option<String>,
    pub block_comment: Option<BlockComment>,
    pub full_backtracking: bool,
    /// Columns a tab advances
    pub tab_size: usize,
    pub tree: TreeKind,
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig {
            line_comment: None,
            block_comment: None,
            full_backtracking: false,
            tab_size: default_tab_size(),
            tree: TreeKind::Ast,
        }
    }
}

impl ParserConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeywordSpec {
    Plain(String),
    Detailed {
        keyword: String,
        #[serde(default = "case_sensitive_default")]
        case_sensitive: bool,
    },
}

fn case_sensitive_default() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SeparatorSpec {
    Marker(String),
    Detailed {
        marker: String,
        #[serde(default)]
        tight: bool,
    },
    Pattern {
        pattern: String,
    },
}

/// Token types and lexer settings loaded from YAML.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lexicon {
    pub literal: bool,
    pub words: Vec<String>,
    pub keywords: Vec<KeywordSpec>,
    pub separators: Vec<SeparatorSpec>,
    pub prefixes: Vec<String>,
    pub postfixes: Vec<String>,
    pub line_comment: Option<String>,
    pub block_comment: Option<BlockComment>,
    pub tab_size: Option<usize>,
}

impl Lexicon {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    /// Add the described token types to `types`.
    pub fn register(&self, types: &mut TokenTypes) -> Result<(), ConfigError> {
        if self.literal {
            types.literal();
        }
        for pattern in &self.words {
            types.word(pattern)?;
        }
        for keyword in &self.keywords {
            match keyword {
                KeywordSpec::Plain(keyword) => {
                    types.keyword(keyword);
                }
                KeywordSpec::Detailed {
                    keyword,
                    case_sensitive: true,
                } => {
                    types.keyword(keyword);
                }
                KeywordSpec::Detailed { keyword, .. } => {
                    types.keyword_insensitive(keyword);
                }
            }
        }
        for separator in &self.separators {
            match separator {
                SeparatorSpec::Marker(marker) => {
                    types.separator(marker);
                }
                SeparatorSpec::Detailed { marker, tight } => {
                    if *tight {
                        types.separator_tight(marker);
                    } else {
                        types.separator(marker);
                    }
                }
                SeparatorSpec::Pattern { pattern } => {
                    types.separator_pattern(pattern)?;
                }
            }
        }
        for marker in &self.prefixes {
            types.prefix(marker);
        }
        for marker in &self.postfixes {
            types.postfix(marker);
        }
        Ok(())
    }

    /// A fresh registry holding the described types, and a lexer for it.
    pub fn lexer(&self) -> Result<(TokenTypes, Lexer), ConfigError> {
        let mut types = TokenTypes::new();
        self.register(&mut types)?;
        let mut lexer = Lexer::for_types(&types);
        if let Some(marker) = &self.line_comment {
            lexer.enable_line_comments(marker);
        }
        if let Some(block) = &self.block_comment {
            lexer.enable_block_comments(&block.start, &block.end);
        }
        if let Some(tab_size) = self.tab_size {
            lexer.set_tab_size(tab_size);
        }
        Ok((types, lexer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::railyard::token::Token;

    #[test]
    fn test_parser_config_defaults() {
        let config = ParserConfig::from_yaml_str("full_backtracking: true").unwrap();
        assert!(config.full_backtracking);
        assert_eq!(config.tab_size, 1);
        assert_eq!(config.tree, TreeKind::Ast);
        assert_eq!(config.line_comment, None);
    }

    #[test]
    fn test_parser_config_full() {
        let yaml = "line_comment: \"//\"\nblock_comment: { start: \"/*\", end: \"*/\" }\ntab_size: 4\ntree: parse-tree\n";
        let config = ParserConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.line_comment.as_deref(), Some("//"));
        assert_eq!(
            config.block_comment,
            Some(BlockComment {
                start: "/*".to_string(),
                end: "*/".to_string()
            })
        );
        assert_eq!(config.tab_size, 4);
        assert_eq!(config.tree, TreeKind::ParseTree);
    }

    #[test]
    fn test_invalid_yaml() {
        assert!(matches!(
            ParserConfig::from_yaml_str("tab_size: [1"),
            Err(ConfigError::Yaml(_))
        ));
    }

    #[test]
    fn test_lexicon_specs() {
        let yaml = r#"
literal: true
words: ["[a-z]+"]
keywords: [foreach, { keyword: select, case_sensitive: false }]
separators: ["{", { marker: "-", tight: true }, { pattern: "\\s+" }]
prefixes: ["$"]
postfixes: ["%"]
"#;
        let lexicon = Lexicon::from_yaml_str(yaml).unwrap();
        assert_eq!(
            lexicon.keywords[1],
            KeywordSpec::Detailed {
                keyword: "select".to_string(),
                case_sensitive: false
            }
        );
        assert_eq!(
            lexicon.separators[2],
            SeparatorSpec::Pattern {
                pattern: "\\s+".to_string()
            }
        );
        let mut types = TokenTypes::new();
        lexicon.register(&mut types).unwrap();
        // literal, word, 2 keywords, 3 separators, prefix, postfix
        assert_eq!(types.len(), 9);
    }

    #[test]
    fn test_lexicon_lexer() {
        let yaml = "words: [\"[a-z]+\"]\nkeywords: [{ keyword: select, case_sensitive: false }]\nline_comment: \"#\"\n";
        let (_, lexer) = Lexicon::from_yaml_str(yaml).unwrap().lexer().unwrap();
        let tokens = lexer.tokenize("SELECT abc # note").unwrap();
        let texts: Vec<_> = tokens.iter().map(Token::text).collect();
        assert_eq!(texts, vec!["SELECT", "abc"]);
        assert!(tokens[0].keyword_type().is_some());
    }

    #[test]
    fn test_lexicon_bad_pattern() {
        let lexicon = Lexicon::from_yaml_str("words: [\"(\"]").unwrap();
        assert!(matches!(lexicon.lexer(), Err(ConfigError::Grammar(_))));
    }

    #[test]
    fn test_lexicon_missing_file() {
        let err = Lexicon::from_path("/nonexistent/lexicon.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
