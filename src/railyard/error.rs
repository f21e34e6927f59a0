//! Error types
//!
//!     Two families of failures exist. Grammar errors are programmer mistakes made while
//!     declaring token types or rules, or while inspecting a path; they are reported when the
//!     offending call is made. Parse errors are fatal outcomes of a parse run and always carry a
//!     [Location] pointing at the input that could not be handled.
//!
//!     Branch rejection during the search is not an error at all: successor queries return
//!     [NoSuccessor](crate::railyard::grammar::NoSuccessor) and the engine consumes it.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::railyard::token::Position;

/// Where in the input a parse failure happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub file: Option<PathBuf>,
    pub position: Position,
}

impl Location {
    pub fn new(file: Option<PathBuf>, position: Position) -> Self {
        Self { file, position }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.file {
            Some(file) => write!(
                f,
                "{}:{}:{}",
                file.display(),
                self.position.line,
                self.position.column
            ),
            None => write!(f, "{}:{}", self.position.line, self.position.column),
        }
    }
}

/// Errors raised while declaring a grammar or inspecting a parse path.
#[derive(Debug, Error)]
pub enum GrammarError {
    #[error("invalid token pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("a literal token type is already registered")]
    SingletonViolation,

    #[error("rule `{0}` has no body and cannot be instantiated")]
    AbstractInstantiation(String),

    #[error("invalid path element index {0}")]
    InvalidPathIndex(isize),

    #[error("rule #{0} is referenced but was never declared")]
    UndefinedRule(usize),
}

/// Fatal failures of a parse run.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("unknown token '{text}' at {location}")]
    UnknownToken { text: String, location: Location },

    #[error("unexpected token '{text}' at {location}")]
    UnexpectedToken { text: String, location: Location },

    #[error("unexpected end of input at {location}")]
    UnexpectedEndOfInput { location: Location },

    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ParseError {
    /// Location of the failure, when the error refers to a place in the input.
    pub fn location(&self) -> Option<&Location> {
        match self {
            ParseError::UnknownToken { location, .. }
            | ParseError::UnexpectedToken { location, .. }
            | ParseError::UnexpectedEndOfInput { location } => Some(location),
            ParseError::Io { .. } => None,
        }
    }

    /// Offending text, empty for end-of-input and I/O failures.
    pub fn text(&self) -> &str {
        match self {
            ParseError::UnknownToken { text, .. } | ParseError::UnexpectedToken { text, .. } => {
                text
            }
            _ => "",
        }
    }
}

/// Errors raised while loading a lexicon or parser configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Grammar(#[from] GrammarError),
}

/// Errors raised while turning a grammar definition into a grammar.
#[derive(Debug, Error)]
pub enum DefinitionError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Grammar(#[from] GrammarError),

    #[error("token type `{0}` is not defined")]
    UnknownToken(String),

    #[error("rule `{0}` is not defined")]
    UnknownRule(String),

    #[error("no rule is marked @grammar")]
    MissingRoot,

    #[error("rules `{0}` and `{1}` are both marked @grammar")]
    MultipleRoots(String, String),

    #[error("`{0}` is defined more than once")]
    Duplicate(String),

    #[error("malformed definition tree near `{0}`")]
    Malformed(String),
}
