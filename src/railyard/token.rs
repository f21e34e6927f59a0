//! Tokens and the classifiers that recognize them
//!
//!     A [TokenType] is an identity-bearing classifier. Its id is handed out by the
//!     [TokenTypes] registry it was declared in, and token slots in a grammar match a token by
//!     comparing those ids. The classifier variants are:
//!
//!     Word:
//!         A regular expression that must match the whole span. Several words may match the
//!         same text, in which case the token carries all of them.
//!
//!     Keyword:
//!         A fixed string, case sensitive unless declared otherwise. Case-insensitive keywords
//!         are stored upper-cased and matched against the upper-cased span.
//!
//!     Literal:
//!         Quoted text delimited by `'` or `"`. At most one literal type exists per registry.
//!
//!     Prefix, Postfix:
//!         A fixed marker glued to the left (prefix) or right (postfix) of the remaining text,
//!         which is classified on its own.
//!
//!     Separator:
//!         A fixed marker (or raw pattern) splitting text apart. Separators are the only types
//!         the [Tokenizer](crate::railyard::lexing::Tokenizer) looks at.
//!
//!     Prefix, postfix and separator types are tried longest marker first, so `::` always wins
//!     over `:`.

pub mod core;
pub mod registry;
pub mod types;

pub use self::core::{Position, Token};
pub use registry::TokenTypes;
pub use types::{TokenKind, TokenType, TokenTypeRef, WordFilter};
