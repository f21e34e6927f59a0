//! Lexing
//!
//!     Turning characters into tokens happens in three layers:
//!
//!     Input:
//!         An [InStream] hands out one character at a time. [InputBuffer] keeps a small
//!         lookahead window over it and tracks line/column positions.
//!
//!     Chunking:
//!         The [Lexer] state machine skips whitespace and comments and collects everything
//!         else into raw chunks. Quoted literals are tracked so that blanks and comment markers
//!         inside them are kept as text.
//!
//!     Splitting and classification:
//!         Each chunk is cut at registered separators by the [Tokenizer], and the remaining
//!         spans are classified as literal, prefix, postfix, keyword or word tokens.
//!
//!     A [TokenStream] drives one pass over one input and supports pushing tokens back.

pub mod input_buffer;
pub mod instream;
pub mod lexer;
pub mod tokenizer;

pub use input_buffer::InputBuffer;
pub use instream::{FileInput, InStream, StringInput};
pub use lexer::{Lexer, TokenStream};
pub use tokenizer::{Span, Tokenizer};
