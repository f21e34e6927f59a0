//! Parsing
//!
//!     The [Parser] feeds tokens from the lexer into a depth-first search over the grammar
//!     graph. The search state is a [Path]: the nodes visited so far, the tokens they consumed,
//!     and a stack of rule environments.
//!
//! Search
//!
//!     For every token the search descends from the tip of the path until it reaches a token
//!     slot accepting the token. When no such slot is reachable it backtracks: it pops path
//!     elements and moves to the next sibling (the successor right after the popped node in
//!     its parent's successor list), handing popped tokens back to be matched again. Unless
//!     full backtracking is enabled, backtracking stops at the end of a completed rule
//!     instance. At the end of the input the search looks for a token-free way to the end of
//!     the root rule.
//!
//!     The first complete path wins; there is no ambiguity resolution beyond that.
//!
//! Reduction
//!
//!     The final path is folded into an [AstNode](crate::railyard::ast::AstNode) tree: every
//!     rule instance becomes a node named after the rule, every consumed token a `token` leaf.
//!     Rule transforms rewrite their subtree as it is closed.

pub mod context;
pub mod engine;
pub mod path;
pub mod reduce;

pub use crate::railyard::config::TreeKind;
pub use context::Context;
pub use engine::Parser;
pub use path::{Path, PathElement};
