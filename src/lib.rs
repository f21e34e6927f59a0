//! # railyard
//!
//! Grammar graphs and a backtracking parser.
//!
//! Grammars are described as graphs of rule, token and junction nodes wired together by
//! combinators. A streaming, literal-aware lexer feeds tokens to a depth-first search that walks
//! the graph, backtracking on dead ends, and the winning path is reduced into an [AstNode]
//! tree.
//!
//! See [railyard::grammar] for building grammars and [railyard::parsing] for running them.
//!
//! [AstNode]: railyard::ast::AstNode

pub mod railyard;
