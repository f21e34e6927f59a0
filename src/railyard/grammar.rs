//! Grammar graphs
//!
//!     A grammar is a directed graph of nodes. Token slots consume one token each, rule
//!     start/end pairs delimit rule instances, and technical junctions, conditionals and keyed
//!     switches route between them. The parser walks this graph depth first.
//!
//! Building
//!
//!     Grammars are declared through a [GrammarBuilder]: token types go into its [TokenTypes]
//!     registry, and every [Rule] gets an `expand` closure that wires the rule body between an
//!     entry and an exit junction using the [Builder] combinators (sequence, fork, repetition,
//!     keyed switch, guard). Every combinator returns an [Element] with a socket (entry) and a
//!     plug (exit), so they nest freely.
//!
//! Lazy rule bodies
//!
//!     Rule bodies are not built ahead of time. Whenever the parser asks a rule start for its
//!     successors, a fresh entry/exit pair is allocated in the per-parse [Graph] arena and the
//!     rule's `expand` closure wires a new copy of the body between them. Recursive rules
//!     therefore never materialize an infinite graph, and bodies built for abandoned search
//!     branches are released again.
//!
//!     Nodes are compared by [NodeId] only. Two expansions of the same rule are structurally
//!     equal but distinct.
//!
//! Definitions
//!
//!     Grammars can also be written as text and loaded through [Definition], which reads them
//!     with a grammar built in this module.
//!
//! [TokenTypes]: crate::railyard::token::TokenTypes

pub mod builder;
pub mod definition;
pub mod env;
pub mod graph;
pub mod node;
pub mod rule;

pub use builder::{Builder, Element, Multiplicity};
pub use definition::{meta_grammar, Definition};
pub use env::{Env, EnvChange, EnvHook, EnvValue};
pub use graph::Graph;
pub use node::{Guard, NoSuccessor, Node, NodeId, NodeKind};
pub use rule::{ExpandFn, Grammar, GrammarBuilder, Rule, RuleId, TransformFn};
