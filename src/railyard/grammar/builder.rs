//! Grammar combinators
//!
//!     Rule bodies are wired with a [Builder] handed to the rule's `expand` closure together
//!     with the body's entry and exit junctions. Every combinator returns an [Element]: a
//!     socket where control enters and a plug where it leaves. `connect` links the plug of one
//!     element to the socket of the next and returns the second, so chains read left to right:
//!
//!         let kw = b.token(&for_kw);
//!         let name = b.token_as(&id, "element");
//!         b.chain([start.into(), kw, name, end.into()]);
//!
//!     Successor order is preference order: when two branches both lead somewhere, the one
//!     connected first is tried first.

use std::collections::HashMap;
use std::sync::Arc;

use super::env::EnvHook;
use super::graph::Graph;
use super::node::{NodeId, NodeKind};
use super::rule::RuleId;
use crate::railyard::parsing::Context;
use crate::railyard::token::TokenTypeRef;

/// Entry (socket) and exit (plug) of a piece of grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Element {
    pub socket: NodeId,
    pub plug: NodeId,
}

impl From<NodeId> for Element {
    fn from(node: NodeId) -> Self {
        Element {
            socket: node,
            plug: node,
        }
    }
}

/// Repetition bounds of [Builder::repeat].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Multiplicity {
    ZeroToOne,
    ZeroToMany,
    OneToMany,
}

/// Wires nodes into the graph of the rule body being expanded.
pub struct Builder<'a> {
    graph: &'a mut Graph,
}

impl<'a> Builder<'a> {
    pub(crate) fn new(graph: &'a mut Graph) -> Self {
        Builder { graph }
    }

    /// A bare junction, usable as a shared meeting point of several branches.
    pub fn connector(&mut self) -> Element {
        self.graph.add(NodeKind::Technical).into()
    }

    /// A slot consuming one token of `token_type`.
    pub fn token(&mut self, token_type: &TokenTypeRef) -> Element {
        self.slot(token_type, None, None)
    }

    /// A token slot whose leaf in the tree carries `ident` as id.
    pub fn token_as(&mut self, token_type: &TokenTypeRef, ident: &str) -> Element {
        self.slot(token_type, Some(ident), None)
    }

    /// A token slot changing the environment of the enclosing rule when it matches.
    pub fn token_with_env(
        &mut self,
        token_type: &TokenTypeRef,
        ident: Option<&str>,
        hook: EnvHook,
    ) -> Element {
        self.slot(token_type, ident, Some(hook))
    }

    fn slot(
        &mut self,
        token_type: &TokenTypeRef,
        ident: Option<&str>,
        hook: Option<EnvHook>,
    ) -> Element {
        self.graph
            .add(NodeKind::TokenSlot {
                token_type: token_type.clone(),
                ident: ident.map(str::to_string),
                hook,
            })
            .into()
    }

    /// A reference to another (or the same) rule.
    pub fn rule(&mut self, rule: RuleId) -> Element {
        self.rule_with(rule, None)
    }

    /// A rule reference whose subtree carries `ident` as id.
    pub fn rule_as(&mut self, rule: RuleId, ident: &str) -> Element {
        self.rule_with(rule, Some(ident.to_string()))
    }

    fn rule_with(&mut self, rule: RuleId, ident: Option<String>) -> Element {
        let end = self.graph.add(NodeKind::RuleEnd {
            rule,
            ident: ident.clone(),
        });
        let start = self.graph.add(NodeKind::RuleStart { rule, ident, end });
        Element {
            socket: start,
            plug: end,
        }
    }

    /// Link the plug of `from` to the socket of `to`, returning `to`.
    pub fn connect(&mut self, from: impl Into<Element>, to: impl Into<Element>) -> Element {
        let (from, to) = (from.into(), to.into());
        self.graph.connect(from.plug, to.socket);
        to
    }

    /// Connect consecutive elements, returning the last one.
    pub fn chain(&mut self, elements: impl IntoIterator<Item = Element>) -> Option<Element> {
        let mut elements = elements.into_iter();
        let first = elements.next()?;
        Some(elements.fold(first, |previous, next| self.connect(previous, next)))
    }

    /// Elements one after the other between a leading and a trailing junction.
    pub fn sequence(&mut self, elements: impl IntoIterator<Item = Element>) -> Element {
        let start = self.connector();
        let end = self.connector();
        let last = elements
            .into_iter()
            .fold(start, |previous, next| self.connect(previous, next));
        self.connect(last, end);
        Element {
            socket: start.socket,
            plug: end.plug,
        }
    }

    /// Alternatives sharing one entry and one exit. Branches are tried in the given order.
    pub fn fork(&mut self, branches: impl IntoIterator<Item = Element>) -> Element {
        let start = self.connector();
        let end = self.connector();
        for branch in branches {
            self.connect(start, branch);
            self.connect(branch, end);
        }
        Element {
            socket: start.socket,
            plug: end.plug,
        }
    }

    /// `element` repeated within the given bounds. Repetitions are greedy.
    pub fn repeat(&mut self, element: Element, multiplicity: Multiplicity) -> Element {
        let start = self.connector();
        let end = self.connector();
        match multiplicity {
            Multiplicity::ZeroToOne => {
                self.connect(start, element);
                self.connect(element, end);
                self.connect(start, end);
            }
            Multiplicity::ZeroToMany => {
                self.connect(start, element);
                self.connect(element, start);
                self.connect(start, end);
            }
            Multiplicity::OneToMany => {
                self.connect(start, element);
                self.connect(element, end);
                self.connect(element, element);
            }
        }
        Element {
            socket: start.socket,
            plug: end.plug,
        }
    }

    pub fn zero_to_one(&mut self, element: Element) -> Element {
        self.repeat(element, Multiplicity::ZeroToOne)
    }

    pub fn zero_to_many(&mut self, element: Element) -> Element {
        self.repeat(element, Multiplicity::ZeroToMany)
    }

    pub fn one_to_many(&mut self, element: Element) -> Element {
        self.repeat(element, Multiplicity::OneToMany)
    }

    /// Branches selected by the keyword of the upcoming token. Keys are compared with the
    /// keyword as stored, so case-insensitive keywords are keyed upper-cased. A token without
    /// a matching keyword leads nowhere.
    pub fn switch<K: Into<String>>(
        &mut self,
        branches: impl IntoIterator<Item = (K, Element)>,
    ) -> Element {
        let end = self.connector();
        let mut sockets = HashMap::new();
        for (keyword, branch) in branches {
            self.connect(branch, end);
            sockets.insert(keyword.into(), branch.socket);
        }
        let switch = self.graph.add(NodeKind::KeyedSwitch {
            branches: sockets,
            end: end.plug,
        });
        Element {
            socket: switch,
            plug: end.plug,
        }
    }

    /// A gate passed only while `predicate` holds for the current context.
    pub fn guard<F>(&mut self, predicate: F) -> Element
    where
        F: Fn(&Context<'_>) -> bool + Send + Sync + 'static,
    {
        let end = self.connector();
        let gate = self.graph.add(NodeKind::Conditional {
            guard: Arc::new(predicate),
            end: end.plug,
        });
        Element {
            socket: gate,
            plug: end.plug,
        }
    }
}
