//! The search path
//!
//!     A [Path] is the stack of visited nodes, each with the token it consumed if it is a
//!     matched token slot, plus a stack of environment scopes:
//!
//!         entering a rule start pushes a copy of the rule's variable defaults
//!         entering a rule end pushes an "exited" marker
//!         a matched token slot with a hook changes the innermost active scope
//!
//!     Popping undoes exactly what pushing did, so backtracking restores the environment.
//!     Variable lookup walks the scopes from the top; each exited marker hides one scope
//!     below it (the scope of the rule that was left), and the first remaining scope that
//!     defines the variable answers.

use std::fmt::Write;

use crate::railyard::error::GrammarError;
use crate::railyard::grammar::{Env, EnvValue, Grammar, Graph, NodeId, NodeKind};
use crate::railyard::token::Token;

/// A visited node and the token it consumed.
#[derive(Debug, Clone, PartialEq)]
pub struct PathElement {
    pub node: NodeId,
    pub token: Option<Token>,
}

#[derive(Debug, Clone, PartialEq)]
enum Scope {
    Active(Env),
    Exited,
}

#[derive(Debug, Clone, Default)]
pub struct Path {
    elements: Vec<PathElement>,
    scopes: Vec<Scope>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn elements(&self) -> &[PathElement] {
        &self.elements
    }

    pub fn last(&self) -> Option<&PathElement> {
        self.elements.last()
    }

    /// Element at `index`; negative indices count from the end (`-1` is the tip).
    pub fn element(&self, index: isize) -> Result<&PathElement, GrammarError> {
        let len = self.elements.len() as isize;
        let resolved = if index < 0 { len + index } else { index };
        if resolved < 0 || resolved >= len {
            return Err(GrammarError::InvalidPathIndex(index));
        }
        Ok(&self.elements[resolved as usize])
    }

    /// Tokens consumed along the path, in input order.
    pub fn tokens(&self) -> impl Iterator<Item = &Token> {
        self.elements.iter().filter_map(|e| e.token.as_ref())
    }

    /// Consumed token texts joined by dots.
    pub fn token_trail(&self) -> String {
        self.tokens().map(Token::text).collect::<Vec<_>>().join(".")
    }

    /// Node ids joined by colons.
    pub fn technical_trail(&self) -> String {
        let mut trail = String::new();
        for (i, element) in self.elements.iter().enumerate() {
            if i > 0 {
                trail.push(':');
            }
            let _ = write!(trail, "{}", element.node);
        }
        trail
    }

    pub fn push(&mut self, graph: &Graph, grammar: &Grammar, node: NodeId, token: Option<Token>) {
        match &graph.node(node).kind {
            NodeKind::RuleStart { rule, .. } => {
                let defaults = grammar
                    .rule(*rule)
                    .map(|r| r.vars().clone())
                    .unwrap_or_default();
                self.scopes.push(Scope::Active(defaults));
            }
            NodeKind::RuleEnd { .. } => self.scopes.push(Scope::Exited),
            NodeKind::TokenSlot {
                hook: Some(hook), ..
            } => {
                if let (Some(token), Some(env)) = (&token, self.active_scope_mut()) {
                    hook.apply(env, token);
                }
            }
            _ => {}
        }
        self.elements.push(PathElement { node, token });
    }

    pub fn pop(&mut self, graph: &Graph) -> Option<PathElement> {
        let element = self.elements.pop()?;
        match &graph.node(element.node).kind {
            NodeKind::RuleStart { .. } | NodeKind::RuleEnd { .. } => {
                self.scopes.pop();
            }
            NodeKind::TokenSlot {
                hook: Some(hook), ..
            } => {
                if let (Some(token), Some(env)) = (&element.token, self.active_scope_mut()) {
                    hook.undo(env, token);
                }
            }
            _ => {}
        }
        Some(element)
    }

    /// Nearest active definition of `name`.
    pub fn env_var(&self, name: &str) -> Option<&EnvValue> {
        let mut skip = 0usize;
        for scope in self.scopes.iter().rev() {
            match scope {
                Scope::Exited => skip += 1,
                Scope::Active(env) => {
                    if skip > 0 {
                        skip -= 1;
                    } else if let Some(value) = env.get(name) {
                        return Some(value);
                    }
                }
            }
        }
        None
    }

    fn active_scope_mut(&mut self) -> Option<&mut Env> {
        let mut skip = 0usize;
        for scope in self.scopes.iter_mut().rev() {
            match scope {
                Scope::Exited => skip += 1,
                Scope::Active(env) => {
                    if skip == 0 {
                        return Some(env);
                    }
                    skip -= 1;
                }
            }
        }
        None
    }

    /// Whether stepping onto `node` would return to a node, or re-enter a rule that is still
    /// open, since the last consumed token.
    pub(crate) fn revisits(&self, graph: &Graph, node: NodeId) -> bool {
        let rule = graph.node(node).started_rule();
        // instances of `rule` closed after the start being looked at
        let mut closed = 0usize;
        for element in self.elements.iter().rev() {
            if element.token.is_some() {
                return false;
            }
            if element.node == node {
                return true;
            }
            let Some(rule) = rule else { continue };
            let visited = graph.node(element.node);
            if visited.ended_rule() == Some(rule) {
                closed += 1;
            } else if visited.started_rule() == Some(rule) {
                if closed == 0 {
                    return true;
                }
                closed -= 1;
            }
        }
        false
    }
}
