//! Grammar graph nodes.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::env::EnvHook;
use super::rule::RuleId;
use crate::railyard::parsing::Context;
use crate::railyard::token::TokenTypeRef;

/// Technical id of a node: its slot in the per-parse [Graph](super::Graph) arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The node cannot be left from the current context. Consumed by the search, never reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoSuccessor;

/// Predicate deciding whether a conditional node can be passed.
pub type Guard = Arc<dyn Fn(&Context<'_>) -> bool + Send + Sync>;

#[derive(Clone)]
pub enum NodeKind {
    /// Entry of a rule instance. Its successors are a freshly expanded rule body.
    RuleStart {
        rule: RuleId,
        ident: Option<String>,
        end: NodeId,
    },
    RuleEnd {
        rule: RuleId,
        ident: Option<String>,
    },
    /// Consumes one token of the given type.
    TokenSlot {
        token_type: TokenTypeRef,
        ident: Option<String>,
        hook: Option<EnvHook>,
    },
    Technical,
    /// Passes on to `end` only while the guard holds.
    Conditional { guard: Guard, end: NodeId },
    /// Routes to the branch keyed by the current token's keyword. Branch exits are wired to
    /// `end` when the switch is built.
    KeyedSwitch {
        branches: HashMap<String, NodeId>,
        end: NodeId,
    },
}

impl fmt::Debug for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::RuleStart { rule, ident, end } => f
                .debug_struct("RuleStart")
                .field("rule", rule)
                .field("ident", ident)
                .field("end", end)
                .finish(),
            NodeKind::RuleEnd { rule, ident } => f
                .debug_struct("RuleEnd")
                .field("rule", rule)
                .field("ident", ident)
                .finish(),
            NodeKind::TokenSlot {
                token_type,
                ident,
                hook,
            } => f
                .debug_struct("TokenSlot")
                .field("token_type", token_type)
                .field("ident", ident)
                .field("hook", &hook.is_some())
                .finish(),
            NodeKind::Technical => f.write_str("Technical"),
            NodeKind::Conditional { end, .. } => {
                f.debug_struct("Conditional").field("end", end).finish()
            }
            NodeKind::KeyedSwitch { branches, end } => {
                let mut keys: Vec<_> = branches.keys().collect();
                keys.sort();
                f.debug_struct("KeyedSwitch")
                    .field("branches", &keys)
                    .field("end", end)
                    .finish()
            }
        }
    }
}

/// A node with its static successor list. Rule starts, conditionals and keyed switches
/// compute their successors on demand instead.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) id: NodeId,
    pub(crate) kind: NodeKind,
    pub(crate) successors: Vec<NodeId>,
}

impl Node {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn successors(&self) -> &[NodeId] {
        &self.successors
    }

    pub fn is_rule_start(&self) -> bool {
        matches!(self.kind, NodeKind::RuleStart { .. })
    }

    pub fn is_rule_end(&self) -> bool {
        matches!(self.kind, NodeKind::RuleEnd { .. })
    }

    pub fn is_token_slot(&self) -> bool {
        matches!(self.kind, NodeKind::TokenSlot { .. })
    }

    /// Rule entered by this node, if it is a rule start.
    pub fn started_rule(&self) -> Option<RuleId> {
        match self.kind {
            NodeKind::RuleStart { rule, .. } => Some(rule),
            _ => None,
        }
    }

    /// Rule left by this node, if it is a rule end.
    pub fn ended_rule(&self) -> Option<RuleId> {
        match self.kind {
            NodeKind::RuleEnd { rule, .. } => Some(rule),
            _ => None,
        }
    }

    /// Identifier of a rule boundary or token slot.
    pub fn ident(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::RuleStart { ident, .. }
            | NodeKind::RuleEnd { ident, .. }
            | NodeKind::TokenSlot { ident, .. } => ident.as_deref(),
            _ => None,
        }
    }
}
