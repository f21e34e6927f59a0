//! Per-parse node arena.
//!
//! The arena starts with the grammar's root rule start and end. Everything else is allocated
//! while the parser walks the graph: each visit of a rule start expands a new rule body.
//! [Graph::mark] and [Graph::truncate] let the search drop the nodes of an abandoned branch.

use tracing::warn;

use super::builder::Builder;
use super::node::{NoSuccessor, Node, NodeId, NodeKind};
use super::rule::{Grammar, RuleId};
use crate::railyard::parsing::Context;

#[derive(Debug, Clone)]
pub struct Graph {
    nodes: Vec<Node>,
    persistent: usize,
}

impl Graph {
    /// An arena holding the root rule boundaries of `grammar`.
    pub fn for_grammar(grammar: &Grammar) -> Self {
        let mut graph = Graph {
            nodes: Vec::new(),
            persistent: 0,
        };
        let root = grammar.root();
        let ident = grammar.ident().map(str::to_string);
        let end = graph.add(NodeKind::RuleEnd {
            rule: root,
            ident: ident.clone(),
        });
        graph.add(NodeKind::RuleStart {
            rule: root,
            ident,
            end,
        });
        graph.persistent = graph.nodes.len();
        graph
    }

    /// Start node of the root rule.
    pub fn root(&self) -> NodeId {
        NodeId(1)
    }

    pub(crate) fn add(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            id,
            kind,
            successors: Vec::new(),
        });
        id
    }

    /// Add an edge unless it already exists.
    pub(crate) fn connect(&mut self, from: NodeId, to: NodeId) {
        let successors = &mut self.nodes[from.0].successors;
        if !successors.contains(&to) {
            successors.push(to);
        }
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub(crate) fn mark(&self) -> usize {
        self.nodes.len()
    }

    /// Drop every node allocated since `mark`. The root boundaries always survive.
    pub(crate) fn truncate(&mut self, mark: usize) {
        self.nodes.truncate(mark.max(self.persistent));
    }

    /// Successors of `id` in the given context, in preference order.
    ///
    /// An empty list means the node is a dead end (or the end of the grammar, for the root
    /// rule end). [NoSuccessor] means a guard rejected the context.
    pub fn successors(
        &mut self,
        grammar: &Grammar,
        id: NodeId,
        context: &Context<'_>,
    ) -> Result<Vec<NodeId>, NoSuccessor> {
        if let NodeKind::RuleStart { rule, end, .. } = self.nodes[id.0].kind {
            return self.expand_rule(grammar, rule, end, context);
        }
        let node = &self.nodes[id.0];
        match &node.kind {
            NodeKind::Conditional { guard, end } => {
                if guard(context) {
                    Ok(vec![*end])
                } else {
                    Err(NoSuccessor)
                }
            }
            NodeKind::KeyedSwitch { branches, .. } => Ok(context
                .current_keyword()
                .and_then(|keyword| keyword.keyword())
                .and_then(|keyword| branches.get(keyword))
                .map(|socket| vec![*socket])
                .unwrap_or_default()),
            _ => Ok(node.successors.clone()),
        }
    }

    /// Wire a fresh body of `rule_id` between a new entry/exit pair ending in `rule_end`.
    fn expand_rule(
        &mut self,
        grammar: &Grammar,
        rule_id: RuleId,
        rule_end: NodeId,
        context: &Context<'_>,
    ) -> Result<Vec<NodeId>, NoSuccessor> {
        let Some(rule) = grammar.rule(rule_id) else {
            warn!(rule = rule_id.index(), "reference to an undeclared rule");
            return Err(NoSuccessor);
        };
        let Some(expand) = rule.expander() else {
            warn!(rule = rule.name(), "rule without body reached");
            return Err(NoSuccessor);
        };
        let entry = self.add(NodeKind::Technical);
        let exit = self.add(NodeKind::Technical);
        expand(&mut Builder::new(self), entry, exit, context);
        self.connect(exit, rule_end);
        Ok(vec![entry])
    }
}
