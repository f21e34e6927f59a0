//! Path to tree reduction.

use super::path::Path;
use crate::railyard::ast::AstNode;
use crate::railyard::config::TreeKind;
use crate::railyard::grammar::{Grammar, Graph, NodeKind};

/// Fold a complete path into a tree.
///
/// Rule starts open a node, rule ends close it (running the rule's transform for
/// [TreeKind::Ast]) and attach it to the enclosing node, matched token slots add `token`
/// leaves. Closing the root rule ends the walk.
pub(crate) fn reduce(grammar: &Grammar, graph: &Graph, path: &Path, kind: TreeKind) -> AstNode {
    let mut parents: Vec<AstNode> = Vec::new();
    let mut current: Option<AstNode> = None;

    for element in path.elements() {
        match &graph.node(element.node).kind {
            NodeKind::RuleStart { rule, ident, .. } => {
                let name = grammar.rule(*rule).map_or("", |r| r.name());
                let text = element.token.as_ref().map_or("", |t| t.text());
                let node = AstNode::new(name, text, ident.as_deref().unwrap_or(""));
                if let Some(parent) = current.replace(node) {
                    parents.push(parent);
                }
            }
            NodeKind::RuleEnd { rule, .. } => {
                let Some(mut done) = current.take() else {
                    continue;
                };
                if kind == TreeKind::Ast {
                    if let Some(transform) = grammar.rule(*rule).and_then(|r| r.transformer()) {
                        let id = done.id().to_string();
                        done = transform(done);
                        done.set_id(id);
                    }
                }
                match parents.pop() {
                    Some(mut parent) => {
                        parent.add_child(done);
                        current = Some(parent);
                    }
                    None => return done,
                }
            }
            NodeKind::TokenSlot { ident, .. } => {
                if let (Some(node), Some(token)) = (current.as_mut(), &element.token) {
                    node.add_child(AstNode::leaf(token, ident.as_deref().unwrap_or("")));
                }
            }
            NodeKind::Technical | NodeKind::Conditional { .. } | NodeKind::KeyedSwitch { .. } => {}
        }
    }

    current.unwrap_or_else(|| AstNode::new("", "", ""))
}
