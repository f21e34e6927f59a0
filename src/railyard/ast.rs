//! Syntax tree nodes
//!
//!     Parsing produces a tree of [AstNode]s. Rule instances become nodes named after their
//!     rule, consumed tokens become `token` leaves. Every node has a name, a text and an id;
//!     ids come from the identifiers given to rule references and token slots in the grammar
//!     and are empty otherwise. Rule transforms use the lookup helpers below to pick the
//!     pieces they need:
//!
//!         let list = node.child_by_id("list").map(AstNode::text);
//!
//!     Serialization to JSON skips the originating token; see
//!     [formats](crate::railyard::formats) for the available output formats.

use serde::Serialize;

use crate::railyard::token::Token;

/// Name given to token leaves.
pub const TOKEN_NODE: &str = "token";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AstNode {
    name: String,
    text: String,
    id: String,
    children: Vec<AstNode>,
    #[serde(skip)]
    token: Option<Token>,
}

impl AstNode {
    pub fn new(name: impl Into<String>, text: impl Into<String>, id: impl Into<String>) -> Self {
        AstNode {
            name: name.into(),
            text: text.into(),
            id: id.into(),
            children: Vec::new(),
            token: None,
        }
    }

    /// A `token` leaf for a consumed token.
    pub fn leaf(token: &Token, id: impl Into<String>) -> Self {
        AstNode {
            token: Some(token.clone()),
            ..AstNode::new(TOKEN_NODE, token.text(), id)
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// The token this node was built from, for token leaves.
    pub fn token(&self) -> Option<&Token> {
        self.token.as_ref()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    pub fn clear_id(&mut self) {
        self.id.clear();
    }

    pub fn children(&self) -> &[AstNode] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut Vec<AstNode> {
        &mut self.children
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn add_child(&mut self, child: AstNode) {
        self.children.push(child);
    }

    /// Builder-style [AstNode::add_child].
    pub fn with_child(mut self, child: AstNode) -> Self {
        self.children.push(child);
        self
    }

    /// Remove and return all children.
    pub fn remove_children(&mut self) -> Vec<AstNode> {
        std::mem::take(&mut self.children)
    }

    /// Replace the child at `index`, returning the old one.
    pub fn replace_child(&mut self, index: usize, child: AstNode) -> Option<AstNode> {
        self.children
            .get_mut(index)
            .map(|slot| std::mem::replace(slot, child))
    }

    /// First child named `name`.
    pub fn child(&self, name: &str) -> Option<&AstNode> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn children_by_name<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a AstNode> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// First child with the given id.
    pub fn child_by_id(&self, id: &str) -> Option<&AstNode> {
        self.children.iter().find(|c| !c.id.is_empty() && c.id == id)
    }

    pub fn children_by_id<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a AstNode> {
        self.children
            .iter()
            .filter(move |c| !c.id.is_empty() && c.id == id)
    }

    /// Whether two trees have the same names, texts, ids and child order.
    pub fn same_shape(&self, other: &AstNode) -> bool {
        self.name == other.name
            && self.text == other.text
            && self.id == other.id
            && self.children.len() == other.children.len()
            && self
                .children
                .iter()
                .zip(&other.children)
                .all(|(a, b)| a.same_shape(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AstNode {
        AstNode::new("for", "", "")
            .with_child(AstNode::new("token", "forall", ""))
            .with_child(AstNode::new("token", "xs", "list"))
            .with_child(AstNode::new("token", "{", ""))
    }

    #[test]
    fn test_lookup_by_name_and_id() {
        let node = sample();
        assert_eq!(node.child("token").map(AstNode::text), Some("forall"));
        assert_eq!(node.children_by_name("token").count(), 3);
        assert_eq!(node.child_by_id("list").map(AstNode::text), Some("xs"));
        assert_eq!(node.children_by_id("list").count(), 1);
        assert!(node.child_by_id("").is_none());
    }

    #[test]
    fn test_replace_and_remove_children() {
        let mut node = sample();
        let old = node.replace_child(0, AstNode::new("kw", "forall", ""));
        assert_eq!(old.map(|n| n.name().to_string()), Some("token".to_string()));
        assert_eq!(node.children()[0].name(), "kw");
        assert!(node.replace_child(9, AstNode::new("x", "", "")).is_none());

        let removed = node.remove_children();
        assert_eq!(removed.len(), 3);
        assert!(!node.has_children());
    }

    #[test]
    fn test_ids() {
        let mut node = AstNode::new("rule", "", "main");
        assert_eq!(node.id(), "main");
        node.clear_id();
        assert_eq!(node.id(), "");
        node.set_id("other");
        node.set_name("renamed");
        node.set_text("t");
        assert_eq!((node.name(), node.text(), node.id()), ("renamed", "t", "other"));
    }

    #[test]
    fn test_same_shape_ignores_tokens() {
        let a = sample();
        let mut b = sample();
        assert!(a.same_shape(&b));
        b.children_mut()[1].set_text("ys");
        assert!(!a.same_shape(&b));
    }
}
