//! XML output
//!
//!     Each node becomes an element named after the node, with an `id` attribute when the
//!     node has one and its text as the leading text content. Nested elements are indented
//!     with one tab per level:
//!
//!         <for>
//!         	<token id="list">xs</token>
//!         	<token>{</token>
//!         </for>

use super::registry::{FormatError, Formatter};
use crate::railyard::ast::AstNode;

pub fn to_xml(tree: &AstNode) -> String {
    let mut out = String::new();
    write_node(&mut out, tree, 0);
    out
}

fn write_node(out: &mut String, node: &AstNode, depth: usize) {
    let indent = "\t".repeat(depth);
    out.push_str(&indent);
    out.push('<');
    out.push_str(node.name());
    if !node.id().is_empty() {
        out.push_str(&format!(" id=\"{}\"", escape_xml(node.id())));
    }
    if node.has_children() {
        out.push('>');
        out.push_str(&escape_xml(node.text()));
        out.push('\n');
        for child in node.children() {
            write_node(out, child, depth + 1);
        }
        out.push_str(&format!("{indent}</{}>\n", node.name()));
    } else if node.text().is_empty() {
        out.push_str("/>\n");
    } else {
        out.push_str(&format!(">{}</{}>\n", escape_xml(node.text()), node.name()));
    }
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[derive(Debug, Clone, Copy, Default)]
pub struct XmlFormatter;

impl Formatter for XmlFormatter {
    fn name(&self) -> &str {
        "xml"
    }

    fn serialize(&self, tree: &AstNode) -> Result<String, FormatError> {
        Ok(to_xml(tree))
    }

    fn description(&self) -> &str {
        "Tab-indented XML elements"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_elements() {
        let tree = AstNode::new("for", "", "")
            .with_child(AstNode::new("token", "xs", "list"))
            .with_child(AstNode::new("empty", "", ""));
        assert_eq!(
            to_xml(&tree),
            "<for>\n\t<token id=\"list\">xs</token>\n\t<empty/>\n</for>\n"
        );
    }

    #[test]
    fn test_text_is_escaped() {
        let tree = AstNode::new("token", "a<b & 'c'", "");
        assert_eq!(
            to_xml(&tree),
            "<token>a&lt;b &amp; &apos;c&apos;</token>\n"
        );
    }
}
