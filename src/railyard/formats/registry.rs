//! Named formatter lookup.

use std::collections::HashMap;
use std::fmt;

use crate::railyard::ast::AstNode;

#[derive(Debug, Clone, PartialEq)]
pub enum FormatError {
    /// No formatter registered under this name
    FormatNotFound(String),
    SerializationError(String),
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::FormatNotFound(name) => write!(f, "Format '{name}' not found"),
            FormatError::SerializationError(msg) => write!(f, "Serialization error: {msg}"),
        }
    }
}

impl std::error::Error for FormatError {}

/// Writes a tree as text.
pub trait Formatter: Send + Sync {
    /// Name the formatter is registered under ("json", "xml")
    fn name(&self) -> &str;

    fn serialize(&self, tree: &AstNode) -> Result<String, FormatError>;

    fn description(&self) -> &str {
        ""
    }
}

/// Formatters by name. Registering a name twice replaces the first formatter.
pub struct FormatRegistry {
    formatters: HashMap<String, Box<dyn Formatter>>,
}

impl FormatRegistry {
    pub fn new() -> Self {
        FormatRegistry {
            formatters: HashMap::new(),
        }
    }

    pub fn register<F: Formatter + 'static>(&mut self, formatter: F) {
        self.formatters
            .insert(formatter.name().to_string(), Box::new(formatter));
    }

    pub fn get(&self, name: &str) -> Option<&dyn Formatter> {
        self.formatters.get(name).map(|f| f.as_ref())
    }

    pub fn has(&self, name: &str) -> bool {
        self.formatters.contains_key(name)
    }

    pub fn serialize(&self, tree: &AstNode, format: &str) -> Result<String, FormatError> {
        let formatter = self
            .get(format)
            .ok_or_else(|| FormatError::FormatNotFound(format.to_string()))?;
        formatter.serialize(tree)
    }

    /// Registered names, sorted.
    pub fn list_formats(&self) -> Vec<String> {
        let mut names: Vec<_> = self.formatters.keys().cloned().collect();
        names.sort();
        names
    }

    /// A registry holding the built-in json, json-pretty and xml formatters.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(super::JsonFormatter::compact());
        registry.register(super::JsonFormatter::pretty());
        registry.register(super::XmlFormatter);
        registry
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Upper;
    impl Formatter for Upper {
        fn name(&self) -> &str {
            "upper"
        }
        fn serialize(&self, tree: &AstNode) -> Result<String, FormatError> {
            Ok(tree.name().to_uppercase())
        }
        fn description(&self) -> &str {
            "Node name in upper case"
        }
    }

    #[test]
    fn test_register_and_get() {
        let mut registry = FormatRegistry::new();
        assert!(registry.list_formats().is_empty());
        registry.register(Upper);
        assert!(registry.has("upper"));
        assert_eq!(registry.get("upper").map(|f| f.description()), Some("Node name in upper case"));
        assert!(registry.get("lower").is_none());
    }

    #[test]
    fn test_serialize_by_name() {
        let mut registry = FormatRegistry::new();
        registry.register(Upper);
        let tree = AstNode::new("expr", "", "");
        assert_eq!(registry.serialize(&tree, "upper").unwrap(), "EXPR");
        assert_eq!(
            registry.serialize(&tree, "yaml"),
            Err(FormatError::FormatNotFound("yaml".to_string()))
        );
    }

    #[test]
    fn test_replace_formatter() {
        let mut registry = FormatRegistry::new();
        registry.register(Upper);
        registry.register(Upper);
        assert_eq!(registry.list_formats(), vec!["upper"]);
    }

    #[test]
    fn test_defaults() {
        let registry = FormatRegistry::default();
        assert_eq!(registry.list_formats(), vec!["json", "json-pretty", "xml"]);
    }

    #[test]
    fn test_format_error_display() {
        let err = FormatError::FormatNotFound("test".to_string());
        assert_eq!(err.to_string(), "Format 'test' not found");
        let err = FormatError::SerializationError("boom".to_string());
        assert_eq!(err.to_string(), "Serialization error: boom");
    }
}
