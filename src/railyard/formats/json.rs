//! JSON output.

use super::registry::{FormatError, Formatter};
use crate::railyard::ast::AstNode;

/// Serialize a tree as one line of JSON.
pub fn to_json(tree: &AstNode) -> Result<String, FormatError> {
    serde_json::to_string(tree).map_err(|e| FormatError::SerializationError(e.to_string()))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    pub fn compact() -> Self {
        JsonFormatter { pretty: false }
    }

    pub fn pretty() -> Self {
        JsonFormatter { pretty: true }
    }
}

impl Formatter for JsonFormatter {
    fn name(&self) -> &str {
        if self.pretty {
            "json-pretty"
        } else {
            "json"
        }
    }

    fn serialize(&self, tree: &AstNode) -> Result<String, FormatError> {
        if self.pretty {
            serde_json::to_string_pretty(tree)
                .map_err(|e| FormatError::SerializationError(e.to_string()))
        } else {
            to_json(tree)
        }
    }

    fn description(&self) -> &str {
        if self.pretty {
            "Indented JSON"
        } else {
            "Single-line JSON"
        }
    }
}
