//! Tree serialization
//!
//!     Parse results can be written out in several formats, looked up by name through a
//!     [FormatRegistry]:
//!
//!         json          one line, keys in the order name, text, id, children
//!         json-pretty   the same, indented
//!         xml           one element per node, tab indented
//!
//!     Further formats implement [Formatter] and are registered at runtime.

pub mod json;
pub mod registry;
pub mod xml;

pub use json::{to_json, JsonFormatter};
pub use registry::{FormatError, FormatRegistry, Formatter};
pub use xml::{to_xml, XmlFormatter};
