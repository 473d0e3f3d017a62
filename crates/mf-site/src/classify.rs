//! Node classification.
//!
//! The discriminator is deliberately coarse: image content types are binary,
//! nodes of the [`DETAIL_SCHEMA`] schema are detail items, and everything
//! else (including nodes without a readable schema name) is a container.

use mf_backend::{ContentType, Node};

/// Schema name of nodes rendered with the product detail page.
pub const DETAIL_SCHEMA: &str = "vehicle";

/// How a resolved node is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Binary media, passed through untouched.
    Binary,
    /// A leaf item, rendered with the detail page.
    Detail,
    /// Any other node, rendered as a list of its children.
    Container,
}

/// Classify a webroot response.
///
/// `node` is only consulted when the content type is not binary media; pass
/// `None` when the body has not been parsed.
#[must_use]
pub fn classify(content_type: &ContentType, node: Option<&Node>) -> NodeKind {
    if content_type.is_binary_media() {
        return NodeKind::Binary;
    }
    node.map_or(NodeKind::Container, classify_node)
}

/// Classify a parsed (non-binary) node by its schema name.
#[must_use]
pub fn classify_node(node: &Node) -> NodeKind {
    match node.schema_name() {
        Some(DETAIL_SCHEMA) => NodeKind::Detail,
        _ => NodeKind::Container,
    }
}
