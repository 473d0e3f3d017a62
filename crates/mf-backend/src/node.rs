//! Content nodes.
//!
//! Nodes are dynamically shaped JSON records. [`Node`] keeps the full payload
//! (templates receive it verbatim) and offers optional lookups by dotted path
//! for the handful of fields the front-end itself inspects.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Dotted path of the node identifier.
const UUID_PATH: &str = "uuid";

/// Dotted path of the schema discriminator.
const SCHEMA_NAME_PATH: &str = "schema.name";

/// A content node returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Node(Value);

impl Node {
    /// Wrap a JSON value.
    #[must_use]
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Parse a node from a JSON document.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes).map(Self)
    }

    /// Look up a value by dotted path (`"schema.name"`, `"fields.images.0"`).
    ///
    /// Numeric segments index into arrays. Returns `None` when any segment
    /// is absent or the value has the wrong shape.
    #[must_use]
    pub fn get_at_path(&self, path: &str) -> Option<&Value> {
        lookup(&self.0, path)
    }

    /// Look up a string by dotted path.
    ///
    /// Returns `None` when the value is absent or not a string.
    #[must_use]
    pub fn get_str_at_path(&self, path: &str) -> Option<&str> {
        self.get_at_path(path).and_then(Value::as_str)
    }

    /// Look up a string by dotted path, falling back to `default`.
    #[must_use]
    pub fn get_str_or<'a>(&'a self, path: &str, default: &'a str) -> &'a str {
        self.get_str_at_path(path).unwrap_or(default)
    }

    /// Stable node identifier.
    #[must_use]
    pub fn uuid(&self) -> Option<&str> {
        self.get_str_at_path(UUID_PATH)
    }

    /// Name of the node's schema.
    #[must_use]
    pub fn schema_name(&self) -> Option<&str> {
        self.get_str_at_path(SCHEMA_NAME_PATH)
    }

    /// Consume the node and return the underlying JSON value.
    #[must_use]
    pub fn into_value(self) -> Value {
        self.0
    }
}

impl From<Value> for Node {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

fn lookup<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(root);
    }
    path.split('.').try_fold(root, |value, segment| match value {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Take the array at `path` out of a response document as nodes.
///
/// An absent path yields an empty list; a present value that is not an
/// array also yields an empty list.
pub(crate) fn nodes_at(mut document: Value, path: &str) -> Vec<Node> {
    let mut current = &mut document;
    for segment in path.split('.') {
        match current.get_mut(segment) {
            Some(next) => current = next,
            None => return Vec::new(),
        }
    }
    match current.take() {
        Value::Array(items) => items.into_iter().map(Node).collect(),
        _ => Vec::new(),
    }
}
