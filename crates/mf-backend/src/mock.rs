//! Mock backend implementation for testing.
//!
//! Provides [`MockBackend`] for unit testing without a running content backend.

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Mutex;

use serde_json::Value;

use crate::backend::{Backend, RawNode};
use crate::error::BackendError;
use crate::media::ContentType;
use crate::node::Node;

/// A call recorded by [`MockBackend`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    /// `fetch_node` with the path as given.
    FetchNode(String),
    /// `fetch_children` with the parent uuid.
    FetchChildren(String),
    /// `fetch_breadcrumb`.
    FetchBreadcrumb,
}

/// Canned webroot response.
#[derive(Debug, Clone)]
struct Resource {
    content_type: String,
    body: Vec<u8>,
}

/// Mock backend for testing.
///
/// Serves canned responses and records every call. Use the builder methods
/// to configure the mock with test data.
///
/// # Example
///
/// ```ignore
/// use mf_backend::{Backend, MockBackend};
/// use serde_json::json;
///
/// let backend = MockBackend::new()
///     .with_breadcrumb(vec![json!({"uuid": "nav-1"})])
///     .with_node("/cars", json!({"uuid": "cat-1", "schema": {"name": "category"}}));
///
/// let nav = backend.fetch_breadcrumb().unwrap();
/// ```
#[derive(Debug, Default)]
pub struct MockBackend {
    resources: HashMap<String, Resource>,
    children: HashMap<String, Vec<Value>>,
    breadcrumb: Vec<Value>,
    fail_breadcrumb: bool,
    fail_children: bool,
    calls: Mutex<Vec<BackendCall>>,
}

impl MockBackend {
    /// Create a new empty mock backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve a JSON node at `path`.
    #[must_use]
    pub fn with_node(self, path: impl Into<String>, node: Value) -> Self {
        self.with_resource(path, "application/json; charset=utf-8", node.to_string())
    }

    /// Serve raw bytes with the given content type at `path`.
    #[must_use]
    pub fn with_resource(
        mut self,
        path: impl Into<String>,
        content_type: impl Into<String>,
        body: impl Into<Vec<u8>>,
    ) -> Self {
        self.resources.insert(
            normalize(&path.into()).to_owned(),
            Resource {
                content_type: content_type.into(),
                body: body.into(),
            },
        );
        self
    }

    /// Serve `children` for the node with `uuid`.
    #[must_use]
    pub fn with_children(mut self, uuid: impl Into<String>, children: Vec<Value>) -> Self {
        self.children.insert(uuid.into(), children);
        self
    }

    /// Serve `items` as the navigation root's children.
    #[must_use]
    pub fn with_breadcrumb(mut self, items: Vec<Value>) -> Self {
        self.breadcrumb = items;
        self
    }

    /// Make every `fetch_breadcrumb` call fail with a server error.
    #[must_use]
    pub fn failing_breadcrumb(mut self) -> Self {
        self.fail_breadcrumb = true;
        self
    }

    /// Make every `fetch_children` call fail with a server error.
    #[must_use]
    pub fn failing_children(mut self) -> Self {
        self.fail_children = true;
        self
    }

    /// All calls made so far, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn calls(&self) -> Vec<BackendCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of recorded calls matching `predicate`.
    #[must_use]
    pub fn count(&self, predicate: impl Fn(&BackendCall) -> bool) -> usize {
        self.calls().iter().filter(|call| predicate(call)).count()
    }

    fn record(&self, call: BackendCall) {
        self.calls.lock().unwrap().push(call);
    }
}

/// Drop a single leading slash, matching how the real client builds URLs.
fn normalize(path: &str) -> &str {
    path.strip_prefix('/').unwrap_or(path)
}

fn server_error() -> BackendError {
    BackendError::HttpResponse {
        status: 500,
        body: "mock failure".to_owned(),
    }
}

impl Backend for MockBackend {
    fn fetch_node(&self, path: &str) -> Result<RawNode, BackendError> {
        self.record(BackendCall::FetchNode(path.to_owned()));
        let key = normalize(path);
        let resource = self
            .resources
            .get(key)
            .ok_or_else(|| BackendError::NotFound(format!("demo/webroot/{key}")))?;
        Ok(RawNode::new(
            ContentType::parse(&resource.content_type),
            Cursor::new(resource.body.clone()),
        ))
    }

    fn fetch_children(&self, uuid: &str) -> Result<Vec<Node>, BackendError> {
        self.record(BackendCall::FetchChildren(uuid.to_owned()));
        if self.fail_children {
            return Err(server_error());
        }
        Ok(self
            .children
            .get(uuid)
            .map(|items| items.iter().cloned().map(Node::new).collect())
            .unwrap_or_default())
    }

    fn fetch_breadcrumb(&self) -> Result<Vec<Node>, BackendError> {
        self.record(BackendCall::FetchBreadcrumb);
        if self.fail_breadcrumb {
            return Err(server_error());
        }
        Ok(self.breadcrumb.iter().cloned().map(Node::new).collect())
    }
}
