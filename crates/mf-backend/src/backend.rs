//! Backend trait.

use std::fmt;
use std::io::Read;

use crate::error::BackendError;
use crate::media::ContentType;
use crate::node::Node;

/// Response of a path resolution, before any parsing.
///
/// The body is left unread so the caller can decide from the content type
/// whether to stream it or parse it as a node.
pub struct RawNode {
    /// Content type reported by the backend.
    pub content_type: ContentType,
    /// Unread response body.
    pub body: Box<dyn Read + Send>,
}

impl RawNode {
    /// Create a raw node from a content type and a reader.
    pub fn new(content_type: ContentType, body: impl Read + Send + 'static) -> Self {
        Self {
            content_type,
            body: Box::new(body),
        }
    }

    /// Read the whole body and parse it as a JSON node.
    pub fn into_node(mut self) -> Result<Node, BackendError> {
        let mut bytes = Vec::new();
        self.body.read_to_end(&mut bytes)?;
        Ok(Node::from_slice(&bytes)?)
    }
}

impl fmt::Debug for RawNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawNode")
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

/// Read access to the content backend.
///
/// All operations are authenticated by the implementation; callers never
/// see the session credential.
pub trait Backend: Send + Sync {
    /// Resolve a URL path to a node or binary asset via the webroot endpoint.
    ///
    /// `path` is passed through verbatim (a single leading `/` is dropped).
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::NotFound`] if nothing lives at `path`,
    /// [`BackendError::Unauthorized`] if the session is rejected, and other
    /// variants for transport or server failures.
    fn fetch_node(&self, path: &str) -> Result<RawNode, BackendError>;

    /// List the children of the node with the given uuid, fully expanded.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] if the request fails or the body is not JSON.
    fn fetch_children(&self, uuid: &str) -> Result<Vec<Node>, BackendError>;

    /// Fetch the top-level navigation nodes (one level deep).
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] if the request fails or the body is not JSON.
    fn fetch_breadcrumb(&self) -> Result<Vec<Node>, BackendError>;
}
