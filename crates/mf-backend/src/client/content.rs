//! Content operations for the backend API.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use tracing::debug;
use ureq::http::header::CONTENT_TYPE;

use super::MeshClient;
use crate::backend::{Backend, RawNode};
use crate::error::BackendError;
use crate::media::ContentType;
use crate::node::{Node, nodes_at};

/// Characters left as-is in a single URL path segment (RFC 3986 unreserved).
const SEGMENT_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Endpoint listing the children of the node with `uuid`.
fn children_endpoint(uuid: &str) -> String {
    format!(
        "nodes/{}/children",
        utf8_percent_encode(uuid, SEGMENT_ENCODE_SET)
    )
}

impl Backend for MeshClient {
    fn fetch_node(&self, path: &str) -> Result<RawNode, BackendError> {
        let path = path.strip_prefix('/').unwrap_or(path);
        let endpoint = self.project_endpoint(&format!("webroot/{path}"));
        let url = self.url(&endpoint, "resolveLinks=short");

        debug!(path, "Resolving path via webroot");

        let response = self.send_get(&url, &endpoint, "*/*")?;
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map_or_else(ContentType::missing, ContentType::parse);

        Ok(RawNode::new(content_type, response.into_body().into_reader()))
    }

    fn fetch_children(&self, uuid: &str) -> Result<Vec<Node>, BackendError> {
        let endpoint = self.project_endpoint(&children_endpoint(uuid));
        let document = self.get_json(&endpoint, "expandAll=true&resolveLinks=short")?;
        let children = nodes_at(document, "data");

        debug!(uuid, count = children.len(), "Fetched children");
        Ok(children)
    }

    fn fetch_breadcrumb(&self) -> Result<Vec<Node>, BackendError> {
        let endpoint = self.project_endpoint("navroot/");
        let document = self.get_json(&endpoint, "maxDepth=1&resolveLinks=short")?;
        let items = nodes_at(document, "root.children");

        debug!(count = items.len(), "Fetched navigation root");
        Ok(items)
    }
}
