//! Error types for page assembly.

use mf_backend::BackendError;

/// Error returned when a page cannot be assembled.
#[derive(Debug, thiserror::Error)]
pub enum SiteError {
    /// Resolving the request path failed.
    #[error("failed to resolve {path}")]
    Resolve {
        /// Request path.
        path: String,
        #[source]
        source: BackendError,
    },
    /// Fetching the navigation breadcrumb failed.
    #[error("failed to fetch navigation")]
    Breadcrumb(#[source] BackendError),
    /// Fetching the children of a container failed.
    #[error("failed to fetch children of {uuid}")]
    Children {
        /// Parent node uuid.
        uuid: String,
        #[source]
        source: BackendError,
    },
    /// A container node came back without a uuid, so its children cannot be listed.
    #[error("container node has no uuid")]
    MissingUuid,
}

impl SiteError {
    /// Whether the request path does not exist on the backend.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Resolve { source, .. } if source.is_not_found())
    }
}
