//! Request path resolution and page data assembly.
//!
//! A request path goes through one webroot fetch. Image content is handed
//! back unread; anything else is parsed, classified and enriched with only
//! the data its page needs:
//!
//! | Page      | Backend calls after the webroot fetch        |
//! |-----------|----------------------------------------------|
//! | index     | breadcrumb (no webroot fetch at all)         |
//! | detail    | breadcrumb                                   |
//! | container | breadcrumb and children, run concurrently    |

use std::sync::Arc;
use std::thread;

use mf_backend::{Backend, Node, RawNode};
use tracing::debug;

use crate::classify::{NodeKind, classify, classify_node};
use crate::error::SiteError;
use crate::view::{ContainerView, DetailView, IndexView, ViewModel};

/// A classified webroot response.
#[derive(Debug)]
pub enum Resolution {
    /// Image content with its body still unread.
    Binary(RawNode),
    /// A parsed detail item.
    Detail(Node),
    /// A parsed container.
    Container(Node),
}

/// Outcome of assembling a request path.
#[derive(Debug)]
pub enum Page {
    /// Pass the backend body through with its content type.
    Binary(RawNode),
    /// Render the view with its template.
    View(ViewModel),
}

/// Resolves request paths and gathers page data from a [`Backend`].
///
/// Holds no per-request state: concurrent requests share one assembler.
#[derive(Clone)]
pub struct PageAssembler {
    backend: Arc<dyn Backend>,
}

impl PageAssembler {
    /// Create an assembler over `backend`.
    #[must_use]
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    /// Front page: the breadcrumb alone.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::Breadcrumb`] if the navigation fetch fails.
    pub fn index_view(&self) -> Result<ViewModel, SiteError> {
        let breadcrumb = self.breadcrumb()?;
        Ok(ViewModel::Index(IndexView { breadcrumb }))
    }

    /// Fetch `path` from the webroot and classify it.
    ///
    /// `path` is passed to the backend as received, still percent-encoded.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::Resolve`] if the fetch fails or a non-binary body
    /// is not valid JSON.
    pub fn resolve(&self, path: &str) -> Result<Resolution, SiteError> {
        let resolve_err = |source| SiteError::Resolve {
            path: path.to_owned(),
            source,
        };

        let raw = self.backend.fetch_node(path).map_err(resolve_err)?;
        if classify(&raw.content_type, None) == NodeKind::Binary {
            debug!(path, content_type = %raw.content_type, "Resolved binary media");
            return Ok(Resolution::Binary(raw));
        }

        let node = raw.into_node().map_err(resolve_err)?;
        let resolution = match classify_node(&node) {
            NodeKind::Detail => Resolution::Detail(node),
            NodeKind::Container | NodeKind::Binary => Resolution::Container(node),
        };
        Ok(resolution)
    }

    /// Detail page for an already resolved item.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::Breadcrumb`] if the navigation fetch fails.
    pub fn detail_view(&self, product: Node) -> Result<ViewModel, SiteError> {
        let breadcrumb = self.breadcrumb()?;
        Ok(ViewModel::Detail(DetailView {
            breadcrumb,
            product,
        }))
    }

    /// Container page for an already resolved node.
    ///
    /// The children are fetched on a scoped thread while the calling thread
    /// fetches the breadcrumb. Both fetches run to completion and either
    /// failure fails the page.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::MissingUuid`] if `category` has no uuid, otherwise
    /// the first failing fetch (breadcrumb before children).
    pub fn container_view(&self, category: Node) -> Result<ViewModel, SiteError> {
        let uuid = category.uuid().ok_or(SiteError::MissingUuid)?.to_owned();

        // Threads are owned by this request; blocking fetches must not
        // occupy a pool shared with other requests
        let (breadcrumb, products) = thread::scope(|scope| {
            let children = scope.spawn(|| self.backend.fetch_children(&uuid));
            let breadcrumb = self.breadcrumb();
            let children = children
                .join()
                .unwrap_or_else(|panic| std::panic::resume_unwind(panic));
            (breadcrumb, children)
        });
        let breadcrumb = breadcrumb?;
        let products = products.map_err(|source| SiteError::Children { uuid, source })?;

        Ok(ViewModel::Container(ContainerView {
            breadcrumb,
            category,
            products,
        }))
    }

    /// Resolve `path` and assemble whatever page it maps to.
    ///
    /// # Errors
    ///
    /// Returns the first [`SiteError`] from resolution or assembly.
    pub fn page(&self, path: &str) -> Result<Page, SiteError> {
        match self.resolve(path)? {
            Resolution::Binary(raw) => Ok(Page::Binary(raw)),
            Resolution::Detail(node) => self.detail_view(node).map(Page::View),
            Resolution::Container(node) => self.container_view(node).map(Page::View),
        }
    }

    fn breadcrumb(&self) -> Result<Vec<Node>, SiteError> {
        self.backend
            .fetch_breadcrumb()
            .map_err(SiteError::Breadcrumb)
    }
}
