//! Page view models.
//!
//! Each view serializes to the exact template context its page uses:
//! `breadcrumb` always, plus `product` for detail pages and `category` with
//! `products` for container pages.

use mf_backend::Node;
use serde::Serialize;

/// Template that renders a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageTemplate {
    /// Front page.
    Welcome,
    /// Single item page.
    ProductDetail,
    /// Container page listing child items.
    ProductList,
}

impl PageTemplate {
    /// Template file name.
    #[must_use]
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Welcome => "welcome.html",
            Self::ProductDetail => "productDetail.html",
            Self::ProductList => "productList.html",
        }
    }
}

/// Front page data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexView {
    pub breadcrumb: Vec<Node>,
}

/// Detail page data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailView {
    pub breadcrumb: Vec<Node>,
    pub product: Node,
}

/// Container page data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContainerView {
    pub breadcrumb: Vec<Node>,
    pub category: Node,
    pub products: Vec<Node>,
}

/// Data for one rendered page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ViewModel {
    Index(IndexView),
    Detail(DetailView),
    Container(ContainerView),
}

impl ViewModel {
    /// Template this view is rendered with.
    #[must_use]
    pub fn template(&self) -> PageTemplate {
        match self {
            Self::Index(_) => PageTemplate::Welcome,
            Self::Detail(_) => PageTemplate::ProductDetail,
            Self::Container(_) => PageTemplate::ProductList,
        }
    }

    /// Navigation items shown on every page.
    #[must_use]
    pub fn breadcrumb(&self) -> &[Node] {
        match self {
            Self::Index(view) => &view.breadcrumb,
            Self::Detail(view) => &view.breadcrumb,
            Self::Container(view) => &view.breadcrumb,
        }
    }
}
