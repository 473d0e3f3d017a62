//! Path resolution and page assembly for meshfront.
//!
//! This crate provides:
//! - [`classify`]: decides whether a fetched node is binary media, a detail
//!   item or a container
//! - [`PageAssembler`]: resolves request paths and gathers exactly the data
//!   each page needs
//! - [`ViewModel`]: the typed data handed to templates
//!
//! # Quick Start
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::sync::Arc;
//! use mf_backend::{ClientConfig, MeshClient};
//! use mf_site::{Page, PageAssembler};
//!
//! let client = MeshClient::connect(ClientConfig::default())?;
//! let assembler = PageAssembler::new(Arc::new(client));
//!
//! match assembler.page("/cars/sedan-42")? {
//!     Page::Binary(raw) => println!("binary {}", raw.content_type),
//!     Page::View(view) => println!("render {}", view.template().file_name()),
//! }
//! # Ok(())
//! # }
//! ```

mod assembler;
mod classify;
mod error;
mod view;

pub use assembler::{Page, PageAssembler, Resolution};
pub use classify::{DETAIL_SCHEMA, NodeKind, classify, classify_node};
pub use error::SiteError;
pub use view::{ContainerView, DetailView, IndexView, PageTemplate, ViewModel};
