//! Content backend access for meshfront.
//!
//! This crate talks to the headless content backend over its REST API. It
//! provides:
//!
//! - [`Backend`] trait with the three read operations the front-end needs
//!   (`fetch_node`, `fetch_children`, `fetch_breadcrumb`)
//! - [`MeshClient`], the HTTP implementation built on `ureq`, which
//!   authenticates once at construction and reuses the session for every call
//! - [`Node`], a typed view over the untyped JSON nodes the backend returns
//! - [`ContentType`], the parsed content-type header used to tell binary
//!   media from structured nodes
//! - [`MockBackend`] for testing (behind the `mock` feature flag)
//!
//! # Example
//!
//! ```ignore
//! use mf_backend::{AuthStrategy, Backend, ClientConfig, MeshClient};
//!
//! let client = MeshClient::connect(ClientConfig {
//!     base_url: "http://localhost:8080/api/v1".to_owned(),
//!     auth: AuthStrategy::Login {
//!         username: "admin".to_owned(),
//!         password: "admin".to_owned(),
//!     },
//!     ..ClientConfig::default()
//! })?;
//!
//! for node in client.fetch_breadcrumb()? {
//!     println!("{:?}", node.get_str_at_path("fields.name"));
//! }
//! ```

mod backend;
mod client;
mod error;
mod media;
#[cfg(feature = "mock")]
mod mock;
mod node;

pub use backend::{Backend, RawNode};
pub use client::{AuthStrategy, ClientConfig, MeshClient};
pub use error::BackendError;
pub use media::{ContentType, MediaMajor};
#[cfg(feature = "mock")]
pub use mock::{BackendCall, MockBackend};
pub use node::Node;
