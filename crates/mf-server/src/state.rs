//! Application state.
//!
//! Shared state for all request handlers.

use mf_site::PageAssembler;

use crate::templates::Templates;

/// Application state shared across all handlers.
pub(crate) struct AppState {
    /// Page data assembler over the content backend.
    pub(crate) assembler: PageAssembler,
    /// Page templates, loaded at startup.
    pub(crate) templates: Templates,
    /// Application version for `ETag`s.
    pub(crate) version: String,
}
