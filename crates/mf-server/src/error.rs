//! Error types for the HTTP server.

use std::path::PathBuf;

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

/// Error loading the template set.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// An override file exists but cannot be read.
    #[error("Failed to read template {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A template does not parse.
    #[error("Invalid template {name}: {source}")]
    Syntax {
        name: String,
        #[source]
        source: minijinja::Error,
    },
}

/// Server error type.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The backend has no node at the requested path.
    #[error("Page not found: {0}")]
    PageNotFound(String),

    /// Resolving or assembling the page failed.
    #[error("Failed to assemble {path}: {source}")]
    Site {
        path: String,
        #[source]
        source: mf_site::SiteError,
    },

    /// Rendering a template failed.
    #[error("Render error: {0}")]
    Render(#[from] minijinja::Error),

    /// A blocking task panicked or was cancelled.
    #[error("Request task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// Template set could not be loaded.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// Invalid listen address.
    #[error("Invalid address: {0}")]
    Address(#[from] std::net::AddrParseError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServerError {
    /// Classify a site error for `path`.
    pub(crate) fn from_site(path: &str, source: mf_site::SiteError) -> Self {
        if source.is_not_found() {
            Self::PageNotFound(path.to_owned())
        } else {
            Self::Site {
                path: path.to_owned(),
                source,
            }
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::PageNotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(error = %self, "Request failed");
        }

        let reason = status.canonical_reason().unwrap_or("Error");
        let body = format!(
            "<!DOCTYPE html>\n<html><head><title>{code} {reason}</title></head>\
             <body><h1>{code} {reason}</h1></body></html>\n",
            code = status.as_u16(),
        );
        (status, Html(body)).into_response()
    }
}
