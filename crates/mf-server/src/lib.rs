//! HTTP front-end server for meshfront.
//!
//! This crate provides a native Rust HTTP server using axum, serving:
//! - `GET /`: the welcome page with the navigation breadcrumb
//! - `GET /{*path}`: webroot resolution rendered as a detail or list page,
//!   or image content streamed through unchanged
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use mf_backend::{ClientConfig, MeshClient};
//! use mf_server::{ServerConfig, run_server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = MeshClient::connect(ClientConfig::default()).unwrap();
//!     let config = ServerConfig {
//!         host: "127.0.0.1".to_owned(),
//!         port: 8081,
//!         ..ServerConfig::default()
//!     };
//!
//!     run_server(config, Arc::new(client)).await.unwrap();
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! Browser ──HTTP──► axum router (mf-server)
//!                        │
//!                        ├─► spawn_blocking ──► PageAssembler (mf-site)
//!                        │                          │
//!                        │                          └─► Backend (mf-backend) ──HTTP──► Mesh
//!                        │
//!                        ├─► minijinja templates ──► HTML
//!                        │
//!                        └─► binary media ──channel──► streamed body
//! ```

mod app;
mod error;
mod handlers;
mod middleware;
mod state;
mod templates;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use axum::Router;
use mf_backend::Backend;
use mf_site::PageAssembler;
use state::AppState;
use templates::Templates;

pub use error::{ServerError, TemplateError};

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Directory with template overrides (`None` uses the embedded set).
    pub templates_dir: Option<PathBuf>,
    /// Application version (mixed into `ETag`s).
    pub version: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 8081,
            templates_dir: None,
            version: String::new(),
        }
    }
}

/// Build the application router over `backend`.
///
/// Templates are loaded here, once.
///
/// # Errors
///
/// Returns [`ServerError::Template`] if a template cannot be read or parsed.
pub fn build_router(config: &ServerConfig, backend: Arc<dyn Backend>) -> Result<Router, ServerError> {
    let templates = Templates::load(config.templates_dir.as_deref())?;
    let state = Arc::new(AppState {
        assembler: PageAssembler::new(backend),
        templates,
        version: config.version.clone(),
    });
    Ok(app::create_router(state))
}

/// Run the server until Ctrl-C.
///
/// # Errors
///
/// Returns an error if templates fail to load, the address is invalid, or
/// the listener cannot be bound.
pub async fn run_server(config: ServerConfig, backend: Arc<dyn Backend>) -> Result<(), ServerError> {
    let app = build_router(&config, backend)?;

    let addr = SocketAddr::from_str(&format!("{}:{}", config.host, config.port))?;
    tracing::info!(address = %addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received, stopping server...");
}

/// Create server configuration from meshfront config.
#[must_use]
pub fn server_config_from_mf_config(config: &mf_config::Config, version: String) -> ServerConfig {
    ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        templates_dir: config.templates.dir.clone(),
        version,
    }
}
