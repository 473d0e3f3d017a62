//! CLI error types.

use mf_backend::BackendError;
use mf_config::ConfigError;
use mf_server::ServerError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("Login to content backend failed: {0}")]
    Backend(#[from] BackendError),

    #[error("{0}")]
    Server(#[from] ServerError),

    #[error("Startup task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
