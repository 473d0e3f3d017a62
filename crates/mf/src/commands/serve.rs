//! `mf serve` command implementation.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use mf_backend::{AuthStrategy, ClientConfig, MeshClient};
use mf_config::{AuthMethod, CliSettings, Config, Credentials};
use mf_server::{run_server, server_config_from_mf_config};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the serve command.
#[derive(Args)]
pub(crate) struct ServeArgs {
    /// Path to configuration file (default: auto-discover meshfront.toml).
    #[arg(short, long, env = "MESHFRONT_CONFIG")]
    config: Option<PathBuf>,

    /// Host to bind to (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind to (overrides config).
    #[arg(short, long)]
    port: Option<u16>,

    /// Content backend API base URL (overrides config).
    #[arg(long)]
    backend_url: Option<String>,

    /// Directory with template overrides (overrides config).
    #[arg(long)]
    templates_dir: Option<PathBuf>,

    /// Enable verbose output (request and backend logs).
    #[arg(short, long)]
    pub verbose: bool,
}

impl ServeArgs {
    /// Execute the serve command.
    ///
    /// Logs in to the backend before binding the listener, so a rejected
    /// login ends the process without ever accepting a request.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails, the backend login fails, or
    /// the server fails to start.
    pub(crate) async fn execute(self, version: &str) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            host: self.host,
            port: self.port,
            backend_url: self.backend_url,
            templates_dir: self.templates_dir,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let client_config = client_config_from_mf_config(&config)?;

        output.info(&format!(
            "Content backend: {} (project {})",
            client_config.base_url, client_config.project
        ));
        if let Some(dir) = &config.templates.dir {
            output.info(&format!("Template overrides: {}", dir.display()));
        }

        let client = tokio::task::spawn_blocking(move || MeshClient::connect(client_config))
            .await?
            .inspect_err(|e| tracing::error!(error = %e, "Backend login failed"))?;
        tracing::info!(base_url = %config.backend.base_url, "Connected to content backend");

        output.highlight(&format!(
            "Serving on http://{}:{}",
            config.server.host, config.server.port
        ));

        let server_config = server_config_from_mf_config(&config, version.to_owned());
        run_server(server_config, Arc::new(client)).await?;

        Ok(())
    }
}

/// Build the backend client configuration from meshfront config.
fn client_config_from_mf_config(config: &Config) -> Result<ClientConfig, CliError> {
    let Credentials { username, password } = config.require_credentials()?;
    let auth = match config.backend.auth.strategy {
        AuthMethod::Login => AuthStrategy::Login { username, password },
        AuthMethod::Embedded => AuthStrategy::Embedded { username, password },
    };

    Ok(ClientConfig {
        base_url: config.backend.base_url.clone(),
        project: config.backend.project.clone(),
        session_cookie: config.backend.session_cookie.clone(),
        timeout: Duration::from_secs(config.backend.timeout_secs),
        retries: config.backend.retries,
        auth,
    })
}
