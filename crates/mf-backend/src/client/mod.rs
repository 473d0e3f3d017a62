//! Content backend REST API client.
//!
//! Provides a sync HTTP client for the backend's REST API. The client
//! authenticates once in [`MeshClient::connect`] and attaches the resulting
//! session to every later request.

mod auth;
mod content;

use std::time::Duration;

use tracing::warn;
use ureq::Agent;
use ureq::http::Response;

use crate::error::BackendError;

pub use auth::AuthStrategy;
use auth::Session;

/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT: u64 = 30;

/// Client settings.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// REST API base URL including the API version.
    pub base_url: String,
    /// Project name prefixed to content endpoints.
    pub project: String,
    /// Name of the session cookie set by the login endpoint.
    pub session_cookie: String,
    /// Per-call timeout.
    pub timeout: Duration,
    /// Extra attempts for GET requests that fail at the transport level.
    pub retries: u32,
    /// How to authenticate.
    pub auth: AuthStrategy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api/v1".to_owned(),
            project: "demo".to_owned(),
            session_cookie: "mesh.session".to_owned(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT),
            retries: 0,
            auth: AuthStrategy::Login {
                username: "admin".to_owned(),
                password: "admin".to_owned(),
            },
        }
    }
}

/// Content backend REST API client.
///
/// The session is established once and never mutated, so a single client can
/// be shared by reference across any number of concurrent requests.
pub struct MeshClient {
    agent: Agent,
    base_url: String,
    project: String,
    retries: u32,
    session: Session,
}

impl MeshClient {
    /// Create a client and authenticate against the backend.
    ///
    /// With [`AuthStrategy::Login`] this performs the login call; with
    /// [`AuthStrategy::Embedded`] no request is made.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Unauthorized`] if the backend rejects the
    /// credentials, [`BackendError::MissingSessionCookie`] if login succeeds
    /// without setting the session cookie, and [`BackendError::HttpRequest`]
    /// if the backend cannot be reached.
    pub fn connect(config: ClientConfig) -> Result<Self, BackendError> {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(config.timeout))
            .http_status_as_error(false)
            .build()
            .into();
        let base_url = config.base_url.trim_end_matches('/').to_owned();

        let session = Session::establish(&agent, &base_url, &config.session_cookie, &config.auth)?;

        Ok(Self {
            agent,
            base_url,
            project: config.project,
            retries: config.retries,
            session,
        })
    }

    /// Endpoint path below the API base for a project-scoped resource.
    fn project_endpoint(&self, resource: &str) -> String {
        format!("{}/{}", self.project, resource)
    }

    /// Full URL for an endpoint path and query string.
    fn url(&self, endpoint: &str, query: &str) -> String {
        format!("{}/{}?{}", self.base_url, endpoint, query)
    }

    /// Issue an authenticated GET, retrying transport failures.
    ///
    /// Error statuses are never retried; they are mapped to
    /// [`BackendError`] variants with `endpoint` as the location.
    fn send_get(
        &self,
        url: &str,
        endpoint: &str,
        accept: &str,
    ) -> Result<Response<ureq::Body>, BackendError> {
        let mut attempt = 0;
        let response = loop {
            let request = self.session.authorize(self.agent.get(url)).header("Accept", accept);
            match request.call() {
                Ok(response) => break response,
                Err(err) if attempt < self.retries => {
                    attempt += 1;
                    warn!(
                        endpoint,
                        attempt,
                        error = %err,
                        "Backend request failed, retrying"
                    );
                }
                Err(err) => return Err(err.into()),
            }
        };

        check_status(response, endpoint)
    }

    /// Issue an authenticated GET and parse the body as JSON.
    fn get_json(&self, endpoint: &str, query: &str) -> Result<serde_json::Value, BackendError> {
        let url = self.url(endpoint, query);
        let response = self.send_get(&url, endpoint, "application/json")?;
        let bytes = response.into_body().read_to_vec()?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Turn error statuses into [`BackendError`]s, reading the body for details.
fn check_status(
    response: Response<ureq::Body>,
    location: &str,
) -> Result<Response<ureq::Body>, BackendError> {
    let status = response.status().as_u16();
    if status >= 400 {
        let error_body = response
            .into_body()
            .read_to_string()
            .unwrap_or_else(|_| "(unable to read error body)".to_owned());
        return Err(BackendError::from_status(status, location, error_body));
    }
    Ok(response)
}
