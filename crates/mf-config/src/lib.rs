//! Configuration management for meshfront.
//!
//! Parses `meshfront.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `server.host`
//! - `backend.base_url`
//! - `backend.auth.username`
//! - `backend.auth.password`

mod expand;

use percent_encoding::percent_decode_str;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override server host.
    pub host: Option<String>,
    /// Override server port.
    pub port: Option<u16>,
    /// Override backend API base URL.
    pub backend_url: Option<String>,
    /// Override template directory.
    pub templates_dir: Option<PathBuf>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "meshfront.toml";

/// Upper bound for `backend.retries`.
const MAX_RETRIES: u32 = 5;

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Content backend configuration.
    pub backend: BackendConfig,
    /// Template configuration.
    pub templates: TemplatesConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Server configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 8081,
        }
    }
}

/// Content backend configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// REST API base URL including the API version (e.g. `http://localhost:8080/api/v1`).
    pub base_url: String,
    /// Project name used as the path prefix for content endpoints.
    pub project: String,
    /// Name of the session cookie set by the login endpoint.
    pub session_cookie: String,
    /// Per-call timeout in seconds.
    pub timeout_secs: u64,
    /// Extra attempts for GET requests that fail at the transport level.
    pub retries: u32,
    /// Authentication settings.
    pub auth: AuthConfig,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api/v1".to_owned(),
            project: "demo".to_owned(),
            session_cookie: "mesh.session".to_owned(),
            timeout_secs: 30,
            retries: 0,
            auth: AuthConfig::default(),
        }
    }
}

/// How the front-end authenticates against the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMethod {
    /// Exchange credentials for a session cookie once at startup.
    #[default]
    Login,
    /// Send the credentials with every request (HTTP Basic).
    Embedded,
}

/// Authentication configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Authentication method.
    pub strategy: AuthMethod,
    /// Backend user name.
    pub username: Option<String>,
    /// Backend password.
    pub password: Option<String>,
}

/// Validated backend credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Backend user name.
    pub username: String,
    /// Backend password.
    pub password: String,
}

/// Template configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TemplatesConfig {
    /// Directory with template overrides (relative to the config file).
    pub dir: Option<PathBuf>,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`backend.auth.password`").
        field: String,
        /// Error message (e.g., "${`MESH_PASSWORD`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

/// Split `user:password@` userinfo out of a URL.
///
/// Returns the URL without userinfo and the percent-decoded credentials,
/// if present.
fn split_userinfo(url: &str) -> (String, Option<Credentials>) {
    let Some((scheme, rest)) = url.split_once("://") else {
        return (url.to_owned(), None);
    };
    let authority_end = rest.find('/').unwrap_or(rest.len());
    let (authority, path) = rest.split_at(authority_end);
    let Some((userinfo, host)) = authority.rsplit_once('@') else {
        return (url.to_owned(), None);
    };

    let decode = |s: &str| percent_decode_str(s).decode_utf8_lossy().into_owned();
    let (username, password) = userinfo.split_once(':').unwrap_or((userinfo, ""));
    let credentials = Credentials {
        username: decode(username),
        password: decode(password),
    };

    (format!("{scheme}://{host}{path}"), Some(credentials))
}

impl BackendConfig {
    /// Move credentials embedded in `base_url` into the auth section.
    ///
    /// Explicit `auth.username`/`auth.password` values win over embedded ones.
    fn absorb_url_credentials(&mut self) {
        let (url, credentials) = split_userinfo(&self.base_url);
        self.base_url = url;
        if let Some(credentials) = credentials {
            if self.auth.username.is_none() {
                self.auth.username = Some(credentials.username);
            }
            if self.auth.password.is_none() {
                self.auth.password = Some(credentials.password);
            }
        }
    }
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `meshfront.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(host) = &settings.host {
            self.server.host.clone_from(host);
        }
        if let Some(port) = settings.port {
            self.server.port = port;
        }
        if let Some(backend_url) = &settings.backend_url {
            self.backend.base_url.clone_from(backend_url);
            self.backend.absorb_url_credentials();
        }
        if let Some(templates_dir) = &settings.templates_dir {
            self.templates.dir = Some(templates_dir.clone());
        }
    }

    /// Get validated backend credentials.
    ///
    /// Both authentication methods need a user name and password; they are
    /// taken from `[backend.auth]` or from userinfo embedded in `base_url`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if either value is missing or empty.
    pub fn require_credentials(&self) -> Result<Credentials, ConfigError> {
        let username = self.backend.auth.username.as_deref().ok_or_else(|| {
            ConfigError::Validation("backend.auth.username must be set".into())
        })?;
        let password = self.backend.auth.password.as_deref().ok_or_else(|| {
            ConfigError::Validation("backend.auth.password must be set".into())
        })?;
        require_non_empty(username, "backend.auth.username")?;
        require_non_empty(password, "backend.auth.password")?;

        Ok(Credentials {
            username: username.to_owned(),
            password: password.to_owned(),
        })
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before anything else looks at values
        config.expand_env_vars()?;
        config.backend.absorb_url_credentials();

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Checks that all required fields are properly set and contain valid values.
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_backend()?;
        Ok(())
    }

    /// Validate server configuration.
    fn validate_server(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.server.host, "server.host")?;

        // Port 0 is technically valid (OS assigns a random port), but it's
        // unlikely to be intentional in a config file
        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "server.port cannot be 0".to_owned(),
            ));
        }

        Ok(())
    }

    /// Validate backend configuration.
    fn validate_backend(&self) -> Result<(), ConfigError> {
        let backend = &self.backend;
        require_non_empty(&backend.base_url, "backend.base_url")?;
        require_http_url(&backend.base_url, "backend.base_url")?;
        require_non_empty(&backend.project, "backend.project")?;
        require_non_empty(&backend.session_cookie, "backend.session_cookie")?;

        if backend.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "backend.timeout_secs must be greater than 0".to_owned(),
            ));
        }
        if backend.retries > MAX_RETRIES {
            return Err(ConfigError::Validation(format!(
                "backend.retries cannot exceed {MAX_RETRIES}"
            )));
        }

        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.server.host = expand::expand_env(&self.server.host, "server.host")?;
        self.backend.base_url = expand::expand_env(&self.backend.base_url, "backend.base_url")?;

        let auth = &mut self.backend.auth;
        if let Some(ref username) = auth.username {
            auth.username = Some(expand::expand_env(username, "backend.auth.username")?);
        }
        if let Some(ref password) = auth.password {
            auth.password = Some(expand::expand_env(password, "backend.auth.password")?);
        }

        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        if let Some(dir) = self.templates.dir.take() {
            self.templates.dir = Some(config_dir.join(dir));
        }
    }
}
