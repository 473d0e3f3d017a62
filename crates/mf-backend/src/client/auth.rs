//! Backend authentication.
//!
//! Two strategies are supported: a one-time login that yields a session
//! cookie, and credentials sent with every request as HTTP Basic auth.

use std::fmt;

use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use serde::Serialize;
use tracing::info;
use ureq::http::header::SET_COOKIE;
use ureq::{Agent, RequestBuilder};

use super::check_status;
use crate::error::BackendError;

/// How the client authenticates against the backend.
#[derive(Clone)]
pub enum AuthStrategy {
    /// Exchange credentials for a session cookie once, at connect time.
    Login {
        /// Backend user name.
        username: String,
        /// Backend password.
        password: String,
    },
    /// Send the credentials with every request.
    Embedded {
        /// Backend user name.
        username: String,
        /// Backend password.
        password: String,
    },
}

impl fmt::Debug for AuthStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (name, username) = match self {
            Self::Login { username, .. } => ("Login", username),
            Self::Embedded { username, .. } => ("Embedded", username),
        };
        f.debug_struct(name)
            .field("username", username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Login request body.
#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

/// An established backend session.
///
/// Holds the ready-to-send header value; created once and read-only after.
pub(crate) enum Session {
    /// `Cookie` header value (`name=value`).
    Cookie(String),
    /// `Authorization` header value (`Basic ...`).
    Basic(String),
}

impl Session {
    /// Establish a session using the given strategy.
    pub(crate) fn establish(
        agent: &Agent,
        base_url: &str,
        cookie_name: &str,
        strategy: &AuthStrategy,
    ) -> Result<Self, BackendError> {
        match strategy {
            AuthStrategy::Login { username, password } => {
                let value = login(agent, base_url, cookie_name, username, password)?;
                info!(username = %username, "Logged in to content backend");
                Ok(Self::Cookie(format!("{cookie_name}={value}")))
            }
            AuthStrategy::Embedded { username, password } => {
                info!(username = %username, "Using embedded backend credentials");
                Ok(Self::Basic(basic_auth(username, password)))
            }
        }
    }

    /// Attach the session to a request.
    pub(crate) fn authorize<B>(&self, request: RequestBuilder<B>) -> RequestBuilder<B> {
        match self {
            Self::Cookie(cookie) => request.header("Cookie", cookie.as_str()),
            Self::Basic(authorization) => request.header("Authorization", authorization.as_str()),
        }
    }
}

/// Log in and return the session cookie value.
fn login(
    agent: &Agent,
    base_url: &str,
    cookie_name: &str,
    username: &str,
    password: &str,
) -> Result<String, BackendError> {
    let url = format!("{base_url}/auth/login");

    let response = agent
        .post(&url)
        .header("Accept", "application/json")
        .send_json(&LoginRequest { username, password })?;
    let response = check_status(response, "auth/login")?;

    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|header| header.to_str().ok())
        .find_map(|header| parse_set_cookie(header, cookie_name))
        .map(str::to_owned)
        .ok_or_else(|| BackendError::MissingSessionCookie(cookie_name.to_owned()))
}

/// Extract the value of cookie `name` from a `Set-Cookie` header.
///
/// Returns `None` for other cookies and for empty values (a cleared cookie).
fn parse_set_cookie<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    let pair = header.split(';').next()?;
    let (cookie_name, value) = pair.split_once('=')?;
    if cookie_name.trim() != name {
        return None;
    }
    let value = value.trim().trim_matches('"');
    (!value.is_empty()).then_some(value)
}

/// Build an HTTP Basic `Authorization` header value.
fn basic_auth(username: &str, password: &str) -> String {
    let token = BASE64_STANDARD.encode(format!("{username}:{password}"));
    format!("Basic {token}")
}
