//! Page endpoints.
//!
//! `GET /` renders the welcome page. Every other path is resolved against
//! the backend webroot and rendered as a detail or list page, or streamed
//! through when it is binary media.

use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, Uri, header};
use axum::response::{Html, IntoResponse, Response};
use md5::{Digest, Md5};
use percent_encoding::percent_decode_str;
use mf_site::{Page, ViewModel};

use crate::error::ServerError;
use crate::handlers::media;
use crate::state::AppState;

/// Handle GET /.
pub(crate) async fn get_index(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ServerError> {
    let task_state = Arc::clone(&state);
    let view = tokio::task::spawn_blocking(move || task_state.assembler.index_view())
        .await?
        .map_err(|e| ServerError::from_site("/", e))?;

    render_view(&state, &view, &headers)
}

/// Handle GET /{*path}.
///
/// The path is taken from the request URI as received, still
/// percent-encoded, and forwarded to the backend unchanged. Paths with
/// `.` or `..` segments are answered with 404 without a backend call.
pub(crate) async fn get_page(
    State(state): State<Arc<AppState>>,
    uri: Uri,
    headers: HeaderMap,
) -> Result<Response, ServerError> {
    let path = uri.path().to_owned();
    if has_dot_segment(&path) {
        return Err(ServerError::PageNotFound(path));
    }

    let task_state = Arc::clone(&state);
    let task_path = path.clone();
    let page = tokio::task::spawn_blocking(move || task_state.assembler.page(&task_path))
        .await?
        .map_err(|e| ServerError::from_site(&path, e))?;

    match page {
        Page::Binary(raw) => Ok(media::stream(raw)),
        Page::View(view) => render_view(&state, &view, &headers),
    }
}

/// Whether any segment of `path` is `.` or `..`, also when percent-encoded.
fn has_dot_segment(path: &str) -> bool {
    path.split('/').any(|segment| {
        let decoded = percent_decode_str(segment).decode_utf8_lossy();
        decoded == "." || decoded == ".."
    })
}

/// Render `view` to HTML, answering conditional requests with 304.
fn render_view(
    state: &AppState,
    view: &ViewModel,
    headers: &HeaderMap,
) -> Result<Response, ServerError> {
    let html = state.templates.render(view)?;
    let etag = compute_etag(&state.version, &html);

    // Check If-None-Match header for conditional request
    if let Some(if_none_match) = headers.get(header::IF_NONE_MATCH)
        && if_none_match.as_bytes() == etag.as_bytes()
    {
        return Ok((StatusCode::NOT_MODIFIED, [(header::ETAG, etag)]).into_response());
    }

    Ok((
        [
            (header::ETAG, etag),
            (header::CACHE_CONTROL, "no-cache".to_owned()),
        ],
        Html(html),
    )
        .into_response())
}

/// Compute `ETag` from version and content.
///
/// Uses MD5 hash truncated to 64 bits (16 hex chars).
fn compute_etag(version: &str, content: &str) -> String {
    let hash = Md5::digest(format!("{version}:{content}").as_bytes());
    format!("\"{}\"", &hex::encode(hash)[..16])
}
