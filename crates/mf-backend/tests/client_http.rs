//! `MeshClient` against a stub backend served over real HTTP.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::extract::{Path, RawQuery};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use mf_backend::{AuthStrategy, Backend, BackendError, ClientConfig, MeshClient};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

const SESSION: &str = "s3ss10n";
const BASIC_ADMIN: &str = "Basic YWRtaW46YWRtaW4=";
const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n\x00\x00\x00\rIHDR";

fn authorized(headers: &HeaderMap) -> bool {
    let cookie_ok = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|c| {
            c.split(';')
                .any(|pair| pair.trim() == format!("mesh.session={SESSION}"))
        });
    let basic_ok = headers
        .get(header::AUTHORIZATION)
        .is_some_and(|v| v.as_bytes() == BASIC_ADMIN.as_bytes());
    cookie_ok || basic_ok
}

async fn login(Json(body): Json<Value>) -> Response {
    if body["username"] == "admin" && body["password"] == "admin" {
        (
            [(
                header::SET_COOKIE,
                format!("mesh.session={SESSION}; Path=/; HttpOnly"),
            )],
            Json(json!({"message": "OK"})),
        )
            .into_response()
    } else {
        StatusCode::UNAUTHORIZED.into_response()
    }
}

async fn login_without_cookie() -> Json<Value> {
    Json(json!({"message": "OK"}))
}

async fn navroot(headers: HeaderMap, RawQuery(query): RawQuery) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    assert_eq!(query.as_deref(), Some("maxDepth=1&resolveLinks=short"));
    Json(json!({
        "uuid": "root",
        "root": {
            "uuid": "root",
            "children": [
                {"uuid": "nav-1", "fields": {"name": "Cars"}},
                {"uuid": "nav-2", "fields": {"name": "Bikes"}}
            ]
        }
    }))
    .into_response()
}

async fn webroot(headers: HeaderMap, Path(path): Path<String>) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    match path.as_str() {
        "cars/sedan-42" => Json(json!({
            "uuid": "abc-1",
            "schema": {"name": "vehicle"},
            "name": "Sedan 42"
        }))
        .into_response(),
        "images/logo.png" => ([(header::CONTENT_TYPE, "image/png")], PNG_BYTES).into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn children(
    headers: HeaderMap,
    Path(uuid): Path<String>,
    RawQuery(query): RawQuery,
) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    assert_eq!(query.as_deref(), Some("expandAll=true&resolveLinks=short"));
    Json(json!({
        "data": [
            {"uuid": format!("{uuid}-a"), "schema": {"name": "vehicle"}},
            {"uuid": format!("{uuid}-b"), "schema": {"name": "vehicle"}}
        ]
    }))
    .into_response()
}

fn backend_router() -> Router {
    Router::new()
        .route("/api/v1/auth/login", post(login))
        .route("/api/v1/demo/navroot/", get(navroot))
        .route("/api/v1/demo/webroot/{*path}", get(webroot))
        .route("/api/v1/demo/nodes/{uuid}/children", get(children))
}

/// Serve `router` on an ephemeral port and return the API base URL.
async fn spawn_backend(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}/api/v1/")
}

fn login_config(base_url: String, password: &str) -> ClientConfig {
    ClientConfig {
        base_url,
        timeout: Duration::from_secs(5),
        auth: AuthStrategy::Login {
            username: "admin".to_owned(),
            password: password.to_owned(),
        },
        ..ClientConfig::default()
    }
}

fn embedded_config(base_url: String, retries: u32) -> ClientConfig {
    ClientConfig {
        base_url,
        timeout: Duration::from_secs(5),
        retries,
        auth: AuthStrategy::Embedded {
            username: "admin".to_owned(),
            password: "admin".to_owned(),
        },
        ..ClientConfig::default()
    }
}

/// Raw HTTP backend that closes the first `drops` connections after reading
/// the request, then answers every request with a navigation root.
///
/// Returns the API base URL and the number of accepted connections.
fn spawn_flaky_backend(drops: usize) -> (String, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let accepted = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&accepted);

    std::thread::spawn(move || {
        for stream in listener.incoming() {
            let Ok(mut stream) = stream else { break };
            let seen = counter.fetch_add(1, Ordering::SeqCst);

            // Consume the request head
            let mut reader = BufReader::new(&mut stream);
            let mut line = String::new();
            while reader.read_line(&mut line).is_ok_and(|n| n > 0) && line != "\r\n" {
                line.clear();
            }
            if seen < drops {
                continue;
            }

            let body = json!({"root": {"children": [{"uuid": "nav-1"}]}}).to_string();
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = stream.write_all(response.as_bytes());
        }
    });

    (format!("http://{addr}/api/v1/"), accepted)
}

async fn connect(config: ClientConfig) -> Result<MeshClient, BackendError> {
    tokio::task::spawn_blocking(move || MeshClient::connect(config))
        .await
        .unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn test_login_then_fetch_breadcrumb() {
    let base_url = spawn_backend(backend_router()).await;
    let client = connect(login_config(base_url, "admin")).await.unwrap();

    let nav = tokio::task::spawn_blocking(move || client.fetch_breadcrumb())
        .await
        .unwrap()
        .unwrap();

    let uuids: Vec<_> = nav.iter().filter_map(|n| n.uuid()).collect();
    assert_eq!(uuids, vec!["nav-1", "nav-2"]);
    assert_eq!(nav[0].get_str_at_path("fields.name"), Some("Cars"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_login_rejected() {
    let base_url = spawn_backend(backend_router()).await;
    let err = connect(login_config(base_url, "wrong"))
        .await
        .err()
        .unwrap();

    assert!(matches!(err, BackendError::Unauthorized { status: 401 }));
    assert!(err.is_auth());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_login_without_session_cookie() {
    let router = Router::new().route("/api/v1/auth/login", post(login_without_cookie));
    let base_url = spawn_backend(router).await;
    let err = connect(login_config(base_url, "admin"))
        .await
        .err()
        .unwrap();

    assert!(matches!(err, BackendError::MissingSessionCookie(ref name) if name == "mesh.session"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unreachable_backend() {
    // Bind and drop to get a port nobody listens on
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = connect(login_config(format!("http://{addr}/api/v1"), "admin"))
        .await
        .err()
        .unwrap();

    assert!(matches!(err, BackendError::HttpRequest(_)));
    assert!(!err.is_auth());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_fetch_json_node() {
    let base_url = spawn_backend(backend_router()).await;
    let client = connect(login_config(base_url, "admin")).await.unwrap();

    let raw = tokio::task::spawn_blocking(move || client.fetch_node("/cars/sedan-42"))
        .await
        .unwrap()
        .unwrap();

    assert!(!raw.content_type.is_binary_media());
    assert!(raw.content_type.as_str().starts_with("application/json"));

    let node = raw.into_node().unwrap();
    assert_eq!(node.uuid(), Some("abc-1"));
    assert_eq!(node.schema_name(), Some("vehicle"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_fetch_binary_node_is_byte_identical() {
    let base_url = spawn_backend(backend_router()).await;
    let client = connect(login_config(base_url, "admin")).await.unwrap();

    let bytes = tokio::task::spawn_blocking(move || {
        let mut raw = client.fetch_node("/images/logo.png").unwrap();
        assert_eq!(raw.content_type.as_str(), "image/png");
        assert!(raw.content_type.is_binary_media());

        let mut bytes = Vec::new();
        raw.body.read_to_end(&mut bytes).unwrap();
        bytes
    })
    .await
    .unwrap();

    assert_eq!(bytes, PNG_BYTES);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_fetch_missing_node() {
    let base_url = spawn_backend(backend_router()).await;
    let client = connect(login_config(base_url, "admin")).await.unwrap();

    let err = tokio::task::spawn_blocking(move || client.fetch_node("/no/such/page"))
        .await
        .unwrap()
        .unwrap_err();

    assert!(err.is_not_found());
    assert!(err.to_string().contains("demo/webroot/no/such/page"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_fetch_children() {
    let base_url = spawn_backend(backend_router()).await;
    let client = connect(login_config(base_url, "admin")).await.unwrap();

    let children = tokio::task::spawn_blocking(move || client.fetch_children("cat-1"))
        .await
        .unwrap()
        .unwrap();

    let uuids: Vec<_> = children.iter().filter_map(|n| n.uuid()).collect();
    assert_eq!(uuids, vec!["cat-1-a", "cat-1-b"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_embedded_credentials_skip_login() {
    // No login route: any login attempt would 404
    let router = Router::new().route("/api/v1/demo/navroot/", get(navroot));
    let base_url = spawn_backend(router).await;
    let config = ClientConfig {
        base_url,
        auth: AuthStrategy::Embedded {
            username: "admin".to_owned(),
            password: "admin".to_owned(),
        },
        ..ClientConfig::default()
    };

    let client = connect(config).await.unwrap();
    let nav = tokio::task::spawn_blocking(move || client.fetch_breadcrumb())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(nav.len(), 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rejected_session_is_auth_error() {
    let router = Router::new().route("/api/v1/demo/navroot/", get(navroot));
    let base_url = spawn_backend(router).await;
    let config = ClientConfig {
        base_url,
        auth: AuthStrategy::Embedded {
            username: "admin".to_owned(),
            password: "nope".to_owned(),
        },
        ..ClientConfig::default()
    };

    let client = connect(config).await.unwrap();
    let err = tokio::task::spawn_blocking(move || client.fetch_breadcrumb())
        .await
        .unwrap()
        .unwrap_err();

    assert!(err.is_auth());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_fetch_children_encodes_uuid() {
    let base_url = spawn_backend(backend_router()).await;
    let client = connect(login_config(base_url, "admin")).await.unwrap();

    let children = tokio::task::spawn_blocking(move || client.fetch_children("a/b"))
        .await
        .unwrap()
        .unwrap();

    // The stub matched a single path segment and decoded it back
    let uuids: Vec<_> = children.iter().filter_map(|n| n.uuid()).collect();
    assert_eq!(uuids, vec!["a/b-a", "a/b-b"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_dropped_connection_is_retried() {
    let (base_url, accepted) = spawn_flaky_backend(1);
    let client = connect(embedded_config(base_url, 1)).await.unwrap();

    let nav = tokio::task::spawn_blocking(move || client.fetch_breadcrumb())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(nav.len(), 1);
    assert_eq!(accepted.load(Ordering::SeqCst), 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_dropped_connection_without_retries_fails() {
    let (base_url, accepted) = spawn_flaky_backend(1);
    let client = connect(embedded_config(base_url, 0)).await.unwrap();

    let err = tokio::task::spawn_blocking(move || client.fetch_breadcrumb())
        .await
        .unwrap()
        .unwrap_err();

    assert!(matches!(err, BackendError::HttpRequest(_)));
    assert_eq!(accepted.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_error_status_is_not_retried() {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);
    let router = Router::new().route(
        "/api/v1/demo/navroot/",
        get(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }
        }),
    );
    let base_url = spawn_backend(router).await;
    let client = connect(embedded_config(base_url, 2)).await.unwrap();

    let err = tokio::task::spawn_blocking(move || client.fetch_breadcrumb())
        .await
        .unwrap()
        .unwrap_err();

    assert!(matches!(err, BackendError::HttpResponse { status: 500, ref body } if body == "boom"));
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_login_is_not_retried() {
    let (base_url, accepted) = spawn_flaky_backend(usize::MAX);
    let config = ClientConfig {
        retries: 3,
        ..login_config(base_url, "admin")
    };

    let err = connect(config).await.err().unwrap();

    assert!(matches!(err, BackendError::HttpRequest(_)));
    assert_eq!(accepted.load(Ordering::SeqCst), 1);
}
