//! Binary media passthrough.
//!
//! The backend body is read on the blocking pool in fixed-size chunks and
//! forwarded over a bounded channel, so large images never sit in memory
//! whole. A read error ends the response body with that error.

use std::io::{self, ErrorKind, Read};

use axum::body::{Body, Bytes};
use axum::http::{HeaderValue, header};
use axum::response::{IntoResponse, Response};
use mf_backend::RawNode;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

/// Bytes read from the backend per chunk.
const CHUNK_SIZE: usize = 64 * 1024;

/// Chunks buffered between the reader and the client.
const CHANNEL_CAPACITY: usize = 4;

/// Stream `raw` to the client with its original content type.
pub(crate) fn stream(raw: RawNode) -> Response {
    let content_type = HeaderValue::from_str(raw.content_type.as_str())
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));

    let (tx, rx) = mpsc::channel::<io::Result<Bytes>>(CHANNEL_CAPACITY);
    let mut body = raw.body;
    tokio::task::spawn_blocking(move || {
        let mut buf = vec![0u8; CHUNK_SIZE];
        loop {
            let chunk = match body.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => Ok(Bytes::copy_from_slice(&buf[..n])),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    tracing::error!(error = %e, "Binary passthrough interrupted");
                    Err(e)
                }
            };
            let failed = chunk.is_err();
            // Receiver dropped: the client went away
            if tx.blocking_send(chunk).is_err() || failed {
                break;
            }
        }
    });

    (
        [(header::CONTENT_TYPE, content_type)],
        Body::from_stream(ReceiverStream::new(rx)),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use http_body_util::BodyExt;
    use mf_backend::ContentType;

    use super::*;

    /// Reader that yields some bytes and then fails.
    struct FailingReader {
        sent: bool,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.sent {
                return Err(io::Error::new(ErrorKind::ConnectionReset, "reset"));
            }
            self.sent = true;
            buf[..4].copy_from_slice(b"part");
            Ok(4)
        }
    }

    #[tokio::test]
    async fn test_stream_preserves_bytes_and_content_type() {
        // Larger than one chunk
        let bytes: Vec<u8> = (0..CHUNK_SIZE * 2 + 17)
            .map(|i| u8::try_from(i % 251).unwrap())
            .collect();
        let raw = RawNode::new(ContentType::parse("image/jpeg"), Cursor::new(bytes.clone()));

        let response = stream(raw);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/jpeg");

        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(body.as_ref(), bytes.as_slice());
    }

    #[tokio::test]
    async fn test_stream_keeps_content_type_parameters() {
        let raw = RawNode::new(
            ContentType::parse("image/svg+xml; charset=utf-8"),
            Cursor::new(b"<svg/>".to_vec()),
        );

        let response = stream(raw);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "image/svg+xml; charset=utf-8"
        );
    }

    #[tokio::test]
    async fn test_read_error_terminates_body() {
        let raw = RawNode::new(ContentType::parse("image/png"), FailingReader { sent: false });

        let response = stream(raw);
        assert!(response.into_body().collect().await.is_err());
    }
}
