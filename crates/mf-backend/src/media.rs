//! Content-type parsing.
//!
//! The front-end only ever branches on the MIME major type, so the parsed
//! form is a closed [`MediaMajor`] set plus the raw header value, which is
//! forwarded unchanged for binary passthrough.

use std::fmt;

/// MIME major (top-level) type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaMajor {
    Application,
    Audio,
    Font,
    Image,
    Message,
    Model,
    Multipart,
    Text,
    Video,
    /// Missing header or a major type outside the registered set.
    Unknown,
}

impl MediaMajor {
    fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "application" => Self::Application,
            "audio" => Self::Audio,
            "font" => Self::Font,
            "image" => Self::Image,
            "message" => Self::Message,
            "model" => Self::Model,
            "multipart" => Self::Multipart,
            "text" => Self::Text,
            "video" => Self::Video,
            _ => Self::Unknown,
        }
    }
}

/// A response content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentType {
    raw: String,
    major: MediaMajor,
}

impl ContentType {
    /// Parse a `Content-Type` header value.
    ///
    /// Parameters (`; charset=...`) are kept in the raw value but ignored
    /// for classification.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let essence = raw.split(';').next().unwrap_or_default().trim();
        let major = essence
            .split_once('/')
            .map_or(MediaMajor::Unknown, |(major, _)| MediaMajor::parse(major.trim()));

        Self {
            raw: raw.trim().to_owned(),
            major,
        }
    }

    /// Content type for responses without a `Content-Type` header.
    #[must_use]
    pub fn missing() -> Self {
        Self {
            raw: String::new(),
            major: MediaMajor::Unknown,
        }
    }

    /// The header value as received.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The MIME major type.
    #[must_use]
    pub fn major(&self) -> MediaMajor {
        self.major
    }

    /// Whether the body is binary media that must be passed through untouched.
    #[must_use]
    pub fn is_binary_media(&self) -> bool {
        self.major == MediaMajor::Image
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
