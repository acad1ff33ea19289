//! Error types for SharePoint REST calls.

use bytes::Bytes;
use std::borrow::Cow;
use thiserror::Error;

/// Errors that can occur when talking to a SharePoint site.
#[derive(Debug, Error)]
pub enum Error {
    /// Obtaining an access token failed.
    #[error("Authentication failed: {0}")]
    Auth(#[from] sharepoint_auth::Error),

    /// The REST call did not complete.
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The site answered with a non-success status.
    #[error("Unexpected HTTP status {status} from {url}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Requested URL.
        url: String,
        /// Raw response body.
        body: Bytes,
    },

    /// Response body could not be decoded.
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// URL parsing error.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

impl Error {
    /// Returns the HTTP status of a [`Error::Status`] error.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the response body of a [`Error::Status`] error as text.
    #[must_use]
    pub fn body_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Self::Status { body, .. } => Some(String::from_utf8_lossy(body)),
            _ => None,
        }
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
