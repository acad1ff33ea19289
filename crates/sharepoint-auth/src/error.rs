//! Error types for app-only token acquisition.

/// Result type alias for authentication operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Authentication error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP transport error (DNS, TCP, TLS, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The realm probe did not carry a `Bearer realm="..."` challenge.
    #[error("No bearer realm challenge in response from {url}")]
    MissingChallenge {
        /// URL that was probed.
        url: String,
    },

    /// A response body or header did not have the expected shape.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// The metadata document lists no `OAuth2` endpoint for the realm.
    #[error("No OAuth2 endpoint advertised for realm {realm}")]
    EndpointNotFound {
        /// Realm the metadata was fetched for.
        realm: String,
    },

    /// `OAuth2` error from the token endpoint.
    #[error("OAuth2 error: {error} - {description}")]
    OAuth {
        /// Error code (e.g., `invalid_client`).
        error: String,
        /// Human-readable description.
        description: String,
    },

    /// Non-success status with a body that is not an `OAuth2` error.
    #[error("Unexpected HTTP status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, lossily decoded.
        body: String,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// URL parsing error.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

impl Error {
    /// Creates an OAuth error from error code and description.
    #[must_use]
    pub fn oauth_error(error: impl Into<String>, description: impl Into<String>) -> Self {
        Self::OAuth {
            error: error.into(),
            description: description.into(),
        }
    }

    /// Creates a malformed-response error.
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse(message.into())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedResponse(err.to_string())
    }
}
