//! Token endpoint discovery from the ACS metadata document.

use crate::error::{Error, Result};
use reqwest::Client;
use serde::Deserialize;
use url::Url;

/// Default ACS metadata document location.
pub const DEFAULT_METADATA_URL: &str = "https://accounts.accesscontrol.windows.net/metadata/json/1";

const OAUTH2_PROTOCOL: &str = "OAuth2";

/// One endpoint entry in the metadata document.
#[derive(Debug, Clone, Deserialize)]
pub struct EndpointDescriptor {
    /// Protocol tag (e.g., `OAuth2`).
    #[serde(default)]
    pub protocol: String,
    /// Endpoint location.
    #[serde(default)]
    pub location: String,
}

/// Realm metadata document.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RealmMetadata {
    /// Advertised endpoints.
    #[serde(default)]
    pub endpoints: Vec<EndpointDescriptor>,
}

impl RealmMetadata {
    /// Returns the location of the first `OAuth2` endpoint.
    #[must_use]
    pub fn oauth2_location(&self) -> Option<&str> {
        self.endpoints
            .iter()
            .find(|e| e.protocol == OAUTH2_PROTOCOL)
            .map(|e| e.location.as_str())
    }
}

/// Builds the metadata URL for a realm.
///
/// # Errors
///
/// Returns an error if `metadata_url` is not a valid URL.
pub fn metadata_url(metadata_url: &str, realm: &str) -> Result<Url> {
    let mut url = Url::parse(metadata_url)?;
    url.query_pairs_mut().append_pair("realm", realm);
    Ok(url)
}

/// Picks the token endpoint out of a metadata document body.
///
/// # Errors
///
/// Returns [`Error::MalformedResponse`] if the body is not valid metadata,
/// or [`Error::EndpointNotFound`] if it lists no usable `OAuth2` endpoint.
pub fn select_token_endpoint(body: &[u8], realm: &str) -> Result<Url> {
    let metadata: RealmMetadata = serde_json::from_slice(body)?;
    let location = metadata
        .oauth2_location()
        .filter(|l| !l.is_empty())
        .ok_or_else(|| Error::EndpointNotFound {
            realm: realm.to_string(),
        })?;
    Url::parse(location)
        .map_err(|e| Error::malformed(format!("bad OAuth2 location {location:?}: {e}")))
}

/// Resolves the `OAuth2` token endpoint for a realm.
///
/// # Errors
///
/// Returns [`Error::Http`] on transport failure, [`Error::Status`] on a
/// non-success response, and the errors of [`select_token_endpoint`].
pub async fn resolve_token_endpoint(http: &Client, base: &str, realm: &str) -> Result<Url> {
    let url = metadata_url(base, realm)?;

    let response = http.get(url).send().await?;
    let status = response.status();
    let body = response.bytes().await?;

    if !status.is_success() {
        return Err(Error::Status {
            status: status.as_u16(),
            body: String::from_utf8_lossy(&body).into_owned(),
        });
    }

    let endpoint = select_token_endpoint(&body, realm)?;
    tracing::debug!(%realm, endpoint = %endpoint, "Resolved token endpoint");
    Ok(endpoint)
}
