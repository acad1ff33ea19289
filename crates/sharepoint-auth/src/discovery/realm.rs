//! Realm discovery via an unauthenticated challenge probe.

use crate::error::{Error, Result};
use reqwest::Client;
use reqwest::header::{AUTHORIZATION, WWW_AUTHENTICATE};
use url::Url;

const REALM_MARKER: &str = "Bearer realm=\"";

/// Endpoint probed to provoke the bearer challenge.
const PROBE_PATH: &str = "vti_bin/client.svc";

/// Builds the probe URL for a site.
///
/// # Errors
///
/// Returns an error if the joined URL is invalid.
pub fn probe_url(site: &Url) -> Result<Url> {
    let base = site.as_str().trim_end_matches('/');
    Ok(Url::parse(&format!("{base}/{PROBE_PATH}"))?)
}

/// Extracts the realm from a `www-authenticate` header value.
///
/// Returns `Ok(None)` when the header carries no bearer realm, so callers can
/// try the next challenge.
///
/// # Errors
///
/// Returns [`Error::MalformedResponse`] if the realm value is not terminated
/// by a closing quote or is empty.
pub fn parse_realm(header: &str) -> Result<Option<String>> {
    let Some(start) = header.find(REALM_MARKER) else {
        return Ok(None);
    };
    let rest = &header[start + REALM_MARKER.len()..];
    let end = rest
        .find('"')
        .ok_or_else(|| Error::malformed("unterminated realm in www-authenticate header"))?;
    let realm = &rest[..end];
    if realm.is_empty() {
        return Err(Error::malformed("empty realm in www-authenticate header"));
    }
    Ok(Some(realm.to_string()))
}

/// Picks the first realm named across several `www-authenticate` values.
///
/// Malformed values are skipped while later ones are still tried.
///
/// # Errors
///
/// Returns the first [`Error::MalformedResponse`] seen if no value yields a
/// realm.
pub fn realm_from_challenges<'a>(
    values: impl IntoIterator<Item = &'a str>,
) -> Result<Option<String>> {
    let mut malformed = None;
    for value in values {
        match parse_realm(value) {
            Ok(Some(realm)) => return Ok(Some(realm)),
            Ok(None) => {}
            Err(e) => {
                tracing::debug!(error = %e, "Skipping malformed challenge");
                malformed.get_or_insert(e);
            }
        }
    }
    malformed.map_or(Ok(None), Err)
}

/// Resolves the authentication realm for a SharePoint site.
///
/// Sends a POST with an empty bearer token so the site answers with a 401
/// challenge naming its realm. The response status is not checked.
///
/// # Errors
///
/// Returns [`Error::Http`] on transport failure and
/// [`Error::MissingChallenge`] when no challenge names a realm.
pub async fn resolve_realm(http: &Client, site: &Url) -> Result<String> {
    let url = probe_url(site)?;

    let response = http
        .post(url.clone())
        .header(AUTHORIZATION, "Bearer ")
        .send()
        .await?;

    let challenges = response
        .headers()
        .get_all(WWW_AUTHENTICATE)
        .iter()
        .filter_map(|value| value.to_str().ok());

    let Some(realm) = realm_from_challenges(challenges)? else {
        return Err(Error::MissingChallenge {
            url: url.to_string(),
        });
    };
    tracing::debug!(%realm, site = %site, "Resolved realm");
    Ok(realm)
}
