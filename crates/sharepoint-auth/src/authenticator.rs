//! Cached app-only token acquisition.

use crate::credentials::Credentials;
use crate::discovery::{self, DEFAULT_METADATA_URL};
use crate::error::{Error, Result};
use crate::principal;
use crate::token::{AccessToken, ErrorResponse};
use reqwest::Client;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use url::Url;

#[derive(Debug, Default)]
struct TokenState {
    realm: Option<String>,
    token: Option<Arc<AccessToken>>,
}

/// Acquires and caches app-only access tokens for one site.
///
/// Holds at most one token. A cached token is handed out until it expires;
/// after that the next caller runs the acquisition protocol:
///
/// 1. resolve the site realm (once, then cached)
/// 2. resolve the token endpoint for the realm
/// 3. POST a client-credentials grant to it
///
/// The state sits behind an async mutex, so concurrent callers wait on a
/// single acquisition instead of racing.
#[derive(Debug)]
pub struct AppOnlyAuthenticator {
    credentials: Credentials,
    metadata_url: String,
    http_client: Client,
    state: Mutex<TokenState>,
}

impl AppOnlyAuthenticator {
    /// Creates an authenticator using the public ACS metadata endpoint.
    #[must_use]
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            metadata_url: DEFAULT_METADATA_URL.to_string(),
            http_client: Client::new(),
            state: Mutex::new(TokenState::default()),
        }
    }

    /// Sets the metadata document URL.
    #[must_use]
    pub fn with_metadata_url(mut self, url: impl Into<String>) -> Self {
        self.metadata_url = url.into();
        self
    }

    /// Sets the HTTP client used for discovery and token requests.
    #[must_use]
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http_client = client;
        self
    }

    /// Returns the credentials.
    #[must_use]
    pub const fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Returns a token that has not expired, acquiring one if needed.
    ///
    /// Two calls without an expiry in between return the same `Arc`.
    ///
    /// # Errors
    ///
    /// Returns an error if any acquisition step fails. No retry is attempted
    /// and the previous cache entry is left untouched.
    pub async fn get_valid_token(&self) -> Result<Arc<AccessToken>> {
        let mut state = self.state.lock().await;

        if let Some(token) = state.token.as_ref().filter(|t| t.is_valid()) {
            tracing::trace!("Reusing cached access token");
            return Ok(Arc::clone(token));
        }

        let realm = self.cached_realm(&mut state).await?;
        let token = Arc::new(self.acquire(&realm).await?);
        tracing::debug!(
            expires_at = ?token.expires_at(),
            resource = %token.resource,
            "Acquired app-only access token"
        );
        state.token = Some(Arc::clone(&token));
        Ok(token)
    }

    /// Returns the site realm, resolving it on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the realm probe fails.
    pub async fn realm(&self) -> Result<String> {
        let mut state = self.state.lock().await;
        self.cached_realm(&mut state).await
    }

    /// Drops the cached token so the next call acquires a fresh one.
    pub async fn invalidate(&self) {
        self.state.lock().await.token = None;
    }

    async fn cached_realm(&self, state: &mut TokenState) -> Result<String> {
        if let Some(realm) = &state.realm {
            return Ok(realm.clone());
        }
        let realm =
            discovery::resolve_realm(&self.http_client, self.credentials.site_url()).await?;
        state.realm = Some(realm.clone());
        Ok(realm)
    }

    async fn acquire(&self, realm: &str) -> Result<AccessToken> {
        let endpoint =
            discovery::resolve_token_endpoint(&self.http_client, &self.metadata_url, realm)
                .await?;
        self.exchange_credentials(endpoint, realm).await
    }

    async fn exchange_credentials(&self, endpoint: Url, realm: &str) -> Result<AccessToken> {
        let resource = principal::resource_for(self.credentials.site_url(), realm);
        let client_id = principal::client_id_for(self.credentials.client_id(), realm);

        let mut params = HashMap::new();
        params.insert("grant_type", "client_credentials");
        params.insert("client_id", client_id.as_str());
        params.insert("client_secret", self.credentials.client_secret());
        params.insert("resource", resource.as_str());

        let response = self
            .http_client
            .post(endpoint)
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            return Err(serde_json::from_slice::<ErrorResponse>(&body).map_or_else(
                |_| Error::Status {
                    status: status.as_u16(),
                    body: String::from_utf8_lossy(&body).into_owned(),
                },
                ErrorResponse::into_error,
            ));
        }

        AccessToken::from_slice(&body)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use httpmock::prelude::*;
    use serde_json::json;

    const REALM: &str = "7c2f1a4e-1b2d-4e5f-8a9b-0c1d2e3f4a5b";

    struct Fixture {
        server: MockServer,
        auth: AppOnlyAuthenticator,
    }

    async fn fixture() -> Fixture {
        let server = MockServer::start_async().await;
        let creds = Credentials::new(server.url("/sites/dev"), "app-id", "app-secret").unwrap();
        let auth =
            AppOnlyAuthenticator::new(creds).with_metadata_url(server.url("/metadata/json/1"));
        Fixture { server, auth }
    }

    async fn mock_discovery(server: &MockServer) -> (httpmock::Mock<'_>, httpmock::Mock<'_>) {
        let realm = server
            .mock_async(|when, then| {
                when.method(POST).path("/sites/dev/vti_bin/client.svc");
                then.status(401).header(
                    "www-authenticate",
                    format!(r#"Bearer realm="{REALM}",client_id="00000003-0000-0ff1-ce00-000000000000""#),
                );
            })
            .await;
        let metadata = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/metadata/json/1")
                    .query_param("realm", REALM);
                then.status(200).json_body(json!({
                    "endpoints": [
                        {"protocol": "WS-Federation", "location": server.url("/wsfed")},
                        {"protocol": "OAuth2", "location": server.url("/tokens/OAuth/2")}
                    ]
                }));
            })
            .await;
        (realm, metadata)
    }

    #[tokio::test]
    async fn test_cached_token_reused() {
        let Fixture { server, auth } = fixture().await;
        let (realm, metadata) = mock_discovery(&server).await;
        let expires_on = (Utc::now() + Duration::hours(1)).timestamp().to_string();
        let token = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/tokens/OAuth/2")
                    .body_contains("grant_type=client_credentials")
                    .body_contains("client_secret=app-secret");
                then.status(200).json_body(json!({
                    "token_type": "Bearer",
                    "expires_in": "3599",
                    "expires_on": expires_on,
                    "resource": "res",
                    "access_token": "tok-1"
                }));
            })
            .await;

        let first = auth.get_valid_token().await.unwrap();
        let second = auth.get_valid_token().await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.access_token, "tok-1");
        realm.assert_hits_async(1).await;
        metadata.assert_hits_async(1).await;
        token.assert_hits_async(1).await;
    }

    #[tokio::test]
    async fn test_expired_token_reacquired_once() {
        let Fixture { server, auth } = fixture().await;
        let (realm, metadata) = mock_discovery(&server).await;
        let expired = (Utc::now() - Duration::minutes(5)).timestamp().to_string();
        let token = server
            .mock_async(|when, then| {
                when.method(POST).path("/tokens/OAuth/2");
                then.status(200).json_body(json!({
                    "token_type": "Bearer",
                    "expires_on": expired,
                    "access_token": "stale"
                }));
            })
            .await;

        auth.get_valid_token().await.unwrap();
        auth.get_valid_token().await.unwrap();

        realm.assert_hits_async(1).await;
        metadata.assert_hits_async(2).await;
        token.assert_hits_async(2).await;
    }

    #[tokio::test]
    async fn test_millisecond_expiry_is_cached() {
        let Fixture { server, auth } = fixture().await;
        let (_realm, _metadata) = mock_discovery(&server).await;
        let expires_on_ms = (Utc::now() + Duration::hours(1)).timestamp_millis();
        let token = server
            .mock_async(|when, then| {
                when.method(POST).path("/tokens/OAuth/2");
                then.status(200).json_body(json!({
                    "token_type": "Bearer",
                    "expires_on": expires_on_ms,
                    "access_token": "ms"
                }));
            })
            .await;

        auth.get_valid_token().await.unwrap();
        auth.get_valid_token().await.unwrap();
        token.assert_hits_async(1).await;
    }

    #[tokio::test]
    async fn test_principals_in_grant() {
        let Fixture { server, auth } = fixture().await;
        let (_realm, _metadata) = mock_discovery(&server).await;
        let token = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/tokens/OAuth/2")
                    .body_contains(format!("client_id=app-id%40{REALM}"))
                    .body_contains(format!(
                        "resource=00000003-0000-0ff1-ce00-000000000000%2F127.0.0.1%40{REALM}"
                    ));
                then.status(200).json_body(json!({
                    "token_type": "Bearer",
                    "expires_on": "4102444800",
                    "access_token": "abc"
                }));
            })
            .await;

        let issued = auth.get_valid_token().await.unwrap();
        assert_eq!(issued.access_token, "abc");
        token.assert_hits_async(1).await;
    }

    #[tokio::test]
    async fn test_oauth_error_surfaces() {
        let Fixture { server, auth } = fixture().await;
        let (_realm, _metadata) = mock_discovery(&server).await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/tokens/OAuth/2");
                then.status(401).json_body(json!({
                    "error": "invalid_client",
                    "error_description": "AADSTS7000215: Invalid client secret"
                }));
            })
            .await;

        let err = auth.get_valid_token().await.unwrap_err();
        assert!(matches!(err, Error::OAuth { ref error, .. } if error == "invalid_client"));
    }

    #[tokio::test]
    async fn test_non_json_error_keeps_status() {
        let Fixture { server, auth } = fixture().await;
        let (_realm, _metadata) = mock_discovery(&server).await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/tokens/OAuth/2");
                then.status(502).body("bad gateway");
            })
            .await;

        let err = auth.get_valid_token().await.unwrap_err();
        assert!(matches!(err, Error::Status { status: 502, ref body } if body == "bad gateway"));
    }

    #[tokio::test]
    async fn test_missing_challenge() {
        let Fixture { server, auth } = fixture().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/sites/dev/vti_bin/client.svc");
                then.status(200);
            })
            .await;

        let err = auth.get_valid_token().await.unwrap_err();
        assert!(matches!(err, Error::MissingChallenge { .. }));
    }

    #[tokio::test]
    async fn test_no_oauth2_endpoint() {
        let Fixture { server, auth } = fixture().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/sites/dev/vti_bin/client.svc");
                then.status(401).header("www-authenticate", r#"Bearer realm="r-1""#);
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/metadata/json/1");
                then.status(200).json_body(json!({
                    "endpoints": [{"protocol": "WS-Federation", "location": "x"}]
                }));
            })
            .await;

        let err = auth.get_valid_token().await.unwrap_err();
        assert!(matches!(err, Error::EndpointNotFound { ref realm } if realm == "r-1"));
    }

    #[tokio::test]
    async fn test_invalidate_forces_new_token() {
        let Fixture { server, auth } = fixture().await;
        let (realm, _metadata) = mock_discovery(&server).await;
        let token = server
            .mock_async(|when, then| {
                when.method(POST).path("/tokens/OAuth/2");
                then.status(200).json_body(json!({
                    "token_type": "Bearer",
                    "expires_on": "4102444800",
                    "access_token": "abc"
                }));
            })
            .await;

        let first = auth.get_valid_token().await.unwrap();
        auth.invalidate().await;
        let second = auth.get_valid_token().await.unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
        realm.assert_hits_async(1).await;
        token.assert_hits_async(2).await;
        assert_eq!(auth.realm().await.unwrap(), REALM);
    }
}
