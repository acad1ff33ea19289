//! Authenticated request facade for a SharePoint site.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::query::ODataQuery;
use crate::resources::{ActionScope, CustomAction, CustomActionCollection};
use bytes::Bytes;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderValue};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use sharepoint_auth::{AccessToken, AppOnlyAuthenticator, Credentials};
use std::sync::Arc;
use url::Url;

/// `Accept` header sent on every call.
pub const ACCEPT_JSON: &str = "application/json";
/// `Content-Type` header sent on every call.
pub const CONTENT_TYPE_ODATA: &str = "application/json;odata=verbose;charset=utf-8";

/// REST client for one SharePoint site.
///
/// Each call first obtains a valid app-only token, then issues the request
/// and returns the raw response body. Payloads are not interpreted; callers
/// decode the OData envelope themselves (or use [`SharePointClient::get_json`]).
///
/// The client is `Send + Sync`; token renewal is serialized internally.
#[derive(Debug)]
pub struct SharePointClient {
    site_url: Url,
    http_client: Client,
    auth: AppOnlyAuthenticator,
}

impl SharePointClient {
    /// Creates a client with default settings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the site URL or credentials are invalid.
    pub fn new(
        site_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Result<Self> {
        Self::from_config(
            Config::builder(site_url)
                .client_id(client_id)
                .client_secret(client_secret)
                .build()?,
        )
    }

    /// Creates a client from `SPURL`, `SPAppId` and `SPAppSecret`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a variable is missing or invalid.
    pub fn from_env() -> Result<Self> {
        Self::from_config(Config::from_env()?)
    }

    /// Creates a client from a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the HTTP client cannot be built.
    pub fn from_config(config: Config) -> Result<Self> {
        let mut builder = Client::builder().user_agent(config.user_agent.as_str());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self::with_http_client(
            config.credentials,
            &config.metadata_url,
            http_client,
        ))
    }

    fn with_http_client(
        credentials: Credentials,
        metadata_url: &str,
        http_client: Client,
    ) -> Self {
        let site_url = credentials.site_url().clone();
        let auth = AppOnlyAuthenticator::new(credentials)
            .with_metadata_url(metadata_url)
            .with_http_client(http_client.clone());
        Self {
            site_url,
            http_client,
            auth,
        }
    }

    /// Site base URL.
    #[must_use]
    pub const fn site_url(&self) -> &Url {
        &self.site_url
    }

    /// Token cache and acquirer used by this client.
    #[must_use]
    pub const fn authenticator(&self) -> &AppOnlyAuthenticator {
        &self.auth
    }

    /// Returns a valid access token, acquiring one if needed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Auth`] if acquisition fails.
    pub async fn get_valid_token(&self) -> Result<Arc<AccessToken>> {
        Ok(self.auth.get_valid_token().await?)
    }

    /// Resolves a request target against the site.
    ///
    /// Absolute `http(s)` URLs are used as-is. Relative paths starting with
    /// `_api/` are appended to the site URL; any other relative path is
    /// placed under `{site}/_api/`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Url`] if the result is not a valid URL.
    pub fn resolve_url(&self, path: &str) -> Result<Url> {
        if path.starts_with("http://") || path.starts_with("https://") {
            return Ok(Url::parse(path)?);
        }

        let base = self.site_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        let full = if path == "_api" || path.starts_with("_api/") {
            format!("{base}/{path}")
        } else {
            format!("{base}/_api/{path}")
        };
        Ok(Url::parse(&full)?)
    }

    /// Issues an authenticated GET and returns the raw body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Auth`], [`Error::Transport`] or [`Error::Status`].
    pub async fn get(&self, path: &str) -> Result<Bytes> {
        let url = self.resolve_url(path)?;
        self.send(Method::GET, url, None).await
    }

    /// Issues an authenticated GET with OData query clauses.
    ///
    /// # Errors
    ///
    /// See [`SharePointClient::get`].
    pub async fn get_with_query(&self, path: &str, query: &ODataQuery) -> Result<Bytes> {
        let mut url = self.resolve_url(path)?;
        query.apply(&mut url);
        self.send(Method::GET, url, None).await
    }

    /// Issues an authenticated GET and decodes the JSON body.
    ///
    /// # Errors
    ///
    /// See [`SharePointClient::get`]; additionally [`Error::Decode`] if the
    /// body is not the expected shape.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let body = self.get(path).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Issues an authenticated DELETE and returns the raw body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Auth`], [`Error::Transport`] or [`Error::Status`].
    pub async fn delete(&self, path: &str) -> Result<Bytes> {
        let url = self.resolve_url(path)?;
        self.send(Method::DELETE, url, None).await
    }

    /// Issues an authenticated POST with a JSON body and returns the raw
    /// response body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Auth`], [`Error::Transport`] or [`Error::Status`].
    pub async fn post_json(&self, path: &str, body: impl Into<Bytes>) -> Result<Bytes> {
        let url = self.resolve_url(path)?;
        self.send(Method::POST, url, Some(body.into())).await
    }

    /// Lists the user custom actions registered at a scope.
    ///
    /// # Errors
    ///
    /// See [`SharePointClient::get_json`].
    pub async fn custom_actions(&self, scope: ActionScope) -> Result<Vec<CustomAction>> {
        let collection: CustomActionCollection = self.get_json(scope.path()).await?;
        Ok(collection.value)
    }

    async fn send(&self, method: Method, url: Url, body: Option<Bytes>) -> Result<Bytes> {
        let token = self.auth.get_valid_token().await?;
        let bearer = HeaderValue::from_str(&token.bearer()).map_err(|_| {
            sharepoint_auth::Error::malformed("access token is not a valid header value")
        })?;

        let mut request = self
            .http_client
            .request(method.clone(), url.clone())
            .header(AUTHORIZATION, bearer)
            .header(ACCEPT, ACCEPT_JSON)
            .header(CONTENT_TYPE, CONTENT_TYPE_ODATA);
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        tracing::debug!(
            %method,
            %url,
            status = status.as_u16(),
            len = bytes.len(),
            "SharePoint request"
        );

        if !status.is_success() {
            tracing::warn!(%method, %url, status = status.as_u16(), "SharePoint request failed");
            return Err(Error::Status {
                status: status.as_u16(),
                url: url.to_string(),
                body: bytes,
            });
        }

        Ok(bytes)
    }
}
