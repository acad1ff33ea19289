//! Client configuration types.

use crate::error::{Error, Result};
use sharepoint_auth::Credentials;
use sharepoint_auth::discovery::DEFAULT_METADATA_URL;
use std::time::Duration;

/// Environment variable holding the site URL.
pub const ENV_SITE_URL: &str = "SPURL";
/// Environment variable holding the app (client) id.
pub const ENV_CLIENT_ID: &str = "SPAppId";
/// Environment variable holding the app secret.
pub const ENV_CLIENT_SECRET: &str = "SPAppSecret";

const DEFAULT_USER_AGENT: &str = concat!("sharepoint-client/", env!("CARGO_PKG_VERSION"));

/// SharePoint client configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Site URL and app credentials.
    pub credentials: Credentials,
    /// ACS metadata document URL.
    pub metadata_url: String,
    /// Overall request timeout. `None` keeps the transport default.
    pub timeout: Option<Duration>,
    /// `User-Agent` header value.
    pub user_agent: String,
}

impl Config {
    /// Creates a configuration builder.
    #[must_use]
    pub fn builder(site_url: impl Into<String>) -> ConfigBuilder {
        ConfigBuilder::new(site_url)
    }

    /// Loads the configuration from `SPURL`, `SPAppId` and `SPAppSecret`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming the first missing variable, or if the
    /// values do not form valid credentials.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads the configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// See [`Config::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let require = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| Error::Config(format!("{key} is not set")))
        };

        Self::builder(require(ENV_SITE_URL)?)
            .client_id(require(ENV_CLIENT_ID)?)
            .client_secret(require(ENV_CLIENT_SECRET)?)
            .build()
    }
}

/// Builder for client configuration.
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    site_url: String,
    client_id: Option<String>,
    client_secret: Option<String>,
    metadata_url: String,
    timeout: Option<Duration>,
    user_agent: String,
}

impl ConfigBuilder {
    /// Creates a new builder for the given site.
    #[must_use]
    pub fn new(site_url: impl Into<String>) -> Self {
        Self {
            site_url: site_url.into(),
            client_id: None,
            client_secret: None,
            metadata_url: DEFAULT_METADATA_URL.to_string(),
            timeout: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    /// Sets the client id.
    #[must_use]
    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// Sets the client secret.
    #[must_use]
    pub fn client_secret(mut self, client_secret: impl Into<String>) -> Self {
        self.client_secret = Some(client_secret.into());
        self
    }

    /// Overrides the ACS metadata document URL.
    #[must_use]
    pub fn metadata_url(mut self, url: impl Into<String>) -> Self {
        self.metadata_url = url.into();
        self
    }

    /// Sets an overall request timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the `User-Agent` header.
    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a credential is missing or invalid.
    pub fn build(self) -> Result<Config> {
        let client_id = self
            .client_id
            .ok_or_else(|| Error::Config("client_id is required".into()))?;
        let client_secret = self
            .client_secret
            .ok_or_else(|| Error::Config("client_secret is required".into()))?;
        let credentials = Credentials::new(&self.site_url, client_id, client_secret)
            .map_err(|e| Error::Config(e.to_string()))?;

        Ok(Config {
            credentials,
            metadata_url: self.metadata_url,
            timeout: self.timeout,
            user_agent: self.user_agent,
        })
    }
}
