//! App registration credentials for a site.

use crate::error::{Error, Result};
use std::fmt;
use url::Url;

/// Site URL plus client id/secret of an app-only registration.
///
/// Immutable once built.
#[derive(Clone)]
pub struct Credentials {
    site_url: Url,
    client_id: String,
    client_secret: String,
}

impl Credentials {
    /// Creates credentials for a site.
    ///
    /// # Errors
    ///
    /// Returns an error if the site URL is not an absolute `http(s)` URL with
    /// a host, or if the client id or secret is empty.
    pub fn new(
        site_url: impl AsRef<str>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Result<Self> {
        let site_url = Url::parse(site_url.as_ref().trim_end_matches('/'))?;
        if !matches!(site_url.scheme(), "http" | "https") || site_url.host_str().is_none() {
            return Err(Error::InvalidConfig(format!(
                "site URL must be http(s) with a host: {site_url}"
            )));
        }

        let client_id = client_id.into();
        if client_id.is_empty() {
            return Err(Error::InvalidConfig("client_id is empty".into()));
        }
        let client_secret = client_secret.into();
        if client_secret.is_empty() {
            return Err(Error::InvalidConfig("client_secret is empty".into()));
        }

        Ok(Self {
            site_url,
            client_id,
            client_secret,
        })
    }

    /// Site base URL.
    #[must_use]
    pub const fn site_url(&self) -> &Url {
        &self.site_url
    }

    /// Client identifier.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Client secret.
    #[must_use]
    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }

    /// Hostname of the site.
    #[must_use]
    pub fn hostname(&self) -> &str {
        self.site_url.host_str().unwrap_or_default()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("site_url", &self.site_url.as_str())
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_trims_trailing_slash() {
        let creds = Credentials::new("https://contoso.sharepoint.com/sites/dev/", "id", "secret")
            .unwrap();
        assert_eq!(
            creds.site_url().as_str(),
            "https://contoso.sharepoint.com/sites/dev"
        );
        assert_eq!(creds.hostname(), "contoso.sharepoint.com");
    }

    #[test]
    fn test_credentials_reject_empty_fields() {
        assert!(matches!(
            Credentials::new("https://contoso.sharepoint.com", "", "secret"),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            Credentials::new("https://contoso.sharepoint.com", "id", ""),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_credentials_reject_bad_url() {
        assert!(matches!(
            Credentials::new("not a url", "id", "secret"),
            Err(Error::Url(_))
        ));
        assert!(matches!(
            Credentials::new("ftp://contoso.sharepoint.com", "id", "secret"),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let creds = Credentials::new("https://contoso.sharepoint.com", "id", "hunter2").unwrap();
        assert!(!format!("{creds:?}").contains("hunter2"));
    }
}
