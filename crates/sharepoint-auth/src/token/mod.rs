//! App-only access token returned by the ACS token endpoint.

use crate::error::{Error, Result};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Epoch values at or above this magnitude are milliseconds, not seconds.
pub const MILLIS_THRESHOLD: i64 = 10_000_000_000;

/// Normalizes an epoch value to seconds.
///
/// The token endpoint has been seen to report `expires_on` in either seconds
/// or milliseconds. Values of `10^10` or more are divided by 1000.
#[must_use]
pub const fn normalize_epoch(value: i64) -> i64 {
    if value >= MILLIS_THRESHOLD {
        value / 1000
    } else {
        value
    }
}

/// `OAuth2` app-only access token with metadata.
///
/// Numeric fields arrive as JSON strings from ACS; plain numbers are
/// accepted too.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    /// Token type (usually "Bearer").
    pub token_type: String,
    /// Issuance time as an epoch value.
    #[serde(default, deserialize_with = "epoch_opt")]
    pub not_before: Option<i64>,
    /// Lifetime in seconds.
    #[serde(default, deserialize_with = "epoch_opt")]
    pub expires_in: Option<i64>,
    /// Expiry time as an epoch value, in seconds or milliseconds.
    #[serde(deserialize_with = "epoch")]
    pub expires_on: i64,
    /// Resource the token was issued for.
    #[serde(default)]
    pub resource: String,
    /// Bearer token string.
    pub access_token: String,
}

impl AccessToken {
    /// Creates a token expiring at the given epoch value.
    #[must_use]
    pub fn new(access_token: impl Into<String>, expires_on: i64) -> Self {
        Self {
            token_type: "Bearer".to_string(),
            not_before: None,
            expires_in: None,
            expires_on,
            resource: String::new(),
            access_token: access_token.into(),
        }
    }

    /// Parses a token endpoint response body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedResponse`] if the body is not a token object
    /// or the access token is empty.
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        let token: Self = serde_json::from_slice(body)?;
        if token.access_token.is_empty() {
            return Err(Error::malformed("token response has an empty access_token"));
        }
        Ok(token)
    }

    /// Returns the expiry instant, with `expires_on` normalized to seconds.
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(normalize_epoch(self.expires_on), 0).single()
    }

    /// Returns true if the token is still usable at `now`.
    #[must_use]
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().is_some_and(|exp| now < exp)
    }

    /// Returns true if the token is still usable.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    /// Checks if the token has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        !self.is_valid()
    }

    /// Value for the `Authorization` header.
    #[must_use]
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("token_type", &self.token_type)
            .field("not_before", &self.not_before)
            .field("expires_in", &self.expires_in)
            .field("expires_on", &self.expires_on)
            .field("resource", &self.resource)
            .field("access_token", &"<redacted>")
            .finish()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Epoch {
    Int(i64),
    Text(String),
}

impl Epoch {
    fn into_i64<E: serde::de::Error>(self) -> std::result::Result<i64, E> {
        match self {
            Self::Int(v) => Ok(v),
            Self::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| E::custom(format!("invalid epoch value {s:?}"))),
        }
    }
}

fn epoch<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<i64, D::Error> {
    Epoch::deserialize(deserializer)?.into_i64()
}

fn epoch_opt<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<i64>, D::Error> {
    match Option::<Epoch>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Epoch::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(v) => v.into_i64().map(Some),
    }
}

/// Error response from the token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    /// Error code.
    pub error: String,
    /// Error description.
    #[serde(default)]
    pub error_description: String,
}

impl ErrorResponse {
    /// Converts to an Error.
    #[must_use]
    pub fn into_error(self) -> Error {
        Error::oauth_error(self.error, self.error_description)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::unreadable_literal)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_normalize_seconds_unchanged() {
        assert_eq!(normalize_epoch(1_700_000_000), 1_700_000_000);
        assert_eq!(normalize_epoch(MILLIS_THRESHOLD - 1), MILLIS_THRESHOLD - 1);
    }

    #[test]
    fn test_normalize_millis_divided() {
        assert_eq!(normalize_epoch(1_700_000_000_000), 1_700_000_000);
        assert_eq!(normalize_epoch(MILLIS_THRESHOLD), 10_000_000);
    }

    #[test]
    fn test_validity_boundary() {
        let token = AccessToken::new("t", 1_700_000_000);
        let exp = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        assert!(token.is_valid_at(exp - Duration::seconds(1)));
        assert!(!token.is_valid_at(exp));
        assert!(!token.is_valid_at(exp + Duration::seconds(1)));
    }

    #[test]
    fn test_validity_with_millis_expiry() {
        let token = AccessToken::new("t", 1_700_000_000_000);
        let exp = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        assert_eq!(token.expires_at(), Some(exp));
        assert!(token.is_valid_at(exp - Duration::seconds(30)));
    }

    #[test]
    fn test_expired_and_fresh() {
        let past = AccessToken::new("t", (Utc::now() - Duration::seconds(120)).timestamp());
        assert!(past.is_expired());

        let future = AccessToken::new("t", (Utc::now() + Duration::hours(1)).timestamp());
        assert!(future.is_valid());
    }

    #[test]
    fn test_parse_acs_string_fields() {
        let body = br#"{
            "token_type": "Bearer",
            "expires_in": "86399",
            "not_before": "1700000000",
            "expires_on": "1700086399",
            "resource": "00000003-0000-0ff1-ce00-000000000000/contoso.sharepoint.com@realm",
            "access_token": "eyJ0eXAi"
        }"#;
        let token = AccessToken::from_slice(body).unwrap();
        assert_eq!(token.expires_on, 1_700_086_399);
        assert_eq!(token.expires_in, Some(86_399));
        assert_eq!(token.not_before, Some(1_700_000_000));
        assert_eq!(token.access_token, "eyJ0eXAi");
    }

    #[test]
    fn test_parse_numeric_fields() {
        let body = br#"{"token_type":"Bearer","expires_on":1700086399000,"access_token":"abc"}"#;
        let token = AccessToken::from_slice(body).unwrap();
        assert_eq!(token.expires_on, 1_700_086_399_000);
        assert!(token.not_before.is_none());
    }

    #[test]
    fn test_parse_rejects_bad_expiry() {
        let body = br#"{"token_type":"Bearer","expires_on":"soon","access_token":"abc"}"#;
        let err = AccessToken::from_slice(body).unwrap_err();
        assert!(matches!(err, Error::MalformedResponse(_)));
    }

    #[test]
    fn test_parse_rejects_empty_token() {
        let body = br#"{"token_type":"Bearer","expires_on":"1","access_token":""}"#;
        assert!(matches!(
            AccessToken::from_slice(body),
            Err(Error::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_debug_redacts_token() {
        let token = AccessToken::new("super-secret", 1);
        let debug = format!("{token:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_bearer_header() {
        assert_eq!(AccessToken::new("abc", 1).bearer(), "Bearer abc");
    }
}
