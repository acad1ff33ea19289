//! # sharepoint-client
//!
//! Authenticated REST calls against a SharePoint Online site using app-only
//! `OAuth2` tokens.
//!
//! This crate provides:
//! - A request facade issuing GET/DELETE/POST with a cached bearer token
//! - Configuration from code or from `SPURL` / `SPAppId` / `SPAppSecret`
//! - An OData query builder for `$select`, `$expand`, `$filter`, `$orderby`
//! - Typed shapes for user custom actions
//!
//! ## Example
//!
//! ```ignore
//! use sharepoint_client::{ODataQuery, SharePointClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = SharePointClient::new(
//!         "https://contoso.sharepoint.com/sites/dev",
//!         "your_client_id",
//!         "your_secret",
//!     )?;
//!
//!     let body = client
//!         .get_with_query("web/lists", &ODataQuery::new().select("Title"))
//!         .await?;
//!     println!("{}", String::from_utf8_lossy(&body));
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod client;
pub mod config;
mod error;
pub mod query;
pub mod resources;

pub use client::{ACCEPT_JSON, CONTENT_TYPE_ODATA, SharePointClient};
pub use config::{Config, ConfigBuilder};
pub use error::{Error, Result};
pub use query::ODataQuery;
pub use resources::{ActionRights, ActionScope, CustomAction, CustomActionElements};
pub use sharepoint_auth::{AccessToken, AppOnlyAuthenticator, Credentials, Error as AuthError};
