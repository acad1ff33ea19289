//! # sharepoint-auth
//!
//! App-only (client-credentials) `OAuth2` authentication for SharePoint Online.
//!
//! ## Features
//!
//! - **Realm discovery**: probes the site for its `Bearer realm="..."` challenge
//! - **Endpoint discovery**: reads the ACS metadata document for the realm
//! - **Token management**: one cached token per authenticator, renewed on expiry
//!
//! ## Quick Start
//!
//! ```ignore
//! use sharepoint_auth::{AppOnlyAuthenticator, Credentials};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let credentials = Credentials::new(
//!         "https://contoso.sharepoint.com/sites/dev",
//!         "your_client_id",
//!         "your_secret",
//!     )?;
//!     let auth = AppOnlyAuthenticator::new(credentials);
//!
//!     // First call runs realm -> endpoint -> credential exchange
//!     let token = auth.get_valid_token().await?;
//!     println!("Expires at: {:?}", token.expires_at());
//!
//!     // Later calls reuse the cached token until it expires
//!     let again = auth.get_valid_token().await?;
//!     assert!(std::sync::Arc::ptr_eq(&token, &again));
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod authenticator;
mod credentials;
pub mod discovery;
mod error;
pub mod principal;
pub mod token;

pub use authenticator::AppOnlyAuthenticator;
pub use credentials::Credentials;
pub use error::{Error, Result};
pub use principal::{SHAREPOINT_PRINCIPAL, format_principal};
pub use token::AccessToken;
