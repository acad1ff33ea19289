//! Realm and token endpoint discovery.

mod metadata;
mod realm;

pub use metadata::{
    DEFAULT_METADATA_URL, EndpointDescriptor, RealmMetadata, metadata_url,
    resolve_token_endpoint, select_token_endpoint,
};
pub use realm::{parse_realm, probe_url, realm_from_challenges, resolve_realm};
