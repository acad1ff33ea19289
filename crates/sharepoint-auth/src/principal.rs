//! Principal identifiers used in the app-only grant.

use url::Url;

/// Well-known app ID of the SharePoint Online service principal.
pub const SHAREPOINT_PRINCIPAL: &str = "00000003-0000-0ff1-ce00-000000000000";

/// Formats `{principal}[/{hostname}]@{realm}`.
///
/// The hostname segment is omitted when `hostname` is empty.
///
/// ```
/// use sharepoint_auth::principal::format_principal;
///
/// assert_eq!(format_principal("P", "", "R"), "P@R");
/// assert_eq!(format_principal("P", "host", "R"), "P/host@R");
/// ```
#[must_use]
pub fn format_principal(principal: &str, hostname: &str, realm: &str) -> String {
    if hostname.is_empty() {
        format!("{principal}@{realm}")
    } else {
        format!("{principal}/{hostname}@{realm}")
    }
}

/// Resource identifier for the SharePoint service principal at `site`.
#[must_use]
pub fn resource_for(site: &Url, realm: &str) -> String {
    format_principal(SHAREPOINT_PRINCIPAL, site.host_str().unwrap_or_default(), realm)
}

/// Client identifier scoped to `realm`.
#[must_use]
pub fn client_id_for(client_id: &str, realm: &str) -> String {
    format_principal(client_id, "", realm)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_format_without_hostname() {
        assert_eq!(format_principal("P", "", "R"), "P@R");
    }

    #[test]
    fn test_format_with_hostname() {
        assert_eq!(format_principal("P", "host", "R"), "P/host@R");
    }

    #[test]
    fn test_resource_uses_site_hostname() {
        let site = Url::parse("https://contoso.sharepoint.com/sites/dev").unwrap();
        assert_eq!(
            resource_for(&site, "realm-1"),
            "00000003-0000-0ff1-ce00-000000000000/contoso.sharepoint.com@realm-1"
        );
    }

    #[test]
    fn test_client_id_has_no_hostname() {
        assert_eq!(client_id_for("app-id", "realm-1"), "app-id@realm-1");
    }
}
