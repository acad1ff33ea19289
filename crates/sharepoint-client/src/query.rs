//! OData query string builder.
//!
//! Clauses accumulate in call order. Multiple filters are joined with
//! ` and `; ordering fields are comma-joined, each optionally suffixed with
//! ` desc`, following the OData `$orderby` convention.

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use url::Url;

/// Characters escaped in clause values. `,`, `/`, `(`, `)` and `:` stay
/// literal so paths and function calls remain readable.
const VALUE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'\'')
    .add(b'+')
    .add(b'<')
    .add(b'=')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Builder for `$select`, `$expand`, `$filter` and `$orderby` clauses.
///
/// ```
/// use sharepoint_client::ODataQuery;
///
/// let query = ODataQuery::new()
///     .select("Title")
///     .select("Id")
///     .filter("Hidden eq false")
///     .order_by_desc("Created");
/// assert_eq!(
///     query.to_query_string(),
///     "$select=Title,Id&$filter=Hidden%20eq%20false&$orderby=Created%20desc"
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ODataQuery {
    selections: Vec<String>,
    expand: Vec<String>,
    filters: Vec<String>,
    orders: Vec<String>,
}

impl ODataQuery {
    /// Creates an empty query.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a property to `$select`.
    #[must_use]
    pub fn select(mut self, prop: impl Into<String>) -> Self {
        self.selections.push(prop.into());
        self
    }

    /// Adds a navigation property to `$expand`.
    #[must_use]
    pub fn expand(mut self, prop: impl Into<String>) -> Self {
        self.expand.push(prop.into());
        self
    }

    /// Adds a `$filter` expression.
    #[must_use]
    pub fn filter(mut self, expr: impl Into<String>) -> Self {
        self.filters.push(expr.into());
        self
    }

    /// Orders ascending by a field.
    #[must_use]
    pub fn order_by(mut self, field: impl Into<String>) -> Self {
        self.orders.push(field.into());
        self
    }

    /// Orders descending by a field.
    #[must_use]
    pub fn order_by_desc(mut self, field: impl Into<String>) -> Self {
        self.orders.push(format!("{} desc", field.into()));
        self
    }

    /// Returns true if no clause has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
            && self.expand.is_empty()
            && self.filters.is_empty()
            && self.orders.is_empty()
    }

    /// Returns the non-empty clauses as `(key, value)` pairs.
    #[must_use]
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        [
            ("$select", self.selections.join(",")),
            ("$expand", self.expand.join(",")),
            ("$filter", self.filters.join(" and ")),
            ("$orderby", self.orders.join(",")),
        ]
        .into_iter()
        .filter(|(_, v)| !v.is_empty())
        .collect()
    }

    /// Renders the query string, without a leading `?`.
    #[must_use]
    pub fn to_query_string(&self) -> String {
        self.to_query_pairs()
            .iter()
            .map(|(k, v)| format!("{k}={}", utf8_percent_encode(v, VALUE)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Appends the clauses to a URL's query.
    pub fn apply(&self, url: &mut Url) {
        if self.is_empty() {
            return;
        }
        let clauses = self.to_query_string();
        let query = match url.query() {
            Some(existing) if !existing.is_empty() => format!("{existing}&{clauses}"),
            _ => clauses,
        };
        url.set_query(Some(&query));
    }
}
