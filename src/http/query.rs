//! Query string creation and parsing (`key=value&key=value`).

use super::{CaseFoldedMultimap, PercentCodec};

/// Builds and parses URL query strings.
///
/// # Examples
///
/// ```
/// use rttp_wire::http::QueryString;
///
/// let params = QueryString::parse("q=rust+lang&page=2&debug");
/// assert_eq!(params.get("Q"), Some("rust lang"));
/// assert_eq!(params.get("page"), Some("2"));
/// assert_eq!(params.get("debug"), Some(""));
/// ```
pub struct QueryString;

impl QueryString {
    /// Joins `key=encoded-value` pairs with `&`.
    ///
    /// Values are percent-encoded, keys are written as-is. Pairs appear in the
    /// map's iteration order, which is unspecified: do not rely on the
    /// position of a parameter in the result.
    pub fn create(fields: &CaseFoldedMultimap) -> String {
        let mut out = String::new();
        for (key, value) in fields {
            if !out.is_empty() {
                out.push('&');
            }
            out.push_str(key);
            out.push('=');
            out.push_str(&PercentCodec::encode(value));
        }
        out
    }

    /// Parses a query string into keys and percent-decoded values.
    ///
    /// Each `&`-separated segment is split at its first `=`. A segment without
    /// `=` yields an empty value. Segments whose name is empty (`&&`, `=x`)
    /// are dropped. Keys are not decoded.
    pub fn parse(query: &str) -> CaseFoldedMultimap {
        let mut out = CaseFoldedMultimap::new();
        for segment in query.split('&') {
            let (name, value) = segment.split_once('=').unwrap_or((segment, ""));
            if name.is_empty() {
                continue;
            }
            out.insert(name, PercentCodec::decode(value));
        }
        out
    }
}
