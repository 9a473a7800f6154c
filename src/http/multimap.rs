//! Case-insensitive, multi-value text map.
//!
//! Used for header fields, decoded query parameters and Content-Disposition
//! parameters. Keys compare by their ASCII-lowercased form; the original
//! spelling of each stored key is kept for iteration and display.

use std::collections::HashMap;
use std::collections::hash_map;
use std::fmt;

use serde::ser::{Serialize, SerializeSeq, Serializer};

fn fold(key: &str) -> String {
    key.to_ascii_lowercase()
}

/// A case-insensitive map from text keys to text values that permits
/// duplicate keys.
///
/// Looking up any case variant of a key returns every entry stored under any
/// other case variant of it. Iteration order across different keys is
/// unspecified; entries sharing a key are yielded in insertion order.
///
/// # Examples
///
/// ```
/// use rttp_wire::http::CaseFoldedMultimap;
///
/// let mut fields = CaseFoldedMultimap::new();
/// fields.insert("Set-Cookie", "a=1");
/// fields.insert("set-cookie", "b=2");
///
/// let all: Vec<_> = fields.get_all("SET-COOKIE").collect();
/// assert_eq!(all, vec!["a=1", "b=2"]);
/// assert_eq!(fields.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaseFoldedMultimap {
    buckets: HashMap<String, Vec<(String, String)>>,
    len: usize,
}

impl CaseFoldedMultimap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty map with room for `capacity` distinct keys.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buckets: HashMap::with_capacity(capacity),
            len: 0,
        }
    }

    /// Appends an entry. Existing entries under the same key are kept.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        self.buckets
            .entry(fold(&key))
            .or_default()
            .push((key, value.into()));
        self.len += 1;
    }

    /// Returns the first value inserted under `key` (any case), or `None`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.buckets
            .get(&fold(key))
            .and_then(|entries| entries.first())
            .map(|(_, v)| v.as_str())
    }

    /// Returns every value stored under `key` (any case), in insertion order.
    pub fn get_all(&self, key: &str) -> impl Iterator<Item = &str> {
        self.buckets
            .get(&fold(key))
            .into_iter()
            .flatten()
            .map(|(_, v)| v.as_str())
    }

    /// Returns `true` if at least one entry is stored under `key` (any case).
    pub fn contains(&self, key: &str) -> bool {
        self.buckets.contains_key(&fold(key))
    }

    /// Removes all entries stored under `key` (any case) and returns their values.
    pub fn remove(&mut self, key: &str) -> Vec<String> {
        let removed: Vec<String> = self
            .buckets
            .remove(&fold(key))
            .unwrap_or_default()
            .into_iter()
            .map(|(_, v)| v)
            .collect();
        self.len -= removed.len();
        removed
    }

    /// Total number of entries (not distinct keys).
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the map holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.buckets.clear();
        self.len = 0;
    }

    /// Iterates over `(key, value)` pairs with keys in their original spelling.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            buckets: self.buckets.values(),
            current: [].iter(),
        }
    }
}

/// Iterator over the entries of a [`CaseFoldedMultimap`].
pub struct Iter<'a> {
    buckets: hash_map::Values<'a, String, Vec<(String, String)>>,
    current: std::slice::Iter<'a, (String, String)>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((k, v)) = self.current.next() {
                return Some((k.as_str(), v.as_str()));
            }
            self.current = self.buckets.next()?.iter();
        }
    }
}

impl<'a> IntoIterator for &'a CaseFoldedMultimap {
    type Item = (&'a str, &'a str);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V> Extend<(K, V)> for CaseFoldedMultimap
where
    K: Into<String>,
    V: Into<String>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K, V> FromIterator<(K, V)> for CaseFoldedMultimap
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl fmt::Display for CaseFoldedMultimap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in self {
            write!(f, "{name}: {value}\r\n")?;
        }
        Ok(())
    }
}

// Serialized as a sequence of `[key, value]` pairs since keys may repeat.
impl Serialize for CaseFoldedMultimap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.len))?;
        for pair in self {
            seq.serialize_element(&pair)?;
        }
        seq.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_insensitive_get() {
        let mut m = CaseFoldedMultimap::new();
        m.insert("Content-Type", "text/plain");
        assert_eq!(m.get("content-type"), Some("text/plain"));
        assert_eq!(m.get("CONTENT-TYPE"), Some("text/plain"));
        assert_eq!(m.get("Content-Type"), Some("text/plain"));
        assert_eq!(m.get("content-length"), None);
    }

    #[test]
    fn duplicates_across_case_variants() {
        let mut m = CaseFoldedMultimap::new();
        m.insert("X-Foo", "1");
        m.insert("x-foo", "2");
        m.insert("X-FOO", "3");
        let vals: Vec<_> = m.get_all("x-Foo").collect();
        assert_eq!(vals, vec!["1", "2", "3"]);
        assert_eq!(m.len(), 3);
    }

    #[test]
    fn iteration_keeps_original_spelling() {
        let m: CaseFoldedMultimap = [("Host", "a"), ("ACCEPT", "b")].into_iter().collect();
        let mut pairs: Vec<_> = m.iter().collect();
        pairs.sort();
        assert_eq!(pairs, vec![("ACCEPT", "b"), ("Host", "a")]);
    }

    #[test]
    fn remove_all_variants() {
        let mut m = CaseFoldedMultimap::new();
        m.insert("X-Foo", "bar");
        m.insert("x-foo", "baz");
        m.insert("Other", "x");
        assert_eq!(m.remove("X-FOO"), vec!["bar".to_owned(), "baz".to_owned()]);
        assert_eq!(m.len(), 1);
        assert!(!m.contains("x-foo"));
        assert!(m.remove("x-foo").is_empty());
    }

    #[test]
    fn clear_empties() {
        let mut m = CaseFoldedMultimap::new();
        m.insert("a", "1");
        m.clear();
        assert!(m.is_empty());
        assert_eq!(m.iter().count(), 0);
    }

    #[test]
    fn display_as_header_lines() {
        let mut m = CaseFoldedMultimap::new();
        m.insert("Host", "localhost");
        assert_eq!(m.to_string(), "Host: localhost\r\n");
    }

    #[test]
    fn serializes_as_pairs() {
        let mut m = CaseFoldedMultimap::new();
        m.insert("Host", "localhost");
        let json = serde_json::to_string(&m).unwrap();
        assert_eq!(json, r#"[["Host","localhost"]]"#);
    }
}
