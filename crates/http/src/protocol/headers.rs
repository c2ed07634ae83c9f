//! Case-insensitive header collection.
//!
//! Field names are folded to lower case on every [`Headers::get`] and
//! [`Headers::set`] call, so `HOST`, `Host` and `host` address the same entry.
//! Repeated names are merged into a single comma-separated value, the way
//! list-typed fields combine on the wire.

use std::collections::HashMap;
use std::collections::hash_map;

use http::header::CONTENT_LENGTH;

/// Header fields of a request, keyed by lower-cased field name.
///
/// Iteration order is unspecified. Values are stored as UTF-8 text; bytes
/// received on the wire that are not valid UTF-8 were replaced with `U+FFFD`
/// by the parser.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    inner: HashMap<String, String>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a field value, ignoring the case of `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    /// Returns true if a field called `name` is present, ignoring case.
    pub fn contains(&self, name: &str) -> bool {
        self.inner.contains_key(&name.to_ascii_lowercase())
    }

    /// Stores a field value.
    ///
    /// If the name is already present the new value is appended to the
    /// existing one, separated by `", "`.
    pub fn set(&mut self, name: &str, value: &str) {
        match self.inner.entry(name.to_ascii_lowercase()) {
            hash_map::Entry::Occupied(mut entry) => {
                let existing = entry.get_mut();
                existing.push_str(", ");
                existing.push_str(value);
            }
            hash_map::Entry::Vacant(entry) => {
                entry.insert(value.to_owned());
            }
        }
    }

    /// Number of distinct field names.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Iterates over all `(name, value)` pairs; names are lower case.
    pub fn iter(&self) -> Iter<'_> {
        Iter { inner: self.inner.iter() }
    }

    /// Declared body length.
    ///
    /// A missing or non-numeric `Content-Length` counts as `0`, meaning the
    /// request has no body.
    pub fn content_length(&self) -> u64 {
        self.get(CONTENT_LENGTH.as_str()).and_then(|value| value.parse::<u64>().ok()).unwrap_or(0)
    }
}

/// Iterator over the fields of [`Headers`].
#[derive(Debug)]
pub struct Iter<'a> {
    inner: hash_map::Iter<'a, String, String>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(name, value)| (name.as_str(), value.as_str()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a> IntoIterator for &'a Headers {
    type Item = (&'a str, &'a str);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
