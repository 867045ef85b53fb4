//! RTSP headers handling
//!
//! This module provides a header map that keeps every value of a repeated
//! header line, in the order the lines arrived.

use super::{Error, Result, CRLF};
use bytes::{BufMut, BytesMut};
use std::collections::btree_map::{self, BTreeMap};
use std::fmt;

/// RTSP headers collection
///
/// Headers are keyed by name, and each name maps to one or more values:
/// - Names are matched case-sensitively, exactly as given
/// - Repeated header lines accumulate under one name, in arrival order
/// - Iteration (and therefore serialization) is in ascending name order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    entries: BTreeMap<String, Vec<String>>,
}

impl Header {
    /// Create a new empty headers collection
    pub fn new() -> Self {
        Header {
            entries: BTreeMap::new(),
        }
    }

    /// Insert a header
    ///
    /// If the name already exists, the value is appended after the
    /// existing ones rather than replacing them.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.entry(name.into()).or_default().push(value.into());
    }

    /// Replace all values of a header with a single value
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(name.into(), vec![value.into()]);
    }

    /// Get the first value for a header
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Get all values for a header, in arrival order
    pub fn get_all(&self, name: &str) -> &[String] {
        self.entries.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Check if a header exists
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Remove a header and return its values
    pub fn remove(&mut self, name: &str) -> Option<Vec<String>> {
        self.entries.remove(name)
    }

    /// Number of distinct header names
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Number of header lines this map serializes to
    pub fn line_count(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Iterate over names and their values, in ascending name order
    pub fn iter(&self) -> btree_map::Iter<'_, String, Vec<String>> {
        self.entries.iter()
    }

    /// Iterate over every header line as (name, value)
    pub fn lines(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .flat_map(|(name, values)| values.iter().map(move |v| (name.as_str(), v.as_str())))
    }

    /// Parse the first `Content-Length` value
    ///
    /// Returns `Ok(None)` when the header is absent.
    pub fn content_length(&self) -> Result<Option<usize>> {
        match self.get("Content-Length") {
            None => Ok(None),
            Some(raw) => parse_decimal(raw)
                .map(Some)
                .ok_or_else(|| Error::InvalidContentLength(raw.to_string())),
        }
    }

    /// Parse the first `CSeq` value, if present and numeric
    pub fn cseq(&self) -> Option<u32> {
        self.get("CSeq").and_then(|v| v.trim().parse().ok())
    }

    /// Parse a header line into name and value
    ///
    /// Format: `Name: value`. The value is trimmed of surrounding
    /// whitespace; the name must be non-empty and contain no whitespace.
    pub fn parse_header_line(line: &str) -> Result<(String, String)> {
        let colon_pos = line
            .find(':')
            .ok_or_else(|| Error::MalformedHeader(format!("no colon in header: {}", line)))?;

        let name = &line[..colon_pos];
        let value = line[colon_pos + 1..].trim();

        if name.is_empty() {
            return Err(Error::MalformedHeader("empty header name".to_string()));
        }
        if name.chars().any(char::is_whitespace) {
            return Err(Error::MalformedHeader(format!(
                "whitespace in header name: {:?}",
                name
            )));
        }

        Ok((name.to_string(), value.to_string()))
    }

    /// Append every header line in wire format
    pub(crate) fn write_to(&self, buf: &mut BytesMut) {
        for (name, value) in self.lines() {
            buf.put_slice(name.as_bytes());
            buf.put_slice(b": ");
            buf.put_slice(value.as_bytes());
            buf.put_slice(CRLF.as_bytes());
        }
    }
}

/// Unsigned decimal, digits only (no sign, no whitespace)
pub(crate) fn parse_decimal(s: &str) -> Option<usize> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in self.lines() {
            write!(f, "{}: {}{}", name, value, CRLF)?;
        }
        Ok(())
    }
}

impl<K, V> FromIterator<(K, V)> for Header
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut header = Header::new();
        for (name, value) in iter {
            header.insert(name, value);
        }
        header
    }
}

impl<'a> IntoIterator for &'a Header {
    type Item = (&'a String, &'a Vec<String>);
    type IntoIter = btree_map::Iter<'a, String, Vec<String>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
