//! Percent-encoding helpers (RFC 3986 unreserved set)

use crate::params::Query;
use std::borrow::Cow;

/// Encode one path segment or query component
pub fn encode(s: &str) -> Cow<'_, str> {
    urlencoding::encode(s)
}

/// Encode a positional path argument
///
/// `.` is escaped as well so an argument never looks like an extension.
pub fn encode_arg(s: &str) -> String {
    encode(s).replace('.', "%2E")
}

/// Decode a path segment or query component
///
/// `+` is read as a space. Invalid UTF-8 leaves the input as-is.
pub fn decode(s: &str) -> String {
    let spaced = s.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}

/// Encode a mapping as `a=1&b=2`
pub fn encode_query(query: &Query) -> String {
    query
        .iter()
        .map(|(k, v)| format!("{}={}", encode(k), encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Parse `a=1&b=2` into a mapping; a key without `=` gets an empty value
pub fn parse_query(s: &str) -> Query {
    s.trim_start_matches('?')
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((k, v)) => (decode(k), decode(v)),
            None => (decode(pair), String::new()),
        })
        .collect()
}
