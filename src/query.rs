//! Query-string building.
//!
//! Parameters are carried as JSON values. `Null` stands for an absent
//! parameter and is never written to a query; every other value is rendered
//! to text by [`render`] and percent-encoded with the same set of characters
//! JavaScript's `encodeURIComponent` leaves alone, which is what the remote
//! service expects.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::Value;

/// Parameter mapping for a single call, kept in insertion order.
pub type Params = serde_json::Map<String, Value>;

/// Bytes escaped in query values: everything except `A-Z a-z 0-9 - _ . ! ~ * ' ( )`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encodes one query value.
pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

/// Joins an array with `glue`, or passes a scalar through unchanged.
///
/// Returns `None` for an absent (`Null`) value.
pub fn implode(glue: &str, value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => Some(
            items
                .iter()
                .map(|item| render(item).unwrap_or_default())
                .collect::<Vec<_>>()
                .join(glue),
        ),
        other => Some(other.to_string()),
    }
}

/// Text form of a parameter value as it appears on the wire and in signatures.
pub fn render(value: &Value) -> Option<String> {
    implode(",", value)
}

/// Encodes an ordered sequence of parameters as `name=value&name=value`.
pub fn encode_pairs<'a, I>(pairs: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a Value)>,
{
    let parts: Vec<String> = pairs
        .into_iter()
        .filter_map(|(name, value)| {
            render(value).map(|text| format!("{}={}", name, encode_component(&text)))
        })
        .collect();
    parts.join("&")
}

/// Encodes a parameter mapping in its own iteration order.
pub fn encode(params: &Params) -> String {
    encode_pairs(params.iter().map(|(k, v)| (k.as_str(), v)))
}
