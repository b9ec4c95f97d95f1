//! Canonical request signatures for signed mode.
//!
//! The digest input is every present `key=value` pair in byte-wise key order,
//! concatenated with no separator, followed by the application secret. The
//! result is the lowercase hex MD5 of that UTF-8 string. The remote service
//! recomputes it byte for byte, so any change here breaks every signed call.

use serde_json::Value;

use crate::query::{render, Params};

/// Returns the parameters as a sequence ordered by key. The input is untouched.
pub fn sort_by_key(params: &Params) -> Vec<(String, Value)> {
    let mut sorted: Vec<(String, Value)> =
        params.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
    sorted.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));
    sorted
}

/// Builds the exact string that gets hashed.
pub fn digest_input(sorted: &[(String, Value)], secret: &str) -> String {
    let mut input = String::new();
    for (key, value) in sorted {
        if let Some(text) = render(value) {
            input.push_str(key);
            input.push('=');
            input.push_str(&text);
        }
    }
    input.push_str(secret);
    input
}

/// Signs an already sorted parameter sequence.
pub fn sign_sorted(sorted: &[(String, Value)], secret: &str) -> String {
    format!("{:x}", md5::compute(digest_input(sorted, secret).as_bytes()))
}

/// Sorts and signs a parameter mapping.
pub fn sign(params: &Params, secret: &str) -> String {
    sign_sorted(&sort_by_key(params), secret)
}
