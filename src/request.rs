//! Request envelopes and the URLs built from them.
//!
//! Building is kept free of I/O and clocks: the timestamp and nonce of a
//! signed call are passed in, so a given input always yields the same URL.

use serde_json::Value;

use crate::{
    config::ClientConfig,
    query::{encode, encode_component, encode_pairs, Params},
    signature::{sign_sorted, sort_by_key},
};

/// Query keys whose values never reach the logs.
const SECRET_KEYS: [&str; 4] = ["client_secret", "password", "access_token", "code"];

/// Parameters of one outgoing call before mode-specific fields are added.
#[derive(Clone, Debug, PartialEq)]
pub struct RequestEnvelope {
    pub method: String,
    pub params: Params,
}

impl RequestEnvelope {
    /// Copies the caller's parameters and resolves `v` and `lang`.
    ///
    /// A value present in `params` wins over the config, which wins over the
    /// crate defaults.
    pub fn new(config: &ClientConfig, method: &str, params: Option<Params>) -> Self {
        let mut params = params.unwrap_or_default();
        if params.get("v").map_or(true, Value::is_null) {
            params.insert("v".into(), config.effective_version().into());
        }
        if params.get("lang").map_or(true, Value::is_null) {
            params.insert("lang".into(), config.effective_language().into());
        }
        Self {
            method: method.to_string(),
            params,
        }
    }

    /// Adds the signed-mode fields, signs, and returns the `api.php` URL.
    ///
    /// The signature is appended last and is not part of its own digest; a
    /// caller-supplied `sig` is dropped.
    pub fn signed_url(self, config: &ClientConfig, timestamp: i64, nonce: u32) -> String {
        let mut params = self.params;
        params.remove("sig");
        params.insert("api_id".into(), config.app_id.clone().into());
        params.insert("method".into(), self.method.into());
        params.insert("timestamp".into(), timestamp.into());
        params.insert("format".into(), "json".into());
        params.insert("random".into(), nonce.into());

        let sorted = sort_by_key(&params);
        let sig = sign_sorted(&sorted, &config.app_secret);
        let query = encode_pairs(sorted.iter().map(|(k, v)| (k.as_str(), v)));
        format!("{}/api.php?{}&sig={}", config.endpoints.signed, query, sig)
    }

    /// Adds the bearer token and returns the `/method/<name>` URL.
    ///
    /// The method name is percent-encoded as one path segment, so a `/` or
    /// `?` in it cannot change the path or start the query.
    pub fn oauth_url(self, config: &ClientConfig, token: Option<&str>) -> String {
        let mut params = self.params;
        params.insert(
            "access_token".into(),
            token.map_or(Value::Null, |t| Value::String(t.to_string())),
        );
        format!(
            "{}/method/{}?{}",
            config.endpoints.api,
            encode_component(&self.method),
            encode(&params)
        )
    }
}

/// Copy of `url` with secret query values masked, for logging.
pub(crate) fn redact(url: &str) -> String {
    let Some((base, query)) = url.split_once('?') else {
        return url.to_string();
    };
    let pairs: Vec<String> = query
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((k, _)) if SECRET_KEYS.contains(&k) => format!("{}=***", k),
            _ => pair.to_string(),
        })
        .collect();
    format!("{}?{}", base, pairs.join("&"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::Mode, signature::sign};
    use serde_json::json;
    use std::collections::HashMap;

    fn config() -> ClientConfig {
        ClientConfig::new("100", "s3cr3t")
    }

    fn params(value: Value) -> Params {
        value.as_object().cloned().unwrap()
    }

    fn query_map(url: &str) -> HashMap<String, String> {
        let (_, query) = url.split_once('?').unwrap();
        query
            .split('&')
            .map(|pair| {
                let (k, v) = pair.split_once('=').unwrap();
                (k.to_string(), v.to_string())
            })
            .collect()
    }

    #[test]
    fn version_and_language_precedence() {
        let env = RequestEnvelope::new(&config(), "users.get", None);
        assert_eq!(env.params, params(json!({"v": "3.0", "lang": "ru"})));

        let cfg = config().version("5.131").language("en");
        let env = RequestEnvelope::new(&cfg, "users.get", None);
        assert_eq!(env.params["v"], json!("5.131"));
        assert_eq!(env.params["lang"], json!("en"));

        let env = RequestEnvelope::new(&cfg, "users.get", Some(params(json!({"v": "5.0"}))));
        assert_eq!(env.params["v"], json!("5.0"));
        assert_eq!(env.params["lang"], json!("en"));
    }

    #[test]
    fn signed_url_is_sorted_and_signed() {
        let env = RequestEnvelope::new(&config(), "users.get", Some(params(json!({"v": "3.0"}))));
        let url = env.signed_url(&config(), 1_700_000_000_000, 42);
        assert_eq!(
            url,
            "http://api.vk.com/api.php?api_id=100&format=json&lang=ru&method=users.get\
             &random=42&timestamp=1700000000000&v=3.0&sig=fea142ebab3c7186aa10acf4f01dce32"
        );
    }

    #[test]
    fn signature_covers_caller_params_but_not_itself() {
        let env = RequestEnvelope::new(
            &config(),
            "wall.get",
            Some(params(json!({"owner_id": -1, "count": 5, "filter": null}))),
        );
        let url = env.signed_url(&config(), 1, 7);
        let q = query_map(&url);
        assert!(!q.contains_key("filter"));

        let mut expected = Params::new();
        for (k, v) in &q {
            if k != "sig" {
                expected.insert(k.clone(), Value::String(v.clone()));
            }
        }
        assert_eq!(q["sig"], sign(&expected, "s3cr3t"));
    }

    #[test]
    fn signed_and_oauth_urls_differ() {
        let cfg = config().mode(Mode::OAuth);
        let p = params(json!({"user_ids": "1"}));
        let signed =
            RequestEnvelope::new(&cfg, "users.get", Some(p.clone())).signed_url(&cfg, 5, 6);
        let oauth =
            RequestEnvelope::new(&cfg, "users.get", Some(p)).oauth_url(&cfg, Some("tok"));

        assert!(signed.starts_with("http://api.vk.com/api.php?"));
        assert!(oauth.starts_with("https://api.vk.com/method/users.get?"));

        let sq = query_map(&signed);
        let oq = query_map(&oauth);
        for key in ["sig", "api_id", "timestamp", "random", "format"] {
            assert!(sq.contains_key(key), "signed lacks {}", key);
            assert!(!oq.contains_key(key), "oauth has {}", key);
        }
        assert!(!sq.contains_key("access_token"));
        assert_eq!(oq["access_token"], "tok");
        assert_eq!(oq["user_ids"], "1");
    }

    #[test]
    fn oauth_url_keeps_caller_order_and_skips_missing_token() {
        let env = RequestEnvelope::new(
            &config(),
            "wall.post",
            Some(params(json!({"message": "hi there", "owner_id": 1}))),
        );
        assert_eq!(
            env.oauth_url(&config(), None),
            "https://api.vk.com/method/wall.post?message=hi%20there&owner_id=1&v=3.0&lang=ru"
        );
    }

    #[test]
    fn caller_sig_is_neither_signed_nor_sent() {
        let forged = RequestEnvelope::new(
            &config(),
            "users.get",
            Some(params(json!({"v": "3.0", "sig": "forged"}))),
        );
        let url = forged.signed_url(&config(), 1_700_000_000_000, 42);
        assert_eq!(url.matches("sig=").count(), 1);
        assert!(!url.contains("forged"));

        let clean = RequestEnvelope::new(&config(), "users.get", Some(params(json!({"v": "3.0"}))));
        assert_eq!(url, clean.signed_url(&config(), 1_700_000_000_000, 42));
        assert!(url.ends_with("&sig=fea142ebab3c7186aa10acf4f01dce32"));
    }

    #[test]
    fn method_name_stays_one_path_segment() {
        let env = RequestEnvelope::new(&config(), "users.get/../x?a=b", None);
        assert_eq!(
            env.oauth_url(&config(), Some("tok")),
            "https://api.vk.com/method/users.get%2F..%2Fx%3Fa%3Db\
             ?v=3.0&lang=ru&access_token=tok"
        );
    }

    #[test]
    fn redact_masks_secrets() {
        let url = "https://oauth.vk.com/access_token\
                   ?client_id=1&client_secret=abc&password=pw&username=u";
        assert_eq!(
            redact(url),
            "https://oauth.vk.com/access_token\
             ?client_id=1&client_secret=***&password=***&username=u"
        );
        assert_eq!(redact("http://x/y"), "http://x/y");
    }
}
