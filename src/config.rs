//! Configuration options for the VK HTTP API client.

use std::{fmt, str::FromStr, time::Duration};

use crate::error::Error;

/// API version used when neither the call nor the config names one.
pub const DEFAULT_VERSION: &str = "3.0";

/// Response language used when neither the call nor the config names one.
pub const DEFAULT_LANGUAGE: &str = "ru";

/// How requests are authenticated and transported.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Shared-secret signature over the sorted parameters, plain HTTP.
    Signed,
    /// Bearer access token, HTTPS.
    OAuth,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Signed => write!(f, "sig"),
            Mode::OAuth => write!(f, "oauth"),
        }
    }
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sig" | "signed" => Ok(Mode::Signed),
            "oauth" => Ok(Mode::OAuth),
            _ => Err(Error::InvalidMode(s.to_string())),
        }
    }
}

/// Base URLs of the remote hosts, without a trailing slash.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Endpoints {
    /// Legacy signed endpoint, served over plain HTTP on port 80.
    pub signed: String,
    /// API host used for OAuth method calls and the client-credentials grant.
    pub api: String,
    /// Authorization host used by the password and code grants.
    pub oauth: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            signed: "http://api.vk.com".into(),
            api: "https://api.vk.com".into(),
            oauth: "https://oauth.vk.com".into(),
        }
    }
}

impl Endpoints {
    /// Points every endpoint at one base URL. Handy for mock servers.
    pub fn single<U: Into<String>>(base: U) -> Self {
        let base = base.into().trim_end_matches('/').to_string();
        Self {
            signed: base.clone(),
            api: base.clone(),
            oauth: base,
        }
    }
}

/// Configuration for the VK client.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Application identifier (`client_id` / `api_id`).
    pub app_id: String,
    /// Application secret, used for grants and for request signatures.
    pub app_secret: String,
    /// Request mode. Requests fail until one is chosen.
    pub mode: Option<Mode>,
    pub version: Option<String>,
    pub language: Option<String>,
    pub redirect_uri: Option<String>,
    pub endpoints: Endpoints,
    /// Optional timeout for HTTP requests.
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new<I: Into<String>, S: Into<String>>(app_id: I, app_secret: S) -> Self {
        Self {
            app_id: app_id.into(),
            app_secret: app_secret.into(),
            mode: None,
            version: None,
            language: None,
            redirect_uri: None,
            endpoints: Endpoints::default(),
            timeout: None,
        }
    }

    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn version<V: Into<String>>(mut self, version: V) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn language<L: Into<String>>(mut self, language: L) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn redirect_uri<R: Into<String>>(mut self, redirect_uri: R) -> Self {
        self.redirect_uri = Some(redirect_uri.into());
        self
    }

    pub fn endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Configured API version, falling back to [`DEFAULT_VERSION`].
    pub fn effective_version(&self) -> &str {
        self.version.as_deref().unwrap_or(DEFAULT_VERSION)
    }

    /// Configured language, falling back to [`DEFAULT_LANGUAGE`].
    pub fn effective_language(&self) -> &str {
        self.language.as_deref().unwrap_or(DEFAULT_LANGUAGE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_parses_original_selectors() {
        assert_eq!("sig".parse::<Mode>().unwrap(), Mode::Signed);
        assert_eq!("Signed".parse::<Mode>().unwrap(), Mode::Signed);
        assert_eq!("OAUTH".parse::<Mode>().unwrap(), Mode::OAuth);
        assert!(matches!("rest".parse::<Mode>(), Err(Error::InvalidMode(m)) if m == "rest"));
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = ClientConfig::new("100", "s3cr3t");
        assert_eq!(config.mode, None);
        assert_eq!(config.effective_version(), "3.0");
        assert_eq!(config.effective_language(), "ru");

        let config = config.version("5.131").language("en");
        assert_eq!(config.effective_version(), "5.131");
        assert_eq!(config.effective_language(), "en");
    }

    #[test]
    fn single_endpoint_strips_trailing_slash() {
        let endpoints = Endpoints::single("http://127.0.0.1:9000/");
        assert_eq!(endpoints.signed, "http://127.0.0.1:9000");
        assert_eq!(endpoints.api, endpoints.oauth);
    }
}
