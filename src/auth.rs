//! OAuth session state and the three token grants.
//!
//! Each grant is a single GET whose JSON answer either carries a token, which
//! is stored in the [`Session`], or is handed back untouched as a "not ready"
//! payload. Nothing here refreshes or retries.

use serde_json::Value;

use crate::{
    config::ClientConfig,
    event::VkEvent,
    query::{encode, Params},
};

/// Permissions requested by the password grant.
pub const PASSWORD_SCOPE: &str =
    "notify,friends,photos,audio,video,docs,messages,notifications,offline,wall";

/// Token state owned by a client.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Session {
    pub token: Option<String>,
    /// Only set by the code grant.
    pub user_id: Option<i64>,
    /// Lifetime in seconds from issue. Informational; never acted on.
    pub expires_in: Option<u64>,
}

/// Ways of giving a client its token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenSource {
    /// Use this token as is.
    Token(String),
    /// Exchange a one-time authorization code.
    Code(String),
    /// Request a server-to-server token with the app's own credentials.
    ClientCredentials,
}

/// A token grant request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Grant {
    Password { username: String, password: String },
    Code(String),
    ClientCredentials,
}

/// What a grant response means for the session.
#[derive(Clone, Debug, PartialEq)]
pub enum GrantOutcome {
    Ready,
    NotReady(Value),
}

fn non_empty_token(body: &Value) -> Option<String> {
    body.get("access_token")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

impl Grant {
    /// The token endpoint URL for this grant.
    pub fn url(&self, config: &ClientConfig) -> String {
        let mut params = Params::new();
        params.insert("client_id".into(), config.app_id.clone().into());
        params.insert("client_secret".into(), config.app_secret.clone().into());
        let redirect_uri: Value = config.redirect_uri.clone().into();

        match self {
            Grant::Password { username, password } => {
                params.insert("redirect_uri".into(), redirect_uri);
                params.insert("grant_type".into(), "password".into());
                params.insert("scope".into(), PASSWORD_SCOPE.into());
                params.insert("username".into(), username.clone().into());
                params.insert("password".into(), password.clone().into());
                format!("{}/access_token?{}", config.endpoints.oauth, encode(&params))
            }
            Grant::Code(code) => {
                params.insert("code".into(), code.clone().into());
                params.insert("redirect_uri".into(), redirect_uri);
                format!("{}/access_token?{}", config.endpoints.oauth, encode(&params))
            }
            Grant::ClientCredentials => {
                params.insert("grant_type".into(), "client_credentials".into());
                format!("{}/oauth/access_token?{}", config.endpoints.api, encode(&params))
            }
        }
    }

    /// Applies a parsed response to `session`.
    ///
    /// The password and code grants need a non-empty `access_token`; the
    /// client-credentials grant only fails on an `error` field.
    pub fn apply(&self, session: &mut Session, body: Value) -> GrantOutcome {
        match self {
            Grant::Password { .. } => match non_empty_token(&body) {
                Some(token) => {
                    session.token = Some(token);
                    GrantOutcome::Ready
                }
                None => GrantOutcome::NotReady(body),
            },
            Grant::Code(_) => match non_empty_token(&body) {
                Some(token) => {
                    session.token = Some(token);
                    session.user_id = body.get("user_id").and_then(Value::as_i64);
                    session.expires_in = body.get("expires_in").and_then(Value::as_u64);
                    GrantOutcome::Ready
                }
                None => GrantOutcome::NotReady(body),
            },
            Grant::ClientCredentials => {
                if body.get("error").is_some_and(|e| !e.is_null()) {
                    GrantOutcome::NotReady(body)
                } else {
                    session.token = body
                        .get("access_token")
                        .and_then(Value::as_str)
                        .map(str::to_string);
                    GrantOutcome::Ready
                }
            }
        }
    }

    /// The event announcing `outcome` for this grant.
    pub fn event(&self, outcome: GrantOutcome) -> VkEvent {
        match (self, outcome) {
            (Grant::Password { .. }, GrantOutcome::Ready) => VkEvent::AcquireTokenReady,
            (Grant::Password { .. }, GrantOutcome::NotReady(body)) => {
                VkEvent::AcquireTokenNotReady(body)
            }
            (Grant::Code(_), GrantOutcome::Ready) => VkEvent::TokenByCodeReady,
            (Grant::Code(_), GrantOutcome::NotReady(body)) => VkEvent::TokenByCodeNotReady(body),
            (Grant::ClientCredentials, GrantOutcome::Ready) => VkEvent::AppServerTokenReady,
            (Grant::ClientCredentials, GrantOutcome::NotReady(body)) => {
                VkEvent::AppServerTokenNotReady(body)
            }
        }
    }

    pub(crate) fn label(&self) -> &'static str {
        match self {
            Grant::Password { .. } => "password",
            Grant::Code(_) => "authorization_code",
            Grant::ClientCredentials => "client_credentials",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config() -> ClientConfig {
        ClientConfig::new("100", "s3cr3t")
    }

    #[test]
    fn password_url_omits_missing_redirect() {
        let grant = Grant::Password {
            username: "user@example.com".into(),
            password: "p&ss".into(),
        };
        assert_eq!(
            grant.url(&config()),
            "https://oauth.vk.com/access_token?client_id=100&client_secret=s3cr3t\
             &grant_type=password&scope=notify%2Cfriends%2Cphotos%2Caudio%2Cvideo%2Cdocs\
             %2Cmessages%2Cnotifications%2Coffline%2Cwall\
             &username=user%40example.com&password=p%26ss"
        );
    }

    #[test]
    fn code_url_carries_redirect() {
        let cfg = config().redirect_uri("https://app.example/cb");
        assert_eq!(
            Grant::Code("abc".into()).url(&cfg),
            "https://oauth.vk.com/access_token?client_id=100&client_secret=s3cr3t\
             &code=abc&redirect_uri=https%3A%2F%2Fapp.example%2Fcb"
        );
    }

    #[test]
    fn client_credentials_uses_api_host() {
        assert_eq!(
            Grant::ClientCredentials.url(&config()),
            "https://api.vk.com/oauth/access_token?client_id=100&client_secret=s3cr3t\
             &grant_type=client_credentials"
        );
    }

    #[test]
    fn password_grant_outcomes() {
        let grant = Grant::Password {
            username: "u".into(),
            password: "p".into(),
        };
        let mut session = Session::default();

        let body = json!({"error": "invalid_client", "error_description": "bad password"});
        assert_eq!(grant.apply(&mut session, body.clone()), GrantOutcome::NotReady(body));
        assert_eq!(session, Session::default());

        let body = json!({"access_token": ""});
        assert!(matches!(grant.apply(&mut session, body), GrantOutcome::NotReady(_)));

        assert_eq!(grant.apply(&mut session, json!({"access_token": "X"})), GrantOutcome::Ready);
        assert_eq!(session.token.as_deref(), Some("X"));
        assert_eq!(session.user_id, None);
    }

    #[test]
    fn code_grant_stores_user_and_expiry() {
        let grant = Grant::Code("c".into());
        let mut session = Session::default();
        let body = json!({"access_token": "T", "user_id": 66748, "expires_in": 86400});
        assert_eq!(grant.apply(&mut session, body), GrantOutcome::Ready);
        assert_eq!(
            session,
            Session {
                token: Some("T".into()),
                user_id: Some(66748),
                expires_in: Some(86400),
            }
        );
        assert_eq!(grant.event(GrantOutcome::Ready), VkEvent::TokenByCodeReady);
    }

    #[test]
    fn client_credentials_fails_only_on_error_field() {
        let grant = Grant::ClientCredentials;
        let mut session = Session::default();
        let body = json!({"error": "invalid_client"});
        let outcome = grant.apply(&mut session, body.clone());
        assert_eq!(grant.event(outcome), VkEvent::AppServerTokenNotReady(body));

        assert_eq!(grant.apply(&mut session, json!({"access_token": "srv"})), GrantOutcome::Ready);
        assert_eq!(session.token.as_deref(), Some("srv"));
    }
}
