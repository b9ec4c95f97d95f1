//! Event definitions for the VK HTTP API client.

use serde_json::Value;
use std::fmt;

pub const ACQUIRE_TOKEN_READY: &str = "acquireTokenReady";
pub const ACQUIRE_TOKEN_NOT_READY: &str = "acquireTokenNotReady";
pub const TOKEN_BY_CODE_READY: &str = "tokenByCodeReady";
pub const TOKEN_BY_CODE_NOT_READY: &str = "tokenByCodeNotReady";
pub const APP_SERVER_TOKEN_READY: &str = "appServerTokenReady";
pub const APP_SERVER_TOKEN_NOT_READY: &str = "appServerTokenNotReady";
pub const ERROR: &str = "error";

/// Prefix of the event a response is emitted on when the caller named no target.
pub const DONE_PREFIX: &str = "done:";

/// Default event name for responses to `method`.
pub fn done_event(method: &str) -> String {
    format!("{}{}", DONE_PREFIX, method)
}

/// Enumeration of events emitted by the VK client.
#[derive(Clone, Debug, PartialEq)]
pub enum VkEvent {
    /// Password grant stored a token.
    AcquireTokenReady,
    /// Password grant answered without a token; carries the raw body.
    AcquireTokenNotReady(Value),
    /// Code grant stored a token, user id and expiry.
    TokenByCodeReady,
    TokenByCodeNotReady(Value),
    /// Client-credentials grant stored a token.
    AppServerTokenReady,
    AppServerTokenNotReady(Value),
    /// Transport-level failure of any request or grant.
    Error(String),
    /// A method response delivered by event.
    Response { name: String, body: Value },
}

impl VkEvent {
    /// The name listeners subscribe to with [`crate::client::VkClient::on`].
    pub fn name(&self) -> &str {
        match self {
            VkEvent::AcquireTokenReady => ACQUIRE_TOKEN_READY,
            VkEvent::AcquireTokenNotReady(_) => ACQUIRE_TOKEN_NOT_READY,
            VkEvent::TokenByCodeReady => TOKEN_BY_CODE_READY,
            VkEvent::TokenByCodeNotReady(_) => TOKEN_BY_CODE_NOT_READY,
            VkEvent::AppServerTokenReady => APP_SERVER_TOKEN_READY,
            VkEvent::AppServerTokenNotReady(_) => APP_SERVER_TOKEN_NOT_READY,
            VkEvent::Error(_) => ERROR,
            VkEvent::Response { name, .. } => name,
        }
    }

    /// The value handed to named listeners. `Null` for the ready events.
    pub fn payload(&self) -> Value {
        match self {
            VkEvent::AcquireTokenReady
            | VkEvent::TokenByCodeReady
            | VkEvent::AppServerTokenReady => Value::Null,
            VkEvent::AcquireTokenNotReady(body)
            | VkEvent::TokenByCodeNotReady(body)
            | VkEvent::AppServerTokenNotReady(body)
            | VkEvent::Response { body, .. } => body.clone(),
            VkEvent::Error(msg) => Value::String(msg.clone()),
        }
    }
}

impl fmt::Display for VkEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VkEvent::Error(msg) => write!(f, "{}: {}", ERROR, msg),
            VkEvent::Response { name, body } => write!(f, "{}: {}", name, body),
            VkEvent::AcquireTokenNotReady(body)
            | VkEvent::TokenByCodeNotReady(body)
            | VkEvent::AppServerTokenNotReady(body) => write!(f, "{}: {}", self.name(), body),
            _ => write!(f, "{}", self.name()),
        }
    }
}
