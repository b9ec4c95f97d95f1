use serde::{ser::Serializer, Serialize};
use thiserror::Error;

/// A specialized `Result` type for the VK HTTP API crate.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for the VK HTTP API crate.
///
/// Transport failures during a call are reported on the client's `error`
/// event rather than through this type; see [`crate::client::VkClient::request`].
#[derive(Debug, Error)]
pub enum Error {
    /// A request was issued before a request mode was chosen.
    #[error("request mode is not set; choose signed or oauth before issuing requests")]
    ModeNotSet,

    #[error("unknown request mode: {0}")]
    InvalidMode(String),

    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    /// The remote service answered with a body that is not valid JSON.
    #[error("Serde JSON error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("Message error: {0}")]
    Message(String),
}

impl Serialize for Error {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}
