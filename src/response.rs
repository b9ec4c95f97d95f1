//! Where a method response goes.

use serde_json::Value;
use std::fmt;

use crate::event::{done_event, VkEvent};

type ResponseCallback = Box<dyn FnOnce(Value) + Send + 'static>;

/// Caller-chosen destination for one call's result.
///
/// A callback receives the parsed body directly and nothing is emitted on the
/// bus. An event name routes the body to that event's listeners instead.
pub enum ResponseTarget {
    Callback(ResponseCallback),
    Event(String),
}

impl ResponseTarget {
    pub fn callback(f: impl FnOnce(Value) + Send + 'static) -> Self {
        ResponseTarget::Callback(Box::new(f))
    }

    pub fn event<N: Into<String>>(name: N) -> Self {
        ResponseTarget::Event(name.into())
    }

    /// Fixes the route for a call to `method`; no target means `done:<method>`.
    pub fn resolve(target: Option<Self>, method: &str) -> Self {
        target.unwrap_or_else(|| ResponseTarget::Event(done_event(method)))
    }

    /// Hands `body` to the callback, or passes a response event to `emit`.
    pub(crate) fn deliver(self, body: Value, emit: impl FnOnce(VkEvent)) {
        match self {
            ResponseTarget::Callback(f) => f(body),
            ResponseTarget::Event(name) => emit(VkEvent::Response { name, body }),
        }
    }
}

impl From<&str> for ResponseTarget {
    fn from(name: &str) -> Self {
        ResponseTarget::Event(name.to_string())
    }
}

impl From<String> for ResponseTarget {
    fn from(name: String) -> Self {
        ResponseTarget::Event(name)
    }
}

impl fmt::Debug for ResponseTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseTarget::Callback(_) => write!(f, "Callback(..)"),
            ResponseTarget::Event(name) => f.debug_tuple("Event").field(name).finish(),
        }
    }
}
