//! Utility functions and the client's EventEmitter.

use serde_json::Value;
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, MutexGuard,
    },
};

/// Upper bound (exclusive) of the signed-mode `random` nonce.
pub const NONCE_BOUND: u32 = 9999;

/// Milliseconds since the Unix epoch.
pub fn timestamp_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Non-cryptographic nonce in `0..NONCE_BOUND`.
pub fn nonce() -> u32 {
    use rand::Rng;
    rand::rng().random_range(0..NONCE_BOUND)
}

/// Handle returned by [`EventEmitter::on`], used to remove a single listener.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Callback = Arc<dyn Fn(&Value) + Send + Sync>;

struct Listener {
    id: ListenerId,
    once: bool,
    callback: Callback,
}

/// A simple name-keyed EventEmitter.
///
/// Listeners run synchronously on the emitting task, outside the internal
/// lock, so a listener may register or remove listeners itself.
#[derive(Default)]
pub struct EventEmitter {
    listeners: Mutex<HashMap<String, Vec<Listener>>>,
    next_id: AtomicU64,
}

impl EventEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<Listener>>> {
        self.listeners.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn add(&self, event: &str, once: bool, callback: Callback) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock()
            .entry(event.to_string())
            .or_default()
            .push(Listener { id, once, callback });
        id
    }

    /// Registers a listener for an event.
    pub fn on(
        &self,
        event: &str,
        callback: impl Fn(&Value) + Send + Sync + 'static,
    ) -> ListenerId {
        self.add(event, false, Arc::new(callback))
    }

    /// Registers a listener that is dropped after its first call.
    pub fn once(
        &self,
        event: &str,
        callback: impl Fn(&Value) + Send + Sync + 'static,
    ) -> ListenerId {
        self.add(event, true, Arc::new(callback))
    }

    /// Removes every listener for an event.
    pub fn off(&self, event: &str) {
        self.lock().remove(event);
    }

    /// Removes one listener. Returns whether it was registered.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.lock();
        let mut found = false;
        for list in listeners.values_mut() {
            let before = list.len();
            list.retain(|l| l.id != id);
            found |= list.len() != before;
        }
        listeners.retain(|_, list| !list.is_empty());
        found
    }

    pub fn listener_count(&self, event: &str) -> usize {
        self.lock().get(event).map_or(0, Vec::len)
    }

    /// Emits an event with associated data. Returns whether anyone listened.
    pub fn emit(&self, event: &str, data: &Value) -> bool {
        let callbacks: Vec<Callback> = {
            let mut listeners = self.lock();
            let Some(list) = listeners.get_mut(event) else {
                return false;
            };
            let callbacks = list.iter().map(|l| l.callback.clone()).collect();
            list.retain(|l| !l.once);
            if list.is_empty() {
                listeners.remove(event);
            }
            callbacks
        };
        for cb in &callbacks {
            cb(data);
        }
        !callbacks.is_empty()
    }
}
