//! Secret storage subsystem.
//!
//! # Responsibilities
//! - Durable key-value contract for the shared pairing secret
//! - Concurrent reads, serialized writes (atomic get/set)
//!
//! # Design Decisions
//! - Injected as a trait object so tests supply doubles and the host app
//!   supplies its own persistence
//! - Last-write-wins: a `/set-secret` may race an in-flight read, no
//!   transaction spans operations
//! - An unset key and a stored blank value are both "not configured" for
//!   authentication purposes; the store itself does not normalize

use std::collections::HashMap;
use std::sync::RwLock;

/// Well-known store key under which the pairing secret lives.
pub const SECRET_KEY: &str = "secret_key";

/// Durable key-value store for process-wide secrets.
pub trait SecretStore: Send + Sync {
    /// Fetch the value stored under `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str);
}

/// In-memory store used by the standalone binary and by tests.
///
/// Host integrations are expected to replace this with a persistent
/// implementation; the listener only relies on the get/set contract.
#[derive(Debug, Default)]
pub struct MemorySecretStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SecretStore for MemorySecretStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key.to_string(), value.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_returns_none_when_unset() {
        let store = MemorySecretStore::new();
        assert_eq!(store.get(SECRET_KEY), None);
    }

    #[test]
    fn set_then_get_round_trips() {
        let store = MemorySecretStore::new();
        store.set(SECRET_KEY, "hunter2");
        assert_eq!(store.get(SECRET_KEY), Some("hunter2".to_string()));
    }

    #[test]
    fn set_overwrites_previous_value() {
        let store = MemorySecretStore::new();
        store.set(SECRET_KEY, "first");
        store.set(SECRET_KEY, "second");
        assert_eq!(store.get(SECRET_KEY), Some("second".to_string()));
    }

    #[test]
    fn empty_string_is_stored_as_is() {
        let store = MemorySecretStore::new();
        store.set(SECRET_KEY, "");
        assert_eq!(store.get(SECRET_KEY), Some(String::new()));
    }
}
