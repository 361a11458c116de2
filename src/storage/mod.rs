//! Local persistence for session and preference data.
//!
//! Backends implement [`Store`], a flat string-keyed map. [`LocalStorage`] is the
//! shared handle the rest of the crate uses: it serializes values as JSON and
//! falls back to the raw string when stored text is not valid JSON, so a token
//! written verbatim reads back as a plain string.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::error::{Error, Result};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::{fmt, sync::Arc};
use tracing::warn;

/// Keys persisted by the portal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StorageKey {
    AuthToken,
    RefreshToken,
    User,
    Theme,
    Notifications,
    Language,
}

impl StorageKey {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AuthToken => "auth_token",
            Self::RefreshToken => "refresh_token",
            Self::User => "user",
            Self::Theme => "theme",
            Self::Notifications => "notifications",
            Self::Language => "language",
        }
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw string-keyed store. Each call is atomic on its own; there are no
/// transactions across calls.
pub trait Store: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    /// # Errors
    /// Returns an error if the backend cannot persist the value.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// # Errors
    /// Returns an error if the backend cannot persist the removal.
    fn remove(&self, key: &str) -> Result<()>;

    /// # Errors
    /// Returns an error if the backend cannot be emptied.
    fn clear(&self) -> Result<()>;
}

/// Shared handle over a [`Store`] with JSON encoding.
#[derive(Clone)]
pub struct LocalStorage {
    store: Arc<dyn Store>,
}

impl fmt::Debug for LocalStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalStorage").finish_non_exhaustive()
    }
}

impl LocalStorage {
    pub fn new(store: impl Store + 'static) -> Self {
        Self {
            store: Arc::new(store),
        }
    }

    /// In-memory storage, mostly for tests.
    #[must_use]
    pub fn memory() -> Self {
        Self::new(MemoryStore::default())
    }

    /// Reads and decodes `key`. Missing or empty values give `None`; text that is
    /// not JSON is decoded as a JSON string. Never fails.
    #[must_use]
    pub fn get_item<T: DeserializeOwned>(&self, key: StorageKey) -> Option<T> {
        let raw = self.store.get(key.as_str()).filter(|raw| !raw.is_empty())?;

        match serde_json::from_str::<T>(&raw) {
            Ok(value) => Some(value),
            Err(_) => match serde_json::from_value::<T>(Value::String(raw)) {
                Ok(value) => Some(value),
                Err(err) => {
                    warn!("Ignoring undecodable value for {key}: {err}");
                    None
                }
            },
        }
    }

    /// Untyped read; unparsable text comes back as `Value::String`.
    #[must_use]
    pub fn get_value(&self, key: StorageKey) -> Option<Value> {
        let raw = self.store.get(key.as_str()).filter(|raw| !raw.is_empty())?;
        Some(serde_json::from_str(&raw).unwrap_or(Value::String(raw)))
    }

    /// Stores `value`. Strings are written verbatim, anything else as JSON.
    /// # Errors
    /// Returns an error if the value cannot be serialized or the store write fails.
    pub fn set_item<T: Serialize + ?Sized>(&self, key: StorageKey, value: &T) -> Result<()> {
        let encoded = serde_json::to_value(value)
            .map_err(|err| Error::Serialization(format!("Failed to encode {key}: {err}")))?;

        match encoded {
            Value::String(text) => self.store.set(key.as_str(), &text),
            other => self.store.set(key.as_str(), &other.to_string()),
        }
    }

    /// # Errors
    /// Returns an error if the store write fails.
    pub fn remove_item(&self, key: StorageKey) -> Result<()> {
        self.store.remove(key.as_str())
    }

    /// # Errors
    /// Returns an error if the store write fails.
    pub fn clear(&self) -> Result<()> {
        self.store.clear()
    }
}
