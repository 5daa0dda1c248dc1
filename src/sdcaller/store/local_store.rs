use super::backend::KvBackend;
use super::{KNOWN_KEYS, PROBE_KEY};
use crate::error::{Result, SdCallerError};
use crate::schema::{Schema, SchemaRejection};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

/// What sits at a key, classified without throwing anything away.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredState<T> {
    Absent,
    Valid(T),
    /// The backend could not be read at all.
    Unreadable(String),
    /// The stored text is not JSON.
    Malformed(String),
    /// JSON, but not the expected shape.
    Invalid(SchemaRejection),
}

/// JSON-over-key-value adapter. The only owner of the stored representation.
///
/// Reads never fail: missing, unreadable, malformed or stale data all come
/// back as `None` and are reported on the diagnostic channel. Writes come in
/// two flavors, [`LocalStore::save`] (best effort, logged) and
/// [`LocalStore::try_save`] (returns the error).
pub struct LocalStore<B: KvBackend> {
    backend: B,
    known_keys: Vec<String>,
}

impl<B: KvBackend> LocalStore<B> {
    pub fn new(backend: B) -> Self {
        Self::with_known_keys(backend, KNOWN_KEYS)
    }

    pub fn with_known_keys(backend: B, known_keys: &[&str]) -> Self {
        Self {
            backend,
            known_keys: known_keys.iter().map(|k| k.to_string()).collect(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn known_keys(&self) -> &[String] {
        &self.known_keys
    }

    /// Serialize `value` and write it under `key`.
    pub fn try_save<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value).map_err(SdCallerError::Serialization)?;
        self.backend.set_item(key, &raw)?;
        debug!(key, bytes = raw.len(), "saved");
        Ok(())
    }

    /// Best-effort write. Failure is logged, never returned.
    pub fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        if let Err(e) = self.try_save(key, value) {
            warn!(key, error = %e, "failed to save to local store");
        }
    }

    /// Read, parse and validate the value at `key`, keeping the failure reason.
    pub fn inspect<S: Schema>(&self, key: &str, schema: &S) -> StoredState<S::Output> {
        let raw = match self.backend.get_item(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return StoredState::Absent,
            Err(e) => return StoredState::Unreadable(e.to_string()),
        };

        let value: Value = match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => return StoredState::Malformed(e.to_string()),
        };

        match schema.validate(&value) {
            Ok(parsed) => StoredState::Valid(parsed),
            Err(rejection) => StoredState::Invalid(rejection),
        }
    }

    /// Validated read. Anything but a valid value is `None`.
    pub fn load<S: Schema>(&self, key: &str, schema: &S) -> Option<S::Output> {
        match self.inspect(key, schema) {
            StoredState::Valid(value) => Some(value),
            StoredState::Absent => None,
            StoredState::Unreadable(reason) => {
                warn!(key, error = %reason, "failed to read from local store");
                None
            }
            StoredState::Malformed(reason) => {
                warn!(key, error = %reason, "stored value is not valid JSON");
                None
            }
            StoredState::Invalid(rejection) => {
                warn!(key, schema = schema.name(), error = %rejection, "stored value failed validation");
                None
            }
        }
    }

    /// Tolerant read: JSON parsing only, no schema.
    pub fn load_raw(&self, key: &str) -> Option<Value> {
        let raw = match self.backend.get_item(key) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(key, error = %e, "failed to read from local store");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "stored value is not valid JSON");
                None
            }
        }
    }

    pub fn try_remove(&self, key: &str) -> Result<()> {
        self.backend.remove_item(key)?;
        debug!(key, "removed");
        Ok(())
    }

    /// Delete `key`. Missing keys are fine; failures are logged.
    pub fn remove(&self, key: &str) {
        if let Err(e) = self.try_remove(key) {
            warn!(key, error = %e, "failed to remove from local store");
        }
    }

    /// Remove every configured key, leaving anything else in the store alone.
    pub fn clear_known_keys(&self) {
        for key in &self.known_keys {
            self.remove(key);
        }
    }

    /// Write-then-delete probe. `false` means the store cannot be used at all.
    pub fn is_available(&self) -> bool {
        let probe = self
            .backend
            .set_item(PROBE_KEY, "1")
            .and_then(|_| self.backend.remove_item(PROBE_KEY));
        match probe {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "local store is not available");
                false
            }
        }
    }
}
