//! In-memory value kept in lockstep with one store key.
//!
//! The binding loads once on construction and writes through on every
//! [`StoredValue::set`]. There is no batching or dirty tracking: each change
//! is its own durable write. The store stays authoritative; the binding is a
//! session-scoped copy.

use crate::error::Result;
use crate::model::UserProfile;
use crate::schema::{ProfileSchema, Schema};
use crate::store::{KvBackend, LocalStore, USER_KEY};
use serde::Serialize;

pub struct StoredValue<'a, B: KvBackend, S: Schema> {
    store: &'a LocalStore<B>,
    key: String,
    value: Option<S::Output>,
}

/// The profile binding used by every UI-facing operation.
pub type ProfileBinding<'a, B> = StoredValue<'a, B, ProfileSchema>;

impl<'a, B, S> StoredValue<'a, B, S>
where
    B: KvBackend,
    S: Schema,
    S::Output: Serialize + Clone,
{
    /// Load the value at `key`, falling back to `default` when the store has
    /// nothing valid there. The default is not written back.
    pub fn new(
        store: &'a LocalStore<B>,
        key: impl Into<String>,
        schema: &S,
        default: Option<S::Output>,
    ) -> Self {
        let key = key.into();
        let value = store.load(&key, schema).or(default);
        Self { store, key, value }
    }

    pub fn get(&self) -> Option<&S::Output> {
        self.value.as_ref()
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Replace the value and persist it immediately. `None` removes the key.
    pub fn set(&mut self, value: Option<S::Output>) {
        match &value {
            Some(v) => self.store.save(&self.key, v),
            None => self.store.remove(&self.key),
        }
        self.value = value;
    }

    /// Like [`StoredValue::set`], but the in-memory value only changes once the
    /// write has succeeded, and the failure is returned.
    pub fn try_set(&mut self, value: Option<S::Output>) -> Result<()> {
        match &value {
            Some(v) => self.store.try_save(&self.key, v)?,
            None => self.store.try_remove(&self.key)?,
        }
        self.value = value;
        Ok(())
    }

    /// Read-modify-write on the current value. A no-op when there is none.
    pub fn update<F>(&mut self, f: F) -> bool
    where
        F: FnOnce(&mut S::Output),
    {
        let Some(mut current) = self.value.clone() else {
            return false;
        };
        f(&mut current);
        self.set(Some(current));
        true
    }
}

impl<'a, B: KvBackend> StoredValue<'a, B, ProfileSchema> {
    /// Bind to the stored user profile, defaulting to "no profile".
    pub fn profile(store: &'a LocalStore<B>) -> Self {
        Self::new(store, USER_KEY, &ProfileSchema, None::<UserProfile>)
    }
}
