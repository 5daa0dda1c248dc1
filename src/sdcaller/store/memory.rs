use super::backend::KvBackend;
use crate::error::{Result, SdCallerError};
use std::cell::RefCell;
use std::collections::BTreeMap;

/// In-memory key-value backend for testing.
///
/// Uses `RefCell` for interior mutability since sdcaller is single-threaded.
#[derive(Default)]
pub struct MemBackend {
    items: RefCell<BTreeMap<String, String>>,
    simulate_write_error: RefCell<bool>,
    simulate_unavailable: RefCell<bool>,
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every write fail, as a full quota would.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        *self.simulate_write_error.borrow_mut() = simulate;
    }

    /// Make every operation fail, as a store disabled by privacy settings would.
    pub fn set_simulate_unavailable(&self, simulate: bool) {
        *self.simulate_unavailable.borrow_mut() = simulate;
    }

    /// Snapshot of all stored items, for asserting the store is unchanged.
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.items.borrow().clone()
    }

    fn check_available(&self) -> Result<()> {
        if *self.simulate_unavailable.borrow() {
            return Err(SdCallerError::Store("Simulated unavailable store".to_string()));
        }
        Ok(())
    }
}

impl KvBackend for MemBackend {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        self.check_available()?;
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.check_available()?;
        if *self.simulate_write_error.borrow() {
            return Err(SdCallerError::Store("Simulated write error".to_string()));
        }
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.check_available()?;
        self.items.borrow_mut().remove(key);
        Ok(())
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;
    use crate::model::{PracticeSession, UserProfile};
    use crate::store::{LocalStore, USER_KEY};
    use chrono::{TimeZone, Utc};

    pub struct StoreFixture {
        pub store: LocalStore<MemBackend>,
    }

    impl Default for StoreFixture {
        fn default() -> Self {
            Self::new()
        }
    }

    impl StoreFixture {
        pub fn new() -> Self {
            Self {
                store: LocalStore::new(MemBackend::new()),
            }
        }

        /// Profile with a fixed creation time so tests can compare values.
        pub fn profile(name: &str) -> UserProfile {
            let created = Utc.with_ymd_and_hms(2024, 3, 9, 19, 30, 0).unwrap();
            UserProfile::new(name.to_string(), created)
        }

        pub fn with_profile(self, name: &str) -> Self {
            let profile = Self::profile(name);
            self.store.try_save(USER_KEY, &profile).unwrap();
            self
        }

        pub fn with_practiced_profile(self, name: &str) -> Self {
            let mut profile = Self::profile(name);
            profile.stats.record(&PracticeSession {
                calls: 120,
                successful: 9,
                failed: 3,
            });
            self.store.try_save(USER_KEY, &profile).unwrap();
            self
        }

        /// Store a raw string, bypassing serialization and validation.
        pub fn with_raw(self, key: &str, raw: &str) -> Self {
            self.store.backend().set_item(key, raw).unwrap();
            self
        }
    }
}
