//! # Storage Layer
//!
//! All persistence goes through a flat string key-value store, the same model
//! a browser's `localStorage` offers. The layer is split in two:
//!
//! - [`backend::KvBackend`]: raw `get`/`set`/`remove` of strings. Knows nothing
//!   about JSON or profiles.
//! - [`local_store::LocalStore`]: the adapter everything else talks to. Adds
//!   JSON encoding, schema validation on read, best-effort writes, and the
//!   availability probe.
//!
//! ## Implementations
//!
//! - [`fs::FileBackend`]: production storage, one file per key
//!   ```text
//!   <data dir>/
//!   ├── sdcaller.user.json   # the single persisted profile
//!   └── config.json          # app configuration (not a store key)
//!   ```
//! - [`memory::MemBackend`]: in-memory storage for tests, with failure simulation
//!
//! ## Known Keys
//!
//! The store shares its namespace with anything else that writes there, so
//! [`local_store::LocalStore::clear_known_keys`] only removes the keys listed in
//! its configured set. The default set is [`KNOWN_KEYS`].

pub mod backend;
pub mod fs;
pub mod local_store;
pub mod memory;

pub use backend::KvBackend;
pub use local_store::{LocalStore, StoredState};

/// Key holding the JSON-encoded user profile.
pub const USER_KEY: &str = "sdcaller.user";

/// Every key this application owns.
pub const KNOWN_KEYS: &[&str] = &[USER_KEY];

/// Scratch key used by the availability probe. Never holds real data.
pub(crate) const PROBE_KEY: &str = "sdcaller.__probe__";
