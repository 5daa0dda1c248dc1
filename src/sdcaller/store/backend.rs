use crate::error::Result;

/// Abstract interface for raw key-value I/O.
///
/// All methods take `&self`: the application is single-threaded and backends
/// that need mutation use interior mutability.
pub trait KvBackend {
    /// Read the string stored at `key`.
    /// Returns Ok(None) if the key was never set or has been removed.
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Write `value` under `key`, replacing any previous value.
    /// MUST be atomic: readers see either the old value or the new one.
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Delete `key`. Deleting a missing key is not an error.
    fn remove_item(&self, key: &str) -> Result<()>;
}
