//! Persistent key-value store seam.

use crate::error::Result;

/// Durable, string-keyed, string-valued store.
///
/// Reads and writes are synchronous; implementations serialise access
/// internally so a read-modify-write sequence from one caller is never
/// interleaved with a write from another.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes the entry. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}
