//! Key-value persistence contract.
//!
//! The history store persists through this trait only, so the storage
//! engine (memory, files, platform preferences) stays swappable.

use crate::error::Result;
use async_trait::async_trait;

/// A minimal byte-oriented key-value store.
///
/// # Implementation Notes
///
/// - `get` on a missing key returns `Ok(None)`, not an error
/// - `set` replaces the whole value for the key
/// - `remove` on a missing key is a no-op
/// - Failures map to `GeoportError::PersistenceFailure`
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<()>;

    async fn remove(&self, key: &str) -> Result<()>;
}
