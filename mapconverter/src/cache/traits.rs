//! Storage interface shared by the memory and disk tiers.
//!
//! Keys are `TileKey::cache_key()` strings and values are encoded PNG bytes.
//! Methods return boxed futures so `TileCache` can hold either tier as
//! `Arc<dyn Cache>` and tests can substitute failing tiers.

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceCacheError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Key cannot be mapped to a storage location
    #[error("Invalid cache key: {0}")]
    InvalidKey(String),

    #[error("Failed to spawn task: {0}")]
    SpawnError(String),
}

/// Boxed future type for dyn-compatible async methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A byte store for one cache tier.
pub trait Cache: Send + Sync {
    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: Vec<u8>) -> BoxFuture<'_, Result<(), ServiceCacheError>>;

    /// `Ok(None)` when the key is absent.
    fn get(&self, key: &str) -> BoxFuture<'_, Result<Option<Vec<u8>>, ServiceCacheError>>;

    /// Approximate bytes held.
    fn size_bytes(&self) -> u64;

    fn entry_count(&self) -> u64;

    /// Apply pending bookkeeping so `size_bytes` and `entry_count` are
    /// current. Tiers without deferred work keep the default.
    fn sync(&self) -> BoxFuture<'_, Result<(), ServiceCacheError>> {
        Box::pin(async { Ok(()) })
    }

    /// Recount entries that already exist in storage, e.g. tiles a
    /// persistent tier kept across a restart. Volatile tiers keep the default.
    fn scan(&self) -> BoxFuture<'_, Result<(), ServiceCacheError>> {
        Box::pin(async { Ok(()) })
    }
}
