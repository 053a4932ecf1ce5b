//! Memory tier backed by `moka::future::Cache`.
//!
//! Entries are weighted by their byte length, so the capacity is a byte
//! budget. moka applies evictions and size accounting lazily; call
//! [`Cache::sync`] before reading figures that must be exact.

use moka::future::Cache as MokaCache;
use tracing::trace;

use crate::cache::traits::{BoxFuture, Cache, ServiceCacheError};

/// Default memory budget (512 MiB).
pub const DEFAULT_MEMORY_CACHE_BYTES: u64 = 512 * 1024 * 1024;

pub struct MemoryCacheProvider {
    tiles: MokaCache<String, Vec<u8>>,
}

impl MemoryCacheProvider {
    pub fn new(budget_bytes: u64) -> Self {
        let tiles = MokaCache::builder()
            // weights are u32; a single tile never comes close
            .weigher(|_key: &String, png: &Vec<u8>| png.len().min(u32::MAX as usize) as u32)
            .max_capacity(budget_bytes)
            .build();

        Self { tiles }
    }
}

impl Default for MemoryCacheProvider {
    fn default() -> Self {
        Self::new(DEFAULT_MEMORY_CACHE_BYTES)
    }
}

impl Cache for MemoryCacheProvider {
    fn set(&self, key: &str, value: Vec<u8>) -> BoxFuture<'_, Result<(), ServiceCacheError>> {
        let key = key.to_string();
        Box::pin(async move {
            self.tiles.insert(key, value).await;
            Ok(())
        })
    }

    fn get(&self, key: &str) -> BoxFuture<'_, Result<Option<Vec<u8>>, ServiceCacheError>> {
        let key = key.to_string();
        Box::pin(async move { Ok(self.tiles.get(&key).await) })
    }

    fn size_bytes(&self) -> u64 {
        self.tiles.weighted_size()
    }

    fn entry_count(&self) -> u64 {
        self.tiles.entry_count()
    }

    fn sync(&self) -> BoxFuture<'_, Result<(), ServiceCacheError>> {
        Box::pin(async move {
            self.tiles.run_pending_tasks().await;
            trace!(
                bytes = self.tiles.weighted_size(),
                entries = self.tiles.entry_count(),
                "Memory tier synced"
            );
            Ok(())
        })
    }
}
