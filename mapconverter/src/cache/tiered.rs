//! Two-tier tile cache: memory in front of disk.
//!
//! # Read Path
//!
//! memory hit → return; disk hit → promote into memory, return; otherwise
//! report a miss so the caller fetches from the network.
//!
//! # Write Path
//!
//! Disk first, then memory, so memory is never ahead of disk.
//!
//! Tier errors are logged and treated as misses (reads) or skipped
//! (writes); they never fail a request.
//!
//! # Startup
//!
//! [`TileCache::warm_up`] recounts what the disk tier kept from earlier
//! runs so its size figures start from the real occupancy.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, trace, warn};

use super::providers::{DiskCacheProvider, MemoryCacheProvider};
use super::traits::Cache;
use super::types::TileKey;

/// Point-in-time cache counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub memory_hits: u64,
    pub disk_hits: u64,
    pub misses: u64,
    /// Approximate bytes held by the memory tier
    pub memory_size_bytes: u64,
    pub memory_entries: u64,
    /// Files on disk: the startup scan plus tiles written since
    pub disk_size_bytes: u64,
    pub disk_entries: u64,
}

/// Two-tier tile cache over any pair of [`Cache`] implementations.
pub struct TileCache {
    memory: Arc<dyn Cache>,
    disk: Arc<dyn Cache>,
    memory_hits: AtomicU64,
    disk_hits: AtomicU64,
    misses: AtomicU64,
}

impl TileCache {
    /// Create a tiered cache from explicit tiers.
    ///
    /// # Arguments
    ///
    /// * `memory` - Fast, bounded tier consulted first
    /// * `disk` - Persistent tier consulted on memory misses
    pub fn new(memory: Arc<dyn Cache>, disk: Arc<dyn Cache>) -> Self {
        Self {
            memory,
            disk,
            memory_hits: AtomicU64::new(0),
            disk_hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// The standard moka + filesystem combination.
    pub fn standard(directory: impl Into<PathBuf>, memory_bytes: u64) -> Self {
        Self::new(
            Arc::new(MemoryCacheProvider::new(memory_bytes)),
            Arc::new(DiskCacheProvider::new(directory)),
        )
    }

    /// Look up a tile, promoting disk hits into memory.
    pub async fn get(&self, key: &TileKey) -> Option<Vec<u8>> {
        let cache_key = key.cache_key();

        match self.memory.get(&cache_key).await {
            Ok(Some(data)) => {
                self.memory_hits.fetch_add(1, Ordering::Relaxed);
                trace!(key = %cache_key, "Memory cache hit");
                return Some(data);
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, key = %cache_key, "Memory cache get failed"),
        }

        match self.disk.get(&cache_key).await {
            Ok(Some(data)) => {
                self.disk_hits.fetch_add(1, Ordering::Relaxed);
                debug!(key = %cache_key, "Disk cache hit, promoting to memory");
                if let Err(e) = self.memory.set(&cache_key, data.clone()).await {
                    warn!(error = %e, key = %cache_key, "Memory cache promotion failed");
                }
                Some(data)
            }
            Ok(None) => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
            Err(e) => {
                warn!(error = %e, key = %cache_key, "Disk cache get failed, treating as miss");
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Store a freshly fetched tile in both tiers.
    ///
    /// A disk failure is logged and the memory tier is still populated.
    pub async fn put(&self, key: &TileKey, data: Vec<u8>) {
        let cache_key = key.cache_key();

        if let Err(e) = self.disk.set(&cache_key, data.clone()).await {
            warn!(error = %e, key = %cache_key, "Disk cache set failed");
        }
        if let Err(e) = self.memory.set(&cache_key, data).await {
            warn!(error = %e, key = %cache_key, "Memory cache set failed");
        }
    }

    /// Current approximate memory-tier occupancy in bytes.
    pub fn size_bytes(&self) -> u64 {
        self.memory.size_bytes()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            memory_hits: self.memory_hits.load(Ordering::Relaxed),
            disk_hits: self.disk_hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            memory_size_bytes: self.memory.size_bytes(),
            memory_entries: self.memory.entry_count(),
            disk_size_bytes: self.disk.size_bytes(),
            disk_entries: self.disk.entry_count(),
        }
    }

    /// Scan the disk tier for tiles persisted by earlier runs.
    ///
    /// A failed scan is logged; the cache stays usable with counters that
    /// only cover tiles written from now on.
    pub async fn warm_up(&self) {
        match self.disk.scan().await {
            Ok(()) => info!(
                entries = self.disk.entry_count(),
                bytes = self.disk.size_bytes(),
                "Tile cache ready"
            ),
            Err(e) => warn!(error = %e, "Disk cache scan failed"),
        }
    }

    /// Run pending memory-tier maintenance so size figures are current.
    pub async fn sync(&self) {
        if let Err(e) = self.memory.sync().await {
            warn!(error = %e, "Memory cache maintenance failed");
        }
    }
}
