//! Cache provider implementations.
//!
//! Each provider implements the `Cache` trait and manages its own lifecycle.
//!
//! # Available Providers
//!
//! - [`MemoryCacheProvider`]: In-memory byte-bounded cache using moka
//! - [`DiskCacheProvider`]: On-disk cache keyed by relative tile paths

mod disk;
mod memory;

pub use disk::{
    clear_disk_cache, disk_cache_stats, ClearResult, DiskCacheProvider, DiskUsage,
    DEFAULT_DISK_CACHE_DIR,
};
pub use memory::{MemoryCacheProvider, DEFAULT_MEMORY_CACHE_BYTES};
