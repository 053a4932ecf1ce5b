//! Tile caching.
//!
//! A bounded memory tier (moka) sits in front of a persistent disk tier.
//! Both implement the generic [`Cache`] trait; [`TileCache`] composes them
//! and speaks in [`TileKey`]s.
//!
//! ```text
//! TileLoader ──► TileCache ──► MemoryCacheProvider (bounded, 512 MiB default)
//!                          └─► DiskCacheProvider   (tile_cache/<map>/<z>/<x>/<y>.png)
//! ```

mod providers;
mod tiered;
mod traits;
mod types;

pub use providers::{
    clear_disk_cache, disk_cache_stats, ClearResult, DiskCacheProvider, DiskUsage,
    MemoryCacheProvider, DEFAULT_DISK_CACHE_DIR, DEFAULT_MEMORY_CACHE_BYTES,
};
pub use tiered::{CacheStats, TileCache};
pub use traits::{BoxFuture, Cache, ServiceCacheError};
pub use types::TileKey;
