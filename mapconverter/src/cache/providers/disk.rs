//! On-disk cache provider.
//!
//! Stores each entry as a file at the key's [`TileKey::relative_path`],
//! e.g. `tile_cache/1/15/17425/10536.png`. Keys that do not parse as a
//! [`TileKey`] are rejected. Entries never expire and are never evicted
//! automatically.
//!
//! # Concurrent Writers
//!
//! Writes go to a uniquely named temporary file in the target directory and
//! are then renamed over the final path. Two requests persisting the same
//! tile therefore both succeed, and readers never observe a partial file.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, info};

use crate::cache::traits::{BoxFuture, Cache, ServiceCacheError};
use crate::cache::types::TileKey;

/// Default directory for the persistent tier.
pub const DEFAULT_DISK_CACHE_DIR: &str = "tile_cache";

/// Distinguishes temporary files written concurrently by one process.
static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// File count and total size of a cache directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiskUsage {
    pub files: usize,
    pub bytes: u64,
}

/// Outcome of clearing a cache directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClearResult {
    pub files_deleted: usize,
    pub bytes_freed: u64,
}

/// On-disk cache provider.
pub struct DiskCacheProvider {
    /// Cache directory path.
    directory: PathBuf,
    /// Current cached size (approximate: initial scan plus bytes written).
    cached_size: AtomicU64,
    /// Current entry count (approximate, same basis as `cached_size`).
    cached_count: AtomicU64,
}

impl DiskCacheProvider {
    /// Creates a provider rooted at `directory`.
    ///
    /// The directory is created lazily on first write.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            cached_size: AtomicU64::new(0),
            cached_count: AtomicU64::new(0),
        }
    }

    /// Scan existing cache size and seed the approximate counters.
    ///
    /// The scan runs in a blocking task to keep the async runtime free.
    pub async fn scan_initial_size(&self) -> Result<DiskUsage, ServiceCacheError> {
        let directory = self.directory.clone();
        let usage = tokio::task::spawn_blocking(move || disk_cache_stats(&directory))
            .await
            .map_err(|e| ServiceCacheError::SpawnError(e.to_string()))??;

        self.cached_size.store(usage.bytes, Ordering::Relaxed);
        self.cached_count.store(usage.files as u64, Ordering::Relaxed);
        info!(
            dir = %self.directory.display(),
            files = usage.files,
            bytes = usage.bytes,
            "Disk cache initial size scanned"
        );
        Ok(usage)
    }

    /// Maps a key to a file below the cache directory.
    ///
    /// The path is rebuilt from the parsed key, so it only ever holds
    /// numeric components below the cache root.
    fn path_for(&self, key: &str) -> Result<PathBuf, ServiceCacheError> {
        TileKey::parse(key)
            .map(|tile_key| self.directory.join(tile_key.relative_path()))
            .ok_or_else(|| ServiceCacheError::InvalidKey(key.to_string()))
    }
}

impl Cache for DiskCacheProvider {
    fn set(&self, key: &str, value: Vec<u8>) -> BoxFuture<'_, Result<(), ServiceCacheError>> {
        let path = self.path_for(key);
        Box::pin(async move {
            let path = path?;
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }

            let mut temp_name = path.as_os_str().to_owned();
            temp_name.push(format!(
                ".{}.{}.tmp",
                std::process::id(),
                TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
            ));
            let temp_path = PathBuf::from(temp_name);

            let len = value.len() as u64;
            if let Err(e) = tokio::fs::write(&temp_path, value).await {
                let _ = tokio::fs::remove_file(&temp_path).await;
                return Err(e.into());
            }
            if let Err(e) = tokio::fs::rename(&temp_path, &path).await {
                let _ = tokio::fs::remove_file(&temp_path).await;
                return Err(e.into());
            }

            self.cached_size.fetch_add(len, Ordering::Relaxed);
            self.cached_count.fetch_add(1, Ordering::Relaxed);
            debug!(path = %path.display(), bytes = len, "Tile persisted to disk cache");
            Ok(())
        })
    }

    fn get(&self, key: &str) -> BoxFuture<'_, Result<Option<Vec<u8>>, ServiceCacheError>> {
        let path = self.path_for(key);
        Box::pin(async move {
            match tokio::fs::read(path?).await {
                Ok(data) => Ok(Some(data)),
                Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
    }

    fn size_bytes(&self) -> u64 {
        self.cached_size.load(Ordering::Relaxed)
    }

    fn entry_count(&self) -> u64 {
        self.cached_count.load(Ordering::Relaxed)
    }

    fn scan(&self) -> BoxFuture<'_, Result<(), ServiceCacheError>> {
        Box::pin(async move { self.scan_initial_size().await.map(|_| ()) })
    }
}

/// Collect all cached tile files below `directory` with their sizes.
///
/// Temporary files from in-flight writes are skipped. A missing directory
/// yields an empty list.
fn collect_cache_files(directory: &Path) -> io::Result<Vec<(PathBuf, u64)>> {
    let mut files = Vec::new();
    let mut pending = vec![directory.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
            Err(e) => return Err(e),
        };
        for entry in entries {
            let entry = entry?;
            let file_type = entry.file_type()?;
            let path = entry.path();
            if file_type.is_dir() {
                pending.push(path);
            } else if file_type.is_file() && path.extension().is_some_and(|ext| ext == "png") {
                files.push((path, entry.metadata()?.len()));
            }
        }
    }

    Ok(files)
}

/// Count the files and bytes stored in a disk cache directory.
pub fn disk_cache_stats(directory: &Path) -> io::Result<DiskUsage> {
    let files = collect_cache_files(directory)?;
    Ok(DiskUsage {
        files: files.len(),
        bytes: files.iter().map(|(_, size)| size).sum(),
    })
}

/// Delete every cached tile and the directory tree holding them.
pub fn clear_disk_cache(directory: &Path) -> io::Result<ClearResult> {
    let usage = disk_cache_stats(directory)?;
    match std::fs::remove_dir_all(directory) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }
    Ok(ClearResult {
        files_deleted: usage.files,
        bytes_freed: usage.bytes,
    })
}
