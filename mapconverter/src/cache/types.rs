//! Cache key for composited tiles.

use std::fmt;
use std::path::PathBuf;

use crate::coord::{TileCoord, MAX_ZOOM};
use crate::provider::MapType;

/// Identifies one composited tile in both cache tiers.
///
/// The string form `"{map_type}/{zoom}/{x}/{y}.png"` is the memory key and,
/// read as a relative path, the file location under the disk cache root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileKey {
    pub map_type: MapType,
    pub tile: TileCoord,
}

impl TileKey {
    pub fn new(map_type: MapType, tile: TileCoord) -> Self {
        Self { map_type, tile }
    }

    /// Key used by every cache tier.
    pub fn cache_key(&self) -> String {
        format!(
            "{}/{}/{}/{}.png",
            self.map_type.id(),
            self.tile.zoom,
            self.tile.x,
            self.tile.y
        )
    }

    /// Path of the tile relative to the disk cache root.
    pub fn relative_path(&self) -> PathBuf {
        PathBuf::from(self.map_type.id().to_string())
            .join(self.tile.zoom.to_string())
            .join(self.tile.x.to_string())
            .join(format!("{}.png", self.tile.y))
    }

    /// Parses a key produced by [`TileKey::cache_key`].
    ///
    /// Returns `None` for anything that is not exactly such a key,
    /// including unknown map ids and out-of-range tiles.
    pub fn parse(key: &str) -> Option<Self> {
        let mut parts = key.split('/');
        let map_id: u8 = parts.next()?.parse().ok()?;
        let zoom: u8 = parts.next()?.parse().ok()?;
        let x: u32 = parts.next()?.parse().ok()?;
        let y: u32 = parts.next()?.strip_suffix(".png")?.parse().ok()?;
        if parts.next().is_some() || zoom > MAX_ZOOM {
            return None;
        }

        let map_type = MapType::from_id(map_id as i64);
        let n = TileCoord::tiles_per_axis(zoom);
        if map_type.id() != map_id || x >= n || y >= n {
            return None;
        }

        Some(Self::new(map_type, TileCoord { x, y, zoom }))
    }
}

impl fmt::Display for TileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.cache_key())
    }
}
