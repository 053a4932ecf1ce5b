//! Read-through tile loading: cache first, network on a miss.

use std::future::Future;
use std::sync::Arc;

use tracing::warn;

use super::RasterTile;
use crate::cache::{TileCache, TileKey};
use crate::coord::TileCoord;
use crate::provider::{AsyncHttpClient, FetchedTile, MapType, TileSource};
use crate::telemetry::PipelineMetrics;

/// Anything that can supply a composited tile for a grid cell.
///
/// Implementations must always produce a tile; failures degrade to a
/// placeholder rather than an error.
pub trait TileFetcher: Send + Sync {
    fn fetch_tile(
        &self,
        tile: TileCoord,
        map_type: MapType,
    ) -> impl Future<Output = RasterTile> + Send;
}

/// Serves tiles from the two-tier cache, falling back to the remote source.
///
/// Fresh tiles are written through the cache as PNG. Placeholders are
/// returned but never cached, so the next request retries the network.
pub struct TileLoader<H: AsyncHttpClient> {
    cache: Arc<TileCache>,
    source: TileSource<H>,
    metrics: Option<Arc<PipelineMetrics>>,
}

impl<H: AsyncHttpClient> TileLoader<H> {
    /// Create a loader without metrics.
    pub fn new(cache: Arc<TileCache>, source: TileSource<H>) -> Self {
        Self {
            cache,
            source,
            metrics: None,
        }
    }

    /// Create a loader that reports network and placeholder counts.
    pub fn with_metrics(
        cache: Arc<TileCache>,
        source: TileSource<H>,
        metrics: Arc<PipelineMetrics>,
    ) -> Self {
        Self {
            cache,
            source,
            metrics: Some(metrics),
        }
    }

    pub fn cache(&self) -> &Arc<TileCache> {
        &self.cache
    }

    /// Load one tile.
    pub async fn load(&self, tile: TileCoord, map_type: MapType) -> RasterTile {
        let key = TileKey::new(map_type, tile);

        if let Some(bytes) = self.cache.get(&key).await {
            match RasterTile::decode(&bytes) {
                Ok(raster) => return raster,
                Err(e) => warn!(error = %e, key = %key, "Cached tile is corrupt, refetching"),
            }
        }

        if let Some(ref m) = self.metrics {
            m.tile_downloaded();
        }

        match self.source.fetch(&tile, map_type).await {
            FetchedTile::Fresh(raster) => {
                match raster.encode_png() {
                    Ok(bytes) => self.cache.put(&key, bytes).await,
                    Err(e) => warn!(error = %e, key = %key, "Tile encoding failed, not cached"),
                }
                raster
            }
            FetchedTile::Placeholder(raster) => {
                if let Some(ref m) = self.metrics {
                    m.tile_placeholder();
                }
                raster
            }
        }
    }
}

impl<H: AsyncHttpClient> TileFetcher for TileLoader<H> {
    fn fetch_tile(
        &self,
        tile: TileCoord,
        map_type: MapType,
    ) -> impl Future<Output = RasterTile> + Send {
        self.load(tile, map_type)
    }
}
