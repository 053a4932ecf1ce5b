//! Remote tile source: base layer plus seamark overlay.
//!
//! A fetch always yields a tile. Base-layer failures degrade to the gray
//! placeholder (and skip the overlay); overlay failures degrade to a
//! transparent overlay, leaving the base untouched. The two outcomes are
//! distinguished so callers can avoid caching placeholders.

use image::imageops;
use tracing::{debug, warn};

use super::catalog::SourceCatalog;
use super::http::AsyncHttpClient;
use super::types::{MapType, ProviderError};
use crate::coord::TileCoord;
use crate::tile::RasterTile;

/// Result of a remote fetch.
#[derive(Debug, Clone)]
pub enum FetchedTile {
    /// Base tile downloaded, overlay composited if available.
    Fresh(RasterTile),
    /// Base tile unavailable; a placeholder stands in for this request only.
    Placeholder(RasterTile),
}

/// Fetches and composites tiles from the configured providers.
pub struct TileSource<H: AsyncHttpClient> {
    http_client: H,
    catalog: SourceCatalog,
}

impl<H: AsyncHttpClient> TileSource<H> {
    /// Creates a source using the given HTTP client and URL catalog.
    pub fn new(http_client: H, catalog: SourceCatalog) -> Self {
        Self {
            http_client,
            catalog,
        }
    }

    /// Downloads the base tile for `map_type` and composites the overlay.
    ///
    /// Failures are logged and never retried within the same call.
    pub async fn fetch(&self, tile: &TileCoord, map_type: MapType) -> FetchedTile {
        let base_url = self.catalog.base_url(map_type, tile);
        let base = match self.download(&base_url).await {
            Ok(base) => base,
            Err(e) => {
                warn!(
                    tile = %tile,
                    map_type = map_type.id(),
                    error = %e,
                    "Base tile could not be loaded, using placeholder"
                );
                return FetchedTile::Placeholder(RasterTile::placeholder());
            }
        };

        let overlay_url = self.catalog.overlay_url(tile);
        match self.download(&overlay_url).await {
            Ok(overlay) => {
                let mut composite = base.image().clone();
                imageops::overlay(&mut composite, overlay.image(), 0, 0);
                debug!(tile = %tile, map_type = map_type.id(), "Tile composited with overlay");
                FetchedTile::Fresh(RasterTile::from_image(composite))
            }
            Err(e) => {
                warn!(
                    tile = %tile,
                    error = %e,
                    "Overlay tile could not be loaded, continuing without seamarks"
                );
                FetchedTile::Fresh(base)
            }
        }
    }

    async fn download(&self, url: &str) -> Result<RasterTile, ProviderError> {
        let bytes = self.http_client.get(url).await?;
        RasterTile::decode(&bytes).map_err(|e| ProviderError::InvalidResponse(e.to_string()))
    }
}
