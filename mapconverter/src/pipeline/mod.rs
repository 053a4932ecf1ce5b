//! End-to-end render pipeline.
//!
//! ```text
//! RequestGeometry
//!   │  to_tile_position
//!   ▼
//! MosaicLayout ──► stitch (async, tiles fetched concurrently)
//!   │
//!   ▼  spawn_blocking
//! [decorate] ──► rotate_and_crop ──┬─► reduce(OutputMode) ──► PNG          (produce_png)
//!                                  └─► dither ──► pack_bits ──► base64     (produce_json)
//! ```
//!
//! Network waits happen only while stitching; the CPU-bound stages run on
//! the blocking pool so they never stall the async workers.

mod error;
mod geometry;

pub use error::PipelineError;
pub use geometry::{
    RawRequest, RequestGeometry, DEFAULT_HEIGHT, DEFAULT_WIDTH, DEFAULT_ZOOM, MAX_HEIGHT,
    MAX_ROTATION, MAX_WIDTH, MIN_HEIGHT, MIN_ROTATION, MIN_WIDTH,
};

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::RgbImage;
use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::cache::TileCache;
use crate::config::ConfigFile;
use crate::coord::to_tile_position;
use crate::mosaic::{decorate, rotate_and_crop, stitch, MosaicLayout};
use crate::provider::{AsyncReqwestClient, TileSource};
use crate::reduce::{dither, luminance, pack_bits, reduce, ReducedImage};
use crate::telemetry::PipelineMetrics;
use crate::tile::{TileFetcher, TileLoader};

/// JSON document returned for embedded displays.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapJson {
    pub latitude: f64,
    pub longitude: f64,
    pub rotation_angle: f64,
    pub map_type: u8,
    pub width: u32,
    pub height: u32,
    /// Length of the packed byte sequence (not the pixel count)
    pub number_pixels: usize,
    pub picture_base64: String,
}

/// The pipeline wired to the real network and the two-tier cache.
pub type HttpMapPipeline = MapPipeline<TileLoader<AsyncReqwestClient>>;

/// Renders map images from request geometry.
pub struct MapPipeline<F: TileFetcher> {
    fetcher: Arc<F>,
    metrics: Option<Arc<PipelineMetrics>>,
}

impl<F: TileFetcher> MapPipeline<F> {
    pub fn new(fetcher: Arc<F>) -> Self {
        Self {
            fetcher,
            metrics: None,
        }
    }

    pub fn with_metrics(fetcher: Arc<F>, metrics: Arc<PipelineMetrics>) -> Self {
        Self {
            fetcher,
            metrics: Some(metrics),
        }
    }

    pub fn fetcher(&self) -> &Arc<F> {
        &self.fetcher
    }

    pub fn metrics(&self) -> Option<&Arc<PipelineMetrics>> {
        self.metrics.as_ref()
    }

    /// Stitch, rotate about the requested point, and crop to size.
    #[instrument(skip(self), fields(
        lat = geometry.point.latitude,
        lon = geometry.point.longitude,
        zoom = geometry.zoom,
    ))]
    pub async fn render(&self, geometry: &RequestGeometry) -> Result<RgbImage, PipelineError> {
        let position = to_tile_position(&geometry.point, geometry.zoom)?;
        let layout = MosaicLayout::new(position, geometry.width, geometry.height);
        let mosaic = stitch(self.fetcher.as_ref(), &layout, geometry.map_type).await;

        let geometry = *geometry;
        let image = tokio::task::spawn_blocking(move || {
            let canvas = if geometry.debug {
                decorate(&mosaic.canvas, &mosaic.layout)
            } else {
                mosaic.canvas
            };
            rotate_and_crop(
                &canvas,
                mosaic.focal,
                geometry.rotation_degrees,
                geometry.width,
                geometry.height,
            )
        })
        .await?;

        debug!(
            tile = %position.tile,
            rotation = geometry.rotation_degrees,
            width = geometry.width,
            height = geometry.height,
            "Map rendered"
        );
        Ok(image)
    }

    /// Render and reduce to the requested output mode.
    pub async fn produce_image(
        &self,
        geometry: &RequestGeometry,
    ) -> Result<ReducedImage, PipelineError> {
        self.observe(async {
            let image = self.render(geometry).await?;
            let (mode, dither_type) = (geometry.output_mode, geometry.dither_type);
            Ok(tokio::task::spawn_blocking(move || reduce(&image, mode, dither_type)).await?)
        })
        .await
    }

    /// Render, reduce, and encode as PNG.
    pub async fn produce_png(&self, geometry: &RequestGeometry) -> Result<Vec<u8>, PipelineError> {
        self.observe(async {
            let image = self.render(geometry).await?;
            let (mode, dither_type) = (geometry.output_mode, geometry.dither_type);
            let png = tokio::task::spawn_blocking(move || {
                reduce(&image, mode, dither_type).encode_png()
            })
            .await??;
            debug!(
                itype = mode.id(),
                dtype = dither_type.id(),
                bytes = png.len(),
                "PNG encoded"
            );
            Ok(png)
        })
        .await
    }

    /// Render, dither, bit-pack, and wrap the bytes in the JSON document.
    ///
    /// Always dithers, whatever the output mode says.
    pub async fn produce_json(&self, geometry: &RequestGeometry) -> Result<MapJson, PipelineError> {
        self.observe(async {
            let image = self.render(geometry).await?;
            let dither_type = geometry.dither_type;
            let packed = tokio::task::spawn_blocking(move || {
                pack_bits(&dither(&luminance(&image), dither_type))
            })
            .await?;
            debug!(dtype = dither_type.id(), bytes = packed.len(), "Bitmap packed");

            Ok(MapJson {
                latitude: geometry.point.latitude,
                longitude: geometry.point.longitude,
                rotation_angle: geometry.rotation_degrees,
                map_type: geometry.map_type.id(),
                width: geometry.width,
                height: geometry.height,
                number_pixels: packed.len(),
                picture_base64: STANDARD.encode(&packed),
            })
        })
        .await
    }

    async fn observe<T>(
        &self,
        work: impl Future<Output = Result<T, PipelineError>>,
    ) -> Result<T, PipelineError> {
        let started = Instant::now();
        if let Some(ref m) = self.metrics {
            m.request_started();
        }

        let result = work.await;

        match (&result, &self.metrics) {
            (Ok(_), Some(m)) => m.request_completed(started.elapsed()),
            (Err(e), Some(m)) => {
                m.request_failed();
                warn!(error = %e, "Render request failed");
            }
            (Err(e), None) => warn!(error = %e, "Render request failed"),
            (Ok(_), None) => {}
        }
        result
    }
}

impl HttpMapPipeline {
    /// Build the networked pipeline from configuration.
    pub fn from_config(
        config: &ConfigFile,
        metrics: Arc<PipelineMetrics>,
    ) -> Result<Self, PipelineError> {
        let http = AsyncReqwestClient::with_timeout(Duration::from_secs(config.download.timeout))?;
        let source = TileSource::new(http, config.providers.catalog());
        let cache = Arc::new(TileCache::standard(
            config.cache.directory.clone(),
            config.cache.memory_size,
        ));
        let loader = TileLoader::with_metrics(cache, source, Arc::clone(&metrics));
        Ok(Self::with_metrics(Arc::new(loader), metrics))
    }

    /// The tile cache behind the loader.
    pub fn cache(&self) -> &Arc<TileCache> {
        self.fetcher.cache()
    }
}
