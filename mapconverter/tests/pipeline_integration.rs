//! Integration tests for the render pipeline.
//!
//! A mock tile server stands in for the network; everything else (two-tier
//! cache, overlay compositing, stitching, rotation, reduction and packing)
//! is the real implementation.
//!
//! Run with: `cargo test --test pipeline_integration`

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::{Rgba, RgbaImage};
use tempfile::TempDir;

use mapconverter::cache::TileCache;
use mapconverter::coord::{to_tile_position, GeoPoint, TilePosition};
use mapconverter::provider::{
    AsyncHttpClient, MapType, ProviderError, SourceCatalog, TileSource,
};
use mapconverter::reduce::OutputMode;
use mapconverter::telemetry::PipelineMetrics;
use mapconverter::tile::{RasterTile, TileLoader, PLACEHOLDER_RGB};
use mapconverter::{MapPipeline, RawRequest, RequestGeometry};

// ============================================================================
// Mock tile server
// ============================================================================

const BASE_TEMPLATE: &str = "http://base.test/{z}/{x}/{y}.png";
const OVERLAY_TEMPLATE: &str = "http://seamark.test/{z}/{x}/{y}.png";

/// Serves a distinct flat color per base tile and a flat overlay,
/// transparent unless configured otherwise.
///
/// URLs listed in `missing` answer like a 404.
struct MockTileServer {
    calls: AtomicUsize,
    missing: Mutex<HashSet<String>>,
    overlay: [u8; 4],
}

impl MockTileServer {
    fn new() -> Self {
        Self::with_overlay([0, 0, 0, 0])
    }

    fn with_overlay(overlay: [u8; 4]) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            missing: Mutex::new(HashSet::new()),
            overlay,
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn mark_missing(&self, url: String) {
        self.missing.lock().unwrap().insert(url);
    }
}

fn tile_color(url: &str) -> [u8; 4] {
    let parts: Vec<u32> = url
        .trim_end_matches(".png")
        .rsplit('/')
        .take(2)
        .map(|p| p.parse().unwrap())
        .collect();
    let (y, x) = (parts[0], parts[1]);
    [(x % 8) as u8 * 30, (y % 8) as u8 * 30, 90, 255]
}

fn png(image: RgbaImage) -> Vec<u8> {
    RasterTile::from_image(image).encode_png().unwrap()
}

/// Shared handle so the test keeps counting after the loader takes ownership.
struct ServerHandle(Arc<MockTileServer>);

impl AsyncHttpClient for ServerHandle {
    async fn get(&self, url: &str) -> Result<Vec<u8>, ProviderError> {
        self.0.respond(url)
    }
}

impl MockTileServer {
    fn respond(&self, url: &str) -> Result<Vec<u8>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.missing.lock().unwrap().contains(url) {
            return Err(ProviderError::HttpError(format!("HTTP 404 for {}", url)));
        }
        if url.starts_with("http://seamark.test/") {
            return Ok(png(RgbaImage::from_pixel(256, 256, Rgba(self.overlay))));
        }
        Ok(png(RgbaImage::from_pixel(256, 256, Rgba(tile_color(url)))))
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

type TestPipeline = MapPipeline<TileLoader<ServerHandle>>;

fn catalog() -> SourceCatalog {
    SourceCatalog::new()
        .with_base_template(MapType::OpenStreetMap, BASE_TEMPLATE)
        .with_overlay_template(OVERLAY_TEMPLATE)
}

/// A pipeline over the mock server with a disk tier in `dir`.
fn pipeline(server: &Arc<MockTileServer>, dir: &TempDir) -> TestPipeline {
    let cache = Arc::new(TileCache::standard(dir.path(), 32 * 1024 * 1024));
    let source = TileSource::new(ServerHandle(Arc::clone(server)), catalog());
    let metrics = Arc::new(PipelineMetrics::new());
    let loader = TileLoader::with_metrics(cache, source, Arc::clone(&metrics));
    MapPipeline::with_metrics(Arc::new(loader), metrics)
}

fn reference_position() -> TilePosition {
    to_tile_position(&GeoPoint::new(53.9028, 11.4441).unwrap(), 15).unwrap()
}

/// An output pixel on the center row that falls in the tile left or right
/// of the center tile, with that tile's x offset.
///
/// Unrotated, output column `px` samples canvas column `px + offset_x + 312`
/// for the 400 px reference width; the center tile spans canvas columns
/// 512..768.
fn side_sample(position: &TilePosition) -> (u32, i64) {
    if position.offset_x < 128 {
        (0, -1)
    } else {
        (399, 1)
    }
}

fn request(pairs: &[(&str, &str)]) -> RequestGeometry {
    let mut raw = RawRequest {
        lat: Some("53.9028".to_string()),
        lon: Some("11.4441".to_string()),
        ..RawRequest::default()
    };
    for (key, value) in pairs {
        let value = Some(value.to_string());
        match *key {
            "mrot" => raw.mrot = value,
            "dtype" => raw.dtype = value,
            "itype" => raw.itype = value,
            other => panic!("unexpected key {other}"),
        }
    }
    RequestGeometry::from_raw(&raw).unwrap()
}

// ============================================================================
// Integration Tests
// ============================================================================

#[tokio::test]
async fn test_reference_request_dimensions() {
    let server = Arc::new(MockTileServer::new());
    let dir = TempDir::new().unwrap();
    let pipeline = pipeline(&server, &dir);

    let image = pipeline.render(&request(&[])).await.unwrap();
    assert_eq!(image.dimensions(), (400, 300));

    let json = pipeline.produce_json(&request(&[])).await.unwrap();
    assert_eq!(json.number_pixels, 300 * 400usize.div_ceil(8));
    assert_eq!(json.number_pixels, 15_000);
    assert_eq!(STANDARD.decode(&json.picture_base64).unwrap().len(), 15_000);
}

#[tokio::test]
async fn test_missing_base_tile_renders_gray() {
    let server = Arc::new(MockTileServer::new());
    let dir = TempDir::new().unwrap();
    let pipeline = pipeline(&server, &dir);

    let center = reference_position().tile;
    server.mark_missing(format!("http://base.test/15/{}/{}.png", center.x, center.y));

    let image = pipeline.render(&request(&[])).await.unwrap();
    assert_eq!(image.get_pixel(200, 150).0, PLACEHOLDER_RGB);

    let snapshot = pipeline.metrics().unwrap().snapshot();
    assert_eq!(snapshot.requests_failed, 0);
    assert_eq!(snapshot.placeholder_tiles, 1);
}

#[tokio::test]
async fn test_missing_side_tile_renders_gray_beside_center() {
    let server = Arc::new(MockTileServer::new());
    let dir = TempDir::new().unwrap();
    let pipeline = pipeline(&server, &dir);

    let position = reference_position();
    let center = position.tile;
    let (px, dx) = side_sample(&position);
    let side = center.neighbor(dx, 0).unwrap();
    server.mark_missing(format!("http://base.test/15/{}/{}.png", side.x, side.y));

    let image = pipeline.render(&request(&[])).await.unwrap();

    assert_eq!(image.get_pixel(px, 150).0, PLACEHOLDER_RGB);
    let center_color = tile_color(&format!("http://base.test/15/{}/{}.png", center.x, center.y));
    assert_eq!(image.get_pixel(200, 150).0, center_color[..3]);

    assert_eq!(pipeline.metrics().unwrap().snapshot().placeholder_tiles, 1);
}

#[tokio::test]
async fn test_missing_overlay_keeps_base_tile() {
    // opaque overlay: every cell with seamarks renders pure white
    let server = Arc::new(MockTileServer::with_overlay([255, 255, 255, 255]));
    let dir = TempDir::new().unwrap();
    let pipeline = pipeline(&server, &dir);

    let position = reference_position();
    let center = position.tile;
    server.mark_missing(format!("http://seamark.test/15/{}/{}.png", center.x, center.y));

    let image = pipeline.render(&request(&[])).await.unwrap();

    let center_color = tile_color(&format!("http://base.test/15/{}/{}.png", center.x, center.y));
    assert_eq!(image.get_pixel(200, 150).0, center_color[..3]);
    let (px, _) = side_sample(&position);
    assert_eq!(image.get_pixel(px, 150).0, [255, 255, 255]);

    // an overlay failure is not a placeholder, and the base-only tile is cached
    let snapshot = pipeline.metrics().unwrap().snapshot();
    assert_eq!(snapshot.placeholder_tiles, 0);
    let calls = server.calls();
    let again = pipeline.render(&request(&[])).await.unwrap();
    assert_eq!(server.calls(), calls);
    assert_eq!(image, again);
}

#[tokio::test]
async fn test_placeholders_are_not_cached() {
    let server = Arc::new(MockTileServer::new());
    let dir = TempDir::new().unwrap();
    let pipeline = pipeline(&server, &dir);

    let center = reference_position().tile;
    server.mark_missing(format!("http://base.test/15/{}/{}.png", center.x, center.y));

    pipeline.render(&request(&[])).await.unwrap();
    let after_first = server.calls();
    pipeline.render(&request(&[])).await.unwrap();

    // only the failed base tile is requested again; no overlay after a base failure
    assert_eq!(server.calls(), after_first + 1);
}

#[tokio::test]
async fn test_repeat_request_served_from_cache() {
    let server = Arc::new(MockTileServer::new());
    let dir = TempDir::new().unwrap();

    let first = pipeline(&server, &dir);
    let image = first.render(&request(&[])).await.unwrap();
    // 4x4 grid: 400/256 and 300/256 round up to 2, plus a margin tile each side
    let fetched = server.calls();
    assert_eq!(fetched, 4 * 4 * 2);

    let again = first.render(&request(&[])).await.unwrap();
    assert_eq!(server.calls(), fetched);
    assert_eq!(image, again);

    // a fresh memory tier over the same directory hits the disk tier
    let second = pipeline(&server, &dir);
    let from_disk = second.render(&request(&[])).await.unwrap();
    assert_eq!(server.calls(), fetched);
    assert_eq!(image, from_disk);
}

#[tokio::test]
async fn test_unknown_dither_matches_floyd_steinberg() {
    let server = Arc::new(MockTileServer::new());
    let dir = TempDir::new().unwrap();
    let pipeline = pipeline(&server, &dir);

    let unknown = pipeline.produce_json(&request(&[("dtype", "99")])).await.unwrap();
    let floyd = pipeline.produce_json(&request(&[("dtype", "2")])).await.unwrap();
    assert_eq!(unknown, floyd);
}

#[tokio::test]
async fn test_full_turn_matches_unrotated() {
    let server = Arc::new(MockTileServer::new());
    let dir = TempDir::new().unwrap();
    let pipeline = pipeline(&server, &dir);

    let straight = pipeline.render(&request(&[])).await.unwrap();
    let full_turn = pipeline.render(&request(&[("mrot", "360")])).await.unwrap();
    assert_eq!(straight, full_turn);

    let tilted = pipeline.render(&request(&[("mrot", "30")])).await.unwrap();
    assert_eq!(tilted.dimensions(), (400, 300));
    assert_ne!(straight, tilted);
}

#[tokio::test]
async fn test_image_modes_and_png() {
    let server = Arc::new(MockTileServer::new());
    let dir = TempDir::new().unwrap();
    let pipeline = pipeline(&server, &dir);

    for itype in ["2", "3", "4"] {
        let image = pipeline.produce_image(&request(&[("itype", itype)])).await.unwrap();
        assert_eq!(image.dimensions(), (400, 300));
    }

    let png = pipeline
        .produce_png(&request(&[("itype", "4")]))
        .await
        .unwrap();
    let decoded = image::load_from_memory(&png).unwrap().to_luma8();
    assert!(decoded.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));

    let geometry = request(&[]).with_output_mode(OutputMode::Grayscale4);
    let gray4 = pipeline.produce_png(&geometry).await.unwrap();
    let decoded = image::load_from_memory(&gray4).unwrap().to_luma8();
    assert!(decoded
        .pixels()
        .all(|p| [0, 64, 128, 192].contains(&p.0[0])));
}

#[tokio::test]
async fn test_json_document_keys() {
    let server = Arc::new(MockTileServer::new());
    let dir = TempDir::new().unwrap();
    let pipeline = pipeline(&server, &dir);

    let json = pipeline
        .produce_json(&request(&[("mrot", "-45.5")]))
        .await
        .unwrap();
    let value = serde_json::to_value(&json).unwrap();
    let object = value.as_object().unwrap();
    let mut keys: Vec<&str> = object.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(
        keys,
        [
            "height",
            "latitude",
            "longitude",
            "map_type",
            "number_pixels",
            "picture_base64",
            "rotation_angle",
            "width"
        ]
    );
    assert_eq!(value["rotation_angle"], -45.5);
}
