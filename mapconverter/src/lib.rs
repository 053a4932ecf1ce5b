//! Maps Converter - map tile compositing for low-bandwidth displays
//!
//! This library turns a geographic position, zoom, size and heading into a
//! map image: it fetches the surrounding raster tiles
//! (base layer plus a seamark overlay) through a two-tier cache, stitches
//! them, rotates about the requested point, crops, and optionally reduces the
//! result to grayscale or bit-packed dithered monochrome.

pub mod cache;
pub mod config;
pub mod coord;
pub mod logging;
pub mod mosaic;
pub mod pipeline;
pub mod provider;
pub mod reduce;
pub mod telemetry;
pub mod tile;

pub use pipeline::{
    HttpMapPipeline, MapJson, MapPipeline, PipelineError, RawRequest, RequestGeometry,
};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
