//! Raster tiles and read-through tile loading.
//!
//! [`RasterTile`] is the immutable 256×256 image shared by cache and
//! stitcher. [`TileLoader`] implements [`TileFetcher`] over the two-tier
//! cache and the remote [`TileSource`](crate::provider::TileSource).

mod loader;
mod raster;

pub use loader::{TileFetcher, TileLoader};
pub use raster::{RasterTile, PLACEHOLDER_RGB};
