//! Mosaic stitching.
//!
//! Builds the canvas that rotation and cropping work on: a grid of
//! `ceil(size / 256) + 2` tiles per axis centred on the tile holding the
//! requested point, so the crop window stays inside the canvas after
//! rotation.
//!
//! ```text
//! TilePosition ──► MosaicLayout ──► stitch() ──► Mosaic { canvas, focal }
//!                                     │
//!                                     └─► TileFetcher::fetch_tile (all cells concurrently)
//! ```

mod decorate;
mod rotate;

pub use decorate::{decorate, CROSS_COLOR, CROSS_HALF_LENGTH};
pub use rotate::{crop_centered, rotate_about, rotate_and_crop, Rotated};

use futures::future::join_all;
use image::buffer::ConvertBuffer;
use image::{imageops, RgbImage};
use tracing::debug;

use crate::coord::{TileCoord, TilePosition, TILE_SIZE};
use crate::provider::MapType;
use crate::tile::{RasterTile, TileFetcher};

/// One grid cell of the mosaic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridCell {
    /// Column index within the grid
    pub column: u32,
    /// Row index within the grid
    pub row: u32,
    /// Tile to draw, or `None` when the cell lies beyond a pole
    pub tile: Option<TileCoord>,
}

impl GridCell {
    /// Top-left pixel of the cell on the canvas.
    pub fn origin(&self) -> (u32, u32) {
        (self.column * TILE_SIZE, self.row * TILE_SIZE)
    }
}

/// Grid geometry for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MosaicLayout {
    pub tiles_x: u32,
    pub tiles_y: u32,
    pub center: TilePosition,
}

impl MosaicLayout {
    /// Sizes the grid for an output of `width` × `height` pixels.
    pub fn new(center: TilePosition, width: u32, height: u32) -> Self {
        Self {
            tiles_x: width.div_ceil(TILE_SIZE) + 2,
            tiles_y: height.div_ceil(TILE_SIZE) + 2,
            center,
        }
    }

    /// Canvas dimensions in pixels.
    pub fn canvas_size(&self) -> (u32, u32) {
        (self.tiles_x * TILE_SIZE, self.tiles_y * TILE_SIZE)
    }

    /// Canvas pixel of the requested geographic point.
    pub fn focal_pixel(&self) -> (u32, u32) {
        (
            (self.tiles_x / 2) * TILE_SIZE + self.center.offset_x,
            (self.tiles_y / 2) * TILE_SIZE + self.center.offset_y,
        )
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> Vec<GridCell> {
        let half_x = (self.tiles_x / 2) as i64;
        let half_y = (self.tiles_y / 2) as i64;
        (0..self.tiles_y)
            .flat_map(|row| (0..self.tiles_x).map(move |column| (column, row)))
            .map(|(column, row)| GridCell {
                column,
                row,
                tile: self
                    .center
                    .tile
                    .neighbor(column as i64 - half_x, row as i64 - half_y),
            })
            .collect()
    }
}

/// A stitched canvas and the focal pixel on it.
#[derive(Debug, Clone)]
pub struct Mosaic {
    pub canvas: RgbImage,
    pub focal: (u32, u32),
    pub layout: MosaicLayout,
}

/// Fetch every cell concurrently and paste the tiles onto one canvas.
///
/// Cells beyond the poles get the placeholder without a fetch. Tile alpha
/// is dropped when pasting, so the canvas is plain RGB.
pub async fn stitch<F: TileFetcher>(
    fetcher: &F,
    layout: &MosaicLayout,
    map_type: MapType,
) -> Mosaic {
    let cells = layout.cells();

    let fetches = cells.iter().map(|cell| async move {
        match cell.tile {
            Some(tile) => fetcher.fetch_tile(tile, map_type).await,
            None => RasterTile::placeholder(),
        }
    });
    let tiles = join_all(fetches).await;

    let (width, height) = layout.canvas_size();
    let mut canvas = RgbImage::new(width, height);
    for (cell, tile) in cells.iter().zip(tiles) {
        let rgb: RgbImage = tile.image().convert();
        let (x, y) = cell.origin();
        imageops::replace(&mut canvas, &rgb, x as i64, y as i64);
    }

    debug!(
        center = %layout.center.tile,
        tiles_x = layout.tiles_x,
        tiles_y = layout.tiles_y,
        "Mosaic stitched"
    );

    Mosaic {
        canvas,
        focal: layout.focal_pixel(),
        layout: *layout,
    }
}
