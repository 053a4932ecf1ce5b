//! Coordinate conversion module
//!
//! Maps geographic coordinates (latitude/longitude) onto Web Mercator tiles
//! and the pixel inside the tile where the point lands.

mod types;

pub use types::{
    CoordError, GeoPoint, TileCoord, TilePosition, MAX_LAT, MAX_LON, MAX_MERCATOR_LAT, MAX_ZOOM,
    MIN_LAT, MIN_LON, MIN_MERCATOR_LAT, MIN_ZOOM, TILE_SIZE,
};

use std::f64::consts::PI;

/// Converts a geographic point to a tile and intra-tile pixel offset.
///
/// Latitudes beyond the Mercator limit are clamped to it before projecting.
/// Indices and offsets are truncated toward the tile origin, so the result is
/// reproducible bit-for-bit for a given input.
///
/// # Arguments
///
/// * `point` - Geographic point to project
/// * `zoom` - Zoom level (0 to 18)
///
/// # Returns
///
/// The tile containing the point and the pixel offset inside it, or an
/// error if the zoom level is unsupported.
pub fn to_tile_position(point: &GeoPoint, zoom: u8) -> Result<TilePosition, CoordError> {
    if zoom > MAX_ZOOM {
        return Err(CoordError::InvalidZoom(zoom));
    }

    let tiles = TileCoord::tiles_per_axis(zoom);
    let n = tiles as f64;

    let fx = (point.longitude + 180.0) / 360.0 * n;

    let lat = point.latitude.clamp(MIN_MERCATOR_LAT, MAX_MERCATOR_LAT);
    let lat_rad = lat.to_radians();
    let fy = (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0 * n;

    let (x, offset_x) = split_axis(fx, tiles);
    let (y, offset_y) = split_axis(fy, tiles);

    Ok(TilePosition {
        tile: TileCoord { x, y, zoom },
        offset_x,
        offset_y,
    })
}

/// Splits a fractional tile coordinate into index and pixel offset.
///
/// The far edge (e.g. longitude 180) belongs to the last tile.
#[inline]
fn split_axis(value: f64, tiles: u32) -> (u32, u32) {
    let value = value.max(0.0);
    let index = value.floor();
    if index >= tiles as f64 {
        return (tiles - 1, TILE_SIZE - 1);
    }
    let offset = ((value - index) * TILE_SIZE as f64) as u32;
    (index as u32, offset.min(TILE_SIZE - 1))
}
