//! Coordinate type definitions

use std::fmt;

use thiserror::Error;

/// Web Mercator projectable latitude range
pub const MIN_MERCATOR_LAT: f64 = -85.05112878;
pub const MAX_MERCATOR_LAT: f64 = 85.05112878;

/// Accepted geographic input range
pub const MIN_LAT: f64 = -90.0;
pub const MAX_LAT: f64 = 90.0;
pub const MIN_LON: f64 = -180.0;
pub const MAX_LON: f64 = 180.0;

/// Supported slippy-map zoom levels
pub const MIN_ZOOM: u8 = 0;
pub const MAX_ZOOM: u8 = 18;

/// Edge length of a raster tile in pixels.
pub const TILE_SIZE: u32 = 256;

/// A geographic coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    /// Latitude (-90 to 90)
    pub latitude: f64,
    /// Longitude (-180 to 180)
    pub longitude: f64,
}

impl GeoPoint {
    /// Creates a point after checking both components are finite and in range.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordError> {
        if !latitude.is_finite() || !(MIN_LAT..=MAX_LAT).contains(&latitude) {
            return Err(CoordError::InvalidLatitude(latitude));
        }
        if !longitude.is_finite() || !(MIN_LON..=MAX_LON).contains(&longitude) {
            return Err(CoordError::InvalidLongitude(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }
}

/// Tile coordinates in the Web Mercator / slippy-map scheme.
///
/// Each axis holds `2^zoom` tiles of 256×256 pixels, with (0, 0) at the
/// north-west corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileCoord {
    /// X coordinate (west-east), 0 at the antimeridian
    pub x: u32,
    /// Y coordinate (north-south), 0 at north
    pub y: u32,
    /// Zoom level (0-18)
    pub zoom: u8,
}

impl TileCoord {
    /// Number of tiles along each axis at `zoom`.
    #[inline]
    pub fn tiles_per_axis(zoom: u8) -> u32 {
        1u32 << zoom.min(31)
    }

    /// Returns the tile displaced by `(dx, dy)` tiles.
    ///
    /// Columns wrap around the antimeridian. Rows do not wrap: a
    /// displacement past the poles yields `None`.
    pub fn neighbor(&self, dx: i64, dy: i64) -> Option<TileCoord> {
        let n = Self::tiles_per_axis(self.zoom) as i64;
        let y = self.y as i64 + dy;
        if !(0..n).contains(&y) {
            return None;
        }
        let x = (self.x as i64 + dx).rem_euclid(n);
        Some(TileCoord {
            x: x as u32,
            y: y as u32,
            zoom: self.zoom,
        })
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.zoom, self.x, self.y)
    }
}

/// A tile plus the pixel inside it where a geographic point falls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TilePosition {
    pub tile: TileCoord,
    /// Horizontal pixel offset inside the tile (0-255)
    pub offset_x: u32,
    /// Vertical pixel offset inside the tile (0-255)
    pub offset_y: u32,
}

/// Errors that can occur during coordinate conversion.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordError {
    /// Latitude is non-finite or outside -90 to 90
    #[error("Invalid latitude: {0} (must be between {} and {})", MIN_LAT, MAX_LAT)]
    InvalidLatitude(f64),
    /// Longitude is non-finite or outside -180 to 180
    #[error("Invalid longitude: {0} (must be between {} and {})", MIN_LON, MAX_LON)]
    InvalidLongitude(f64),
    /// Zoom level is outside 0 to 18
    #[error("Invalid zoom level: {0} (must be between {} and {})", MIN_ZOOM, MAX_ZOOM)]
    InvalidZoom(u8),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_range() {
        assert_eq!(
            CoordError::InvalidLatitude(91.5).to_string(),
            "Invalid latitude: 91.5 (must be between -90 and 90)"
        );
        assert_eq!(
            CoordError::InvalidLongitude(-181.0).to_string(),
            "Invalid longitude: -181 (must be between -180 and 180)"
        );
        assert_eq!(
            CoordError::InvalidZoom(19).to_string(),
            "Invalid zoom level: 19 (must be between 0 and 18)"
        );
    }

    #[test]
    fn test_error_is_std_error() {
        let err: Box<dyn std::error::Error> = Box::new(CoordError::InvalidZoom(25));
        assert!(err.source().is_none());
        assert!(err.to_string().contains("25"));
    }
}
