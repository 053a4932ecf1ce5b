//! Request geometry: parsing and clamping of request parameters.
//!
//! Only `lat` and `lon` are mandatory. Every numeric field is clamped into
//! its range rather than rejected; values that do not parse at all are
//! invalid input. Integers too large for `i64` saturate before clamping.
//! `mtype` and `dtype` fall back to their defaults instead of clamping.
//! Non-finite coordinates or rotations are invalid input.

use std::num::IntErrorKind;

use serde::Deserialize;

use super::PipelineError;
use crate::coord::{GeoPoint, MAX_LAT, MAX_LON, MAX_ZOOM, MIN_LAT, MIN_LON, MIN_ZOOM};
use crate::provider::MapType;
use crate::reduce::{DitherType, OutputMode};

pub const MIN_ROTATION: f64 = -360.0;
pub const MAX_ROTATION: f64 = 360.0;
pub const MIN_WIDTH: u32 = 50;
pub const MAX_WIDTH: u32 = 800;
pub const MIN_HEIGHT: u32 = 50;
pub const MAX_HEIGHT: u32 = 600;

pub const DEFAULT_WIDTH: u32 = 400;
pub const DEFAULT_HEIGHT: u32 = 300;
pub const DEFAULT_ZOOM: u8 = 15;

/// Query parameters exactly as received.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRequest {
    pub lat: Option<String>,
    pub lon: Option<String>,
    pub mrot: Option<String>,
    pub mtype: Option<String>,
    pub dtype: Option<String>,
    pub itype: Option<String>,
    pub width: Option<String>,
    pub height: Option<String>,
    pub zoom: Option<String>,
    pub debug: Option<String>,
}

/// A validated render request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RequestGeometry {
    pub point: GeoPoint,
    /// Counter-clockwise, degrees
    pub rotation_degrees: f64,
    pub zoom: u8,
    pub map_type: MapType,
    pub dither_type: DitherType,
    /// Only used by the image endpoint
    pub output_mode: OutputMode,
    pub width: u32,
    pub height: u32,
    pub debug: bool,
}

impl RequestGeometry {
    /// A request for `lat`/`lon` with every other field at its default.
    pub fn new(lat: f64, lon: f64) -> Result<Self, PipelineError> {
        Ok(Self {
            point: clamp_point(lat, lon)?,
            rotation_degrees: 0.0,
            zoom: DEFAULT_ZOOM,
            map_type: MapType::default(),
            dither_type: DitherType::default(),
            output_mode: OutputMode::default(),
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            debug: false,
        })
    }

    /// Parse and clamp raw query parameters.
    pub fn from_raw(raw: &RawRequest) -> Result<Self, PipelineError> {
        let lat = required_coordinate("lat", raw.lat.as_deref())?;
        let lon = required_coordinate("lon", raw.lon.as_deref())?;
        let rotation = optional_float("mrot", raw.mrot.as_deref(), 0.0)?;

        Ok(Self::new(lat, lon)?
            .with_rotation(rotation)?
            .with_zoom(optional_int("zoom", raw.zoom.as_deref(), DEFAULT_ZOOM as i64)?)
            .with_size(
                optional_int("width", raw.width.as_deref(), DEFAULT_WIDTH as i64)?,
                optional_int("height", raw.height.as_deref(), DEFAULT_HEIGHT as i64)?,
            )
            .with_map_type(MapType::from_id(optional_int("mtype", raw.mtype.as_deref(), 1)?))
            .with_dither_type(DitherType::from_id(optional_int("dtype", raw.dtype.as_deref(), 2)?))
            .with_output_mode(OutputMode::from_id(optional_int("itype", raw.itype.as_deref(), 1)?))
            .with_debug(optional_int("debug", raw.debug.as_deref(), 0)?.clamp(0, 1) == 1))
    }

    /// Set the rotation, clamped to ±360°.
    ///
    /// NaN and infinities are rejected; clamping would otherwise let NaN
    /// through to the rotation stage.
    pub fn with_rotation(mut self, degrees: f64) -> Result<Self, PipelineError> {
        if !degrees.is_finite() {
            return Err(PipelineError::InvalidInput(format!(
                "rotation must be a finite number, got {}",
                degrees
            )));
        }
        self.rotation_degrees = degrees.clamp(MIN_ROTATION, MAX_ROTATION);
        Ok(self)
    }

    pub fn with_zoom(mut self, zoom: i64) -> Self {
        self.zoom = zoom.clamp(MIN_ZOOM as i64, MAX_ZOOM as i64) as u8;
        self
    }

    pub fn with_size(mut self, width: i64, height: i64) -> Self {
        self.width = width.clamp(MIN_WIDTH as i64, MAX_WIDTH as i64) as u32;
        self.height = height.clamp(MIN_HEIGHT as i64, MAX_HEIGHT as i64) as u32;
        self
    }

    pub fn with_map_type(mut self, map_type: MapType) -> Self {
        self.map_type = map_type;
        self
    }

    pub fn with_dither_type(mut self, dither_type: DitherType) -> Self {
        self.dither_type = dither_type;
        self
    }

    pub fn with_output_mode(mut self, output_mode: OutputMode) -> Self {
        self.output_mode = output_mode;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

fn clamp_point(lat: f64, lon: f64) -> Result<GeoPoint, PipelineError> {
    if !lat.is_finite() || !lon.is_finite() {
        return Err(PipelineError::InvalidInput(
            "lat and lon must be finite numbers".to_string(),
        ));
    }
    Ok(GeoPoint::new(
        lat.clamp(MIN_LAT, MAX_LAT),
        lon.clamp(MIN_LON, MAX_LON),
    )?)
}

fn required_coordinate(name: &str, value: Option<&str>) -> Result<f64, PipelineError> {
    let value = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| PipelineError::InvalidInput(format!("{} is required", name)))?;
    let parsed: f64 = value.parse().map_err(|_| {
        PipelineError::InvalidInput(format!("{} must be a number, got '{}'", name, value))
    })?;
    if !parsed.is_finite() {
        return Err(PipelineError::InvalidInput(format!(
            "{} must be a finite number, got '{}'",
            name, value
        )));
    }
    Ok(parsed)
}

fn not_a_number(name: &str, value: &str) -> PipelineError {
    PipelineError::InvalidInput(format!("{} must be a number, got '{}'", name, value))
}

fn optional_float(name: &str, value: Option<&str>, default: f64) -> Result<f64, PipelineError> {
    match value.map(str::trim) {
        None | Some("") => Ok(default),
        Some(v) => v.parse().map_err(|_| not_a_number(name, v)),
    }
}

/// Parse an optional integer, saturating at the `i64` bounds so oversized
/// values clamp like any other out-of-range value.
fn optional_int(name: &str, value: Option<&str>, default: i64) -> Result<i64, PipelineError> {
    match value.map(str::trim) {
        None | Some("") => Ok(default),
        Some(v) => v.parse::<i64>().or_else(|e| match e.kind() {
            IntErrorKind::PosOverflow => Ok(i64::MAX),
            IntErrorKind::NegOverflow => Ok(i64::MIN),
            _ => Err(not_a_number(name, v)),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(pairs: &[(&str, &str)]) -> RawRequest {
        let mut raw = RawRequest::default();
        for (key, value) in pairs {
            let value = Some(value.to_string());
            match *key {
                "lat" => raw.lat = value,
                "lon" => raw.lon = value,
                "mrot" => raw.mrot = value,
                "mtype" => raw.mtype = value,
                "dtype" => raw.dtype = value,
                "itype" => raw.itype = value,
                "width" => raw.width = value,
                "height" => raw.height = value,
                "zoom" => raw.zoom = value,
                "debug" => raw.debug = value,
                other => panic!("unknown key {other}"),
            }
        }
        raw
    }

    #[test]
    fn test_defaults() {
        let g = RequestGeometry::from_raw(&raw(&[("lat", "53.9028"), ("lon", "11.4441")])).unwrap();
        assert_eq!(g.point.latitude, 53.9028);
        assert_eq!(g.point.longitude, 11.4441);
        assert_eq!(g.rotation_degrees, 0.0);
        assert_eq!(g.zoom, 15);
        assert_eq!((g.width, g.height), (400, 300));
        assert_eq!(g.map_type, MapType::OpenStreetMap);
        assert_eq!(g.dither_type, DitherType::FloydSteinberg);
        assert_eq!(g.output_mode, OutputMode::Color);
        assert!(!g.debug);
    }

    #[test]
    fn test_missing_coordinates_rejected() {
        for pairs in [vec![("lat", "1.0")], vec![("lon", "1.0")], vec![]] {
            let err = RequestGeometry::from_raw(&raw(&pairs)).unwrap_err();
            assert!(err.is_invalid_input());
        }
    }

    #[test]
    fn test_non_numeric_coordinates_rejected() {
        for bad in ["abc", "NaN", "inf", "12,5"] {
            let err = RequestGeometry::from_raw(&raw(&[("lat", bad), ("lon", "0")])).unwrap_err();
            assert!(matches!(err, PipelineError::InvalidInput(_)), "{bad}");
        }
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let g = RequestGeometry::from_raw(&raw(&[
            ("lat", "95"),
            ("lon", "-200"),
            ("mrot", "725.5"),
            ("width", "5000"),
            ("height", "10"),
            ("zoom", "25"),
            ("debug", "7"),
            ("itype", "9"),
        ]))
        .unwrap();
        assert_eq!(g.point.latitude, 90.0);
        assert_eq!(g.point.longitude, -180.0);
        assert_eq!(g.rotation_degrees, 360.0);
        assert_eq!((g.width, g.height), (800, 50));
        assert_eq!(g.zoom, 18);
        assert!(g.debug);
        assert_eq!(g.output_mode, OutputMode::Dithered);
    }

    #[test]
    fn test_unknown_types_fall_back_to_defaults() {
        let g = RequestGeometry::from_raw(&raw(&[
            ("lat", "0"),
            ("lon", "0"),
            ("mtype", "42"),
            ("dtype", "99"),
        ]))
        .unwrap();
        assert_eq!(g.map_type, MapType::OpenStreetMap);
        assert_eq!(g.dither_type, DitherType::FloydSteinberg);
    }

    #[test]
    fn test_unparsable_optional_field_rejected() {
        let err = RequestGeometry::from_raw(&raw(&[("lat", "0"), ("lon", "0"), ("width", "wide")]))
            .unwrap_err();
        assert!(err.to_string().contains("width"));
        assert!(RequestGeometry::from_raw(&raw(&[("lat", "0"), ("lon", "0"), ("zoom", "1.5")])).is_err());
    }

    #[test]
    fn test_blank_optional_field_uses_default() {
        let g = RequestGeometry::from_raw(&raw(&[("lat", "0"), ("lon", "0"), ("zoom", "")])).unwrap();
        assert_eq!(g.zoom, DEFAULT_ZOOM);
    }

    #[test]
    fn test_builder_clamps() {
        let g = RequestGeometry::new(10.0, 20.0)
            .unwrap()
            .with_zoom(-3)
            .with_rotation(-1000.0)
            .unwrap()
            .with_size(0, 1_000_000);
        assert_eq!(g.zoom, 0);
        assert_eq!(g.rotation_degrees, -360.0);
        assert_eq!((g.width, g.height), (50, 600));
    }

    #[test]
    fn test_oversized_integers_saturate_then_clamp() {
        let g = RequestGeometry::from_raw(&raw(&[
            ("lat", "0"),
            ("lon", "0"),
            ("width", "99999999999999999999"),
            ("height", "-99999999999999999999"),
            ("zoom", "123456789012345678901234567890"),
            ("debug", "99999999999999999999"),
        ]))
        .unwrap();
        assert_eq!((g.width, g.height), (800, 50));
        assert_eq!(g.zoom, 18);
        assert!(g.debug);

        // overflow saturates, but a non-integer is still rejected
        let err = RequestGeometry::from_raw(&raw(&[("lat", "0"), ("lon", "0"), ("width", "9e99")]))
            .unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_non_finite_rotation_rejected() {
        for bad in ["NaN", "inf", "-inf"] {
            let err = RequestGeometry::from_raw(&raw(&[("lat", "0"), ("lon", "0"), ("mrot", bad)]))
                .unwrap_err();
            assert!(err.is_invalid_input(), "{bad}");
        }

        let base = RequestGeometry::new(0.0, 0.0).unwrap();
        assert!(base.with_rotation(f64::NAN).is_err());
        assert!(base.with_rotation(f64::INFINITY).is_err());
        assert_eq!(base.with_rotation(45.0).unwrap().rotation_degrees, 45.0);
    }
}
