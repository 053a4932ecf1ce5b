//! Tile URL templates for every map type plus the seamark overlay.
//!
//! Templates use `{z}`, `{x}` and `{y}` placeholders. Esri swaps the axis
//! order (`{z}/{y}/{x}`); the template carries that difference so the
//! pipeline never branches on the provider.

use std::collections::HashMap;

use super::types::MapType;
use crate::coord::TileCoord;

/// OpenSeaMap seamarks, composited on top of every base tile.
pub const OVERLAY_TEMPLATE: &str = "https://t1.openseamap.org/seamark/{z}/{x}/{y}.png";

/// Default base-layer templates, indexed by map type.
const BASE_TEMPLATES: [(MapType, &str); 10] = [
    (
        MapType::OpenStreetMap,
        "https://tile.openstreetmap.org/{z}/{x}/{y}.png",
    ),
    (
        MapType::GoogleHybrid,
        "https://mt1.google.com/vt/lyrs=y&x={x}&y={y}&z={z}",
    ),
    (
        MapType::GoogleStreet,
        "https://mt1.google.com/vt/lyrs=m&x={x}&y={y}&z={z}",
    ),
    (
        MapType::GoogleTerrain,
        "https://mt1.google.com/vt/lyrs=p&x={x}&y={y}&z={z}",
    ),
    (
        MapType::OpenTopoMap,
        "https://tile.opentopomap.org/{z}/{x}/{y}.png",
    ),
    (
        MapType::EsriWorldImagery,
        "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}",
    ),
    (
        MapType::StamenToner,
        "https://tiles.stadiamaps.com/tiles/stamen_toner/{z}/{x}/{y}.png",
    ),
    (
        MapType::StamenTerrain,
        "https://tiles.stadiamaps.com/tiles/stamen_terrain/{z}/{x}/{y}.png",
    ),
    (
        MapType::FreeNauticalChart,
        "https://freenauticalchart.net/qmap-de/{z}/{x}/{y}.png",
    ),
    (
        MapType::CMapNoaa,
        "https://tiles.c-map.com/wmts/maxnp_noaa/webmercator/{z}/{x}/{y}.png",
    ),
];

/// Substitutes tile coordinates into a URL template.
pub fn render_template(template: &str, tile: &TileCoord) -> String {
    template
        .replace("{z}", &tile.zoom.to_string())
        .replace("{x}", &tile.x.to_string())
        .replace("{y}", &tile.y.to_string())
}

/// Lookup table from map type to base template, plus the overlay template.
#[derive(Debug, Clone)]
pub struct SourceCatalog {
    base: HashMap<MapType, String>,
    overlay: String,
}

impl SourceCatalog {
    /// Creates a catalog with the built-in provider templates.
    pub fn new() -> Self {
        let base = BASE_TEMPLATES
            .iter()
            .map(|(map_type, template)| (*map_type, template.to_string()))
            .collect();
        Self {
            base,
            overlay: OVERLAY_TEMPLATE.to_string(),
        }
    }

    /// Replaces the base template for one map type.
    pub fn with_base_template(mut self, map_type: MapType, template: impl Into<String>) -> Self {
        self.base.insert(map_type, template.into());
        self
    }

    /// Replaces the overlay template.
    pub fn with_overlay_template(mut self, template: impl Into<String>) -> Self {
        self.overlay = template.into();
        self
    }

    /// Base-layer URL for a tile.
    pub fn base_url(&self, map_type: MapType, tile: &TileCoord) -> String {
        let template = self
            .base
            .get(&map_type)
            .map(String::as_str)
            .unwrap_or(BASE_TEMPLATES[0].1);
        render_template(template, tile)
    }

    /// Overlay URL for a tile.
    pub fn overlay_url(&self, tile: &TileCoord) -> String {
        render_template(&self.overlay, tile)
    }
}

impl Default for SourceCatalog {
    fn default() -> Self {
        Self::new()
    }
}
