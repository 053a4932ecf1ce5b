//! Provider types

use std::fmt;

use thiserror::Error;

/// Errors that can occur while fetching a tile from a remote source.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProviderError {
    /// HTTP request failed or returned a non-success status
    #[error("HTTP error: {0}")]
    HttpError(String),
    /// Response body could not be decoded as an image
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Base-layer map styles, numbered as clients request them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum MapType {
    /// OpenStreetMap standard style
    #[default]
    OpenStreetMap = 1,
    /// Google satellite with labels
    GoogleHybrid = 2,
    /// Google road map
    GoogleStreet = 3,
    /// Google terrain
    GoogleTerrain = 4,
    /// OpenTopoMap
    OpenTopoMap = 5,
    /// Esri World Imagery
    EsriWorldImagery = 6,
    /// Stadia Stamen Toner (black and white)
    StamenToner = 7,
    /// Stadia Stamen Terrain
    StamenTerrain = 8,
    /// Free Nautical Chart (Quantenschaum)
    FreeNauticalChart = 9,
    /// C-Map NOAA charts
    CMapNoaa = 10,
}

impl MapType {
    /// All map types in id order.
    pub const ALL: [MapType; 10] = [
        MapType::OpenStreetMap,
        MapType::GoogleHybrid,
        MapType::GoogleStreet,
        MapType::GoogleTerrain,
        MapType::OpenTopoMap,
        MapType::EsriWorldImagery,
        MapType::StamenToner,
        MapType::StamenTerrain,
        MapType::FreeNauticalChart,
        MapType::CMapNoaa,
    ];

    /// Resolves a numeric id, falling back to OpenStreetMap for unknown ids.
    pub fn from_id(id: i64) -> Self {
        Self::ALL
            .iter()
            .copied()
            .find(|m| m.id() as i64 == id)
            .unwrap_or_default()
    }

    /// Numeric id (1-10), also used as the cache directory name.
    #[inline]
    pub fn id(self) -> u8 {
        self as u8
    }

    /// Short human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            MapType::OpenStreetMap => "OpenStreetMap",
            MapType::GoogleHybrid => "Google Hybrid",
            MapType::GoogleStreet => "Google Street",
            MapType::GoogleTerrain => "Google Terrain",
            MapType::OpenTopoMap => "OpenTopoMap",
            MapType::EsriWorldImagery => "Esri World Imagery",
            MapType::StamenToner => "Stamen Toner",
            MapType::StamenTerrain => "Stamen Terrain",
            MapType::FreeNauticalChart => "Free Nautical Chart",
            MapType::CMapNoaa => "C-Map NOAA",
        }
    }
}

impl fmt::Display for MapType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.id())
    }
}
