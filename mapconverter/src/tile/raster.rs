//! Immutable 256×256 RGBA tile shared between the cache and the stitcher.
//!
//! # Static Placeholder
//!
//! The gray placeholder used for unreachable tiles is generated once at
//! first access and shared for the lifetime of the process.

use std::io::Cursor;
use std::sync::{Arc, OnceLock};

use image::imageops::{self, FilterType};
use image::{ImageFormat, ImageReader, ImageResult, Rgba, RgbaImage};

use crate::coord::TILE_SIZE;

/// Fill colour of the placeholder tile.
pub const PLACEHOLDER_RGB: [u8; 3] = [200, 200, 200];

static PLACEHOLDER: OnceLock<RasterTile> = OnceLock::new();

/// A fixed-size tile image. Cloning is cheap and shares the pixels.
#[derive(Debug, Clone)]
pub struct RasterTile {
    image: Arc<RgbaImage>,
}

impl RasterTile {
    /// Wraps an image, resizing it to 256×256 when a server returns
    /// another size.
    pub fn from_image(image: RgbaImage) -> Self {
        let image = if image.dimensions() == (TILE_SIZE, TILE_SIZE) {
            image
        } else {
            imageops::resize(&image, TILE_SIZE, TILE_SIZE, FilterType::Triangle)
        };
        Self {
            image: Arc::new(image),
        }
    }

    /// Decodes encoded image bytes (PNG, JPEG, ...) into a tile.
    pub fn decode(bytes: &[u8]) -> ImageResult<Self> {
        let image = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()?
            .decode()?
            .to_rgba8();
        Ok(Self::from_image(image))
    }

    /// A uniform opaque gray tile.
    pub fn placeholder() -> Self {
        PLACEHOLDER
            .get_or_init(|| {
                let [r, g, b] = PLACEHOLDER_RGB;
                Self::from_image(RgbaImage::from_pixel(
                    TILE_SIZE,
                    TILE_SIZE,
                    Rgba([r, g, b, 255]),
                ))
            })
            .clone()
    }

    /// Encodes the tile as PNG for the cache.
    pub fn encode_png(&self) -> ImageResult<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        self.image.write_to(&mut buffer, ImageFormat::Png)?;
        Ok(buffer.into_inner())
    }

    /// Read-only access to the pixels.
    #[inline]
    pub fn image(&self) -> &RgbaImage {
        &self.image
    }
}
