//! Image reduction for low-bandwidth displays.
//!
//! Turns the cropped color image into one of four output modes and packs
//! 1-bit images for transport.
//!
//! ```text
//! RgbImage ──► luminance ──┬─► Grayscale
//!                          ├─► Grayscale4 ({0, 64, 128, 192})
//!                          └─► dither(DitherType) ──► pack_bits ──► bytes
//! ```

mod dither;
mod pack;

pub use dither::{dither, DitherType, BAYER_4X4, THRESHOLD_LEVEL};
pub use pack::{pack_bits, packed_len};

use std::io::Cursor;

use image::{GrayImage, ImageFormat, ImageResult, Luma, RgbImage};

/// What the image endpoint returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputMode {
    #[default]
    Color,
    Grayscale,
    Grayscale4,
    Dithered,
}

impl OutputMode {
    /// Maps the `itype` request field, clamping into `1..=4`.
    pub fn from_id(id: i64) -> Self {
        match id.clamp(1, 4) {
            1 => OutputMode::Color,
            2 => OutputMode::Grayscale,
            3 => OutputMode::Grayscale4,
            _ => OutputMode::Dithered,
        }
    }

    pub fn id(self) -> u8 {
        match self {
            OutputMode::Color => 1,
            OutputMode::Grayscale => 2,
            OutputMode::Grayscale4 => 3,
            OutputMode::Dithered => 4,
        }
    }
}

/// Result of [`reduce`].
#[derive(Debug, Clone, PartialEq)]
pub enum ReducedImage {
    Color(RgbImage),
    Gray(GrayImage),
}

impl ReducedImage {
    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            ReducedImage::Color(img) => img.dimensions(),
            ReducedImage::Gray(img) => img.dimensions(),
        }
    }

    pub fn encode_png(&self) -> ImageResult<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        match self {
            ReducedImage::Color(img) => img.write_to(&mut buffer, ImageFormat::Png)?,
            ReducedImage::Gray(img) => img.write_to(&mut buffer, ImageFormat::Png)?,
        }
        Ok(buffer.into_inner())
    }
}

/// ITU-R 601-2 luma in 16-bit fixed point, matching common imaging
/// libraries bit for bit.
pub fn luminance(image: &RgbImage) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b] = image.get_pixel(x, y).0;
        let l = (r as u32 * 19595 + g as u32 * 38470 + b as u32 * 7471 + 0x8000) >> 16;
        Luma([l as u8])
    })
}

/// Quantize to four levels: `(p / 64) * 64`.
pub fn quantize4(gray: &GrayImage) -> GrayImage {
    let mut out = gray.clone();
    for p in out.pixels_mut() {
        p.0[0] = (p.0[0] / 64) * 64;
    }
    out
}

pub fn reduce(image: &RgbImage, mode: OutputMode, dither_type: DitherType) -> ReducedImage {
    match mode {
        OutputMode::Color => ReducedImage::Color(image.clone()),
        OutputMode::Grayscale => ReducedImage::Gray(luminance(image)),
        OutputMode::Grayscale4 => ReducedImage::Gray(quantize4(&luminance(image))),
        OutputMode::Dithered => ReducedImage::Gray(dither(&luminance(image), dither_type)),
    }
}
