//! MSB-first bit packing of 1-bit images.

use image::GrayImage;

/// Bytes produced by [`pack_bits`] for a `width` × `height` image.
pub fn packed_len(width: u32, height: u32) -> usize {
    height as usize * width.div_ceil(8) as usize
}

/// Pack a bilevel image row by row, first pixel in bit 7.
///
/// White (255) packs to 0, anything else to 1. Each row starts on a fresh
/// byte; trailing bits of a partial byte are white.
pub fn pack_bits(image: &GrayImage) -> Vec<u8> {
    let (width, height) = image.dimensions();
    let mut out = Vec::with_capacity(packed_len(width, height));
    for row in image.rows() {
        let mut byte = 0u8;
        let mut filled = 0;
        for pixel in row {
            byte <<= 1;
            if pixel.0[0] != 255 {
                byte |= 1;
            }
            filled += 1;
            if filled == 8 {
                out.push(byte);
                byte = 0;
                filled = 0;
            }
        }
        if filled > 0 {
            out.push(byte << (8 - filled));
        }
    }
    out
}
