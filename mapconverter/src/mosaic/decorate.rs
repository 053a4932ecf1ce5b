//! Debug decorations: tile borders and a focal-point cross.

use image::{Rgb, RgbImage};

use super::MosaicLayout;
use crate::coord::TILE_SIZE;

/// Color of the focal cross.
pub const CROSS_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

/// Arm length of the focal cross in pixels.
pub const CROSS_HALF_LENGTH: i64 = 10;

const CROSS_WIDTH: i64 = 2;
const BORDER_COLOR: Rgb<u8> = Rgb([0, 0, 0]);

/// Returns a decorated copy of `canvas`; the original is left untouched.
pub fn decorate(canvas: &RgbImage, layout: &MosaicLayout) -> RgbImage {
    let mut scratch = canvas.clone();
    for cell in layout.cells() {
        let (x, y) = cell.origin();
        draw_tile_border(&mut scratch, x, y);
    }
    let (fx, fy) = layout.focal_pixel();
    draw_cross(&mut scratch, fx as i64, fy as i64);
    scratch
}

fn draw_tile_border(image: &mut RgbImage, left: u32, top: u32) {
    let right = left + TILE_SIZE - 1;
    let bottom = top + TILE_SIZE - 1;
    for x in left..=right {
        put_clipped(image, x as i64, top as i64, BORDER_COLOR);
        put_clipped(image, x as i64, bottom as i64, BORDER_COLOR);
    }
    for y in top..=bottom {
        put_clipped(image, left as i64, y as i64, BORDER_COLOR);
        put_clipped(image, right as i64, y as i64, BORDER_COLOR);
    }
}

fn draw_cross(image: &mut RgbImage, cx: i64, cy: i64) {
    // a 2px line covers the centre row/column and the one before it
    for x in (cx - CROSS_HALF_LENGTH)..=(cx + CROSS_HALF_LENGTH) {
        for y in (cy - CROSS_WIDTH + 1)..=cy {
            put_clipped(image, x, y, CROSS_COLOR);
        }
    }
    for y in (cy - CROSS_HALF_LENGTH)..=(cy + CROSS_HALF_LENGTH) {
        for x in (cx - CROSS_WIDTH + 1)..=cx {
            put_clipped(image, x, y, CROSS_COLOR);
        }
    }
}

fn put_clipped(image: &mut RgbImage, x: i64, y: i64, color: Rgb<u8>) {
    if x >= 0 && y >= 0 && (x as u32) < image.width() && (y as u32) < image.height() {
        image.put_pixel(x as u32, y as u32, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::{TileCoord, TilePosition};

    fn layout() -> MosaicLayout {
        MosaicLayout::new(
            TilePosition {
                tile: TileCoord { x: 5, y: 5, zoom: 4 },
                offset_x: 100,
                offset_y: 40,
            },
            100,
            100,
        )
    }

    #[test]
    fn test_original_is_untouched() {
        let canvas = RgbImage::from_pixel(768, 768, Rgb([255, 255, 255]));
        let decorated = decorate(&canvas, &layout());
        assert_eq!(canvas.get_pixel(0, 0).0, [255, 255, 255]);
        assert_ne!(decorated, canvas);
    }

    #[test]
    fn test_borders_on_every_cell_edge() {
        let canvas = RgbImage::from_pixel(768, 768, Rgb([255, 255, 255]));
        let decorated = decorate(&canvas, &layout());
        assert_eq!(decorated.get_pixel(0, 50).0, [0, 0, 0]);
        assert_eq!(decorated.get_pixel(255, 50).0, [0, 0, 0]);
        assert_eq!(decorated.get_pixel(256, 50).0, [0, 0, 0]);
        assert_eq!(decorated.get_pixel(50, 511).0, [0, 0, 0]);
        assert_eq!(decorated.get_pixel(50, 50).0, [255, 255, 255]);
    }

    #[test]
    fn test_cross_marks_focal_point() {
        let canvas = RgbImage::from_pixel(768, 768, Rgb([255, 255, 255]));
        let decorated = decorate(&canvas, &layout());
        // focal pixel is (256 + 100, 256 + 40)
        assert_eq!(decorated.get_pixel(356, 296), &CROSS_COLOR);
        assert_eq!(decorated.get_pixel(346, 295), &CROSS_COLOR);
        assert_eq!(decorated.get_pixel(366, 296), &CROSS_COLOR);
        assert_eq!(decorated.get_pixel(355, 306), &CROSS_COLOR);
        assert_eq!(decorated.get_pixel(367, 296).0, [255, 255, 255]);
        assert_eq!(decorated.get_pixel(360, 300).0, [255, 255, 255]);
    }
}
