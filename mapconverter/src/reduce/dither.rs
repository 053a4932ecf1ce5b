//! Bilevel dithering of a luminance plane.
//!
//! All strategies output only 0 and 255 and are deterministic for a given
//! input.

use image::imageops::{self, BiLevel};
use image::{GrayImage, Luma};

/// Split point of the threshold strategy.
pub const THRESHOLD_LEVEL: u8 = 189;

/// 4×4 Bayer index matrix used by the ordered strategy.
pub const BAYER_4X4: [[u8; 4]; 4] = [[0, 8, 2, 10], [12, 4, 14, 6], [3, 11, 1, 9], [15, 7, 13, 5]];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DitherType {
    Threshold,
    #[default]
    FloydSteinberg,
    Ordered,
    Atkinson,
}

impl DitherType {
    /// Maps the `dtype` request field; unknown values fall back to
    /// Floyd–Steinberg.
    pub fn from_id(id: i64) -> Self {
        match id {
            1 => DitherType::Threshold,
            3 => DitherType::Ordered,
            4 => DitherType::Atkinson,
            _ => DitherType::FloydSteinberg,
        }
    }

    pub fn id(self) -> u8 {
        match self {
            DitherType::Threshold => 1,
            DitherType::FloydSteinberg => 2,
            DitherType::Ordered => 3,
            DitherType::Atkinson => 4,
        }
    }
}

pub fn dither(gray: &GrayImage, kind: DitherType) -> GrayImage {
    match kind {
        DitherType::Threshold => threshold(gray),
        DitherType::FloydSteinberg => floyd_steinberg(gray),
        DitherType::Ordered => ordered(gray),
        DitherType::Atkinson => atkinson(gray),
    }
}

fn threshold(gray: &GrayImage) -> GrayImage {
    let mut out = gray.clone();
    for p in out.pixels_mut() {
        p.0[0] = if p.0[0] < THRESHOLD_LEVEL { 0 } else { 255 };
    }
    out
}

fn floyd_steinberg(gray: &GrayImage) -> GrayImage {
    let mut out = gray.clone();
    imageops::dither(&mut out, &BiLevel);
    out
}

fn ordered(gray: &GrayImage) -> GrayImage {
    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        let level = BAYER_4X4[(y % 4) as usize][(x % 4) as usize] as u16 * 16 + 8;
        let p = gray.get_pixel(x, y).0[0] as u16;
        Luma([if p > level { 255 } else { 0 }])
    })
}

/// Atkinson diffusion: an eighth of the error to each of six neighbours,
/// dropping the remaining quarter.
fn atkinson(gray: &GrayImage) -> GrayImage {
    const NEIGHBOURS: [(i64, i64); 6] = [(1, 0), (2, 0), (-1, 1), (0, 1), (1, 1), (0, 2)];

    let (w, h) = (gray.width() as i64, gray.height() as i64);
    let mut plane: Vec<f32> = gray.as_raw().iter().map(|&p| p as f32).collect();

    for y in 0..h {
        for x in 0..w {
            let idx = (y * w + x) as usize;
            let old = plane[idx];
            let new = if old < 128.0 { 0.0 } else { 255.0 };
            let error = (old - new) / 8.0;
            plane[idx] = new;
            for (dx, dy) in NEIGHBOURS {
                let (nx, ny) = (x + dx, y + dy);
                if nx >= 0 && nx < w && ny < h {
                    plane[(ny * w + nx) as usize] += error;
                }
            }
        }
    }

    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        let v = plane[(y as i64 * w + x as i64) as usize];
        Luma([if v < 128.0 { 0 } else { 255 }])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(w: u32, h: u32) -> GrayImage {
        GrayImage::from_fn(w, h, |x, y| Luma([((x * 7 + y * 13) % 256) as u8]))
    }

    fn is_bilevel(img: &GrayImage) -> bool {
        img.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255)
    }

    fn black_fraction(img: &GrayImage) -> f64 {
        let black = img.pixels().filter(|p| p.0[0] == 0).count();
        black as f64 / (img.width() * img.height()) as f64
    }

    #[test]
    fn test_unknown_id_is_floyd_steinberg() {
        assert_eq!(DitherType::from_id(99), DitherType::FloydSteinberg);
        assert_eq!(DitherType::from_id(0), DitherType::FloydSteinberg);
        assert_eq!(DitherType::from_id(-3), DitherType::FloydSteinberg);
        assert_eq!(DitherType::from_id(4), DitherType::Atkinson);
    }

    #[test]
    fn test_all_strategies_are_bilevel() {
        let img = ramp(64, 48);
        for kind in [
            DitherType::Threshold,
            DitherType::FloydSteinberg,
            DitherType::Ordered,
            DitherType::Atkinson,
        ] {
            let out = dither(&img, kind);
            assert_eq!(out.dimensions(), (64, 48));
            assert!(is_bilevel(&out), "{kind:?} produced gray values");
        }
    }

    #[test]
    fn test_threshold_splits_at_189() {
        let img = GrayImage::from_fn(3, 1, |x, _| Luma([[188, 189, 250][x as usize]]));
        let out = dither(&img, DitherType::Threshold);
        assert_eq!(out.as_raw(), &vec![0, 255, 255]);
    }

    #[test]
    fn test_extremes_are_preserved() {
        for kind in [
            DitherType::FloydSteinberg,
            DitherType::Ordered,
            DitherType::Atkinson,
        ] {
            let black = dither(&GrayImage::from_pixel(16, 16, Luma([0])), kind);
            let white = dither(&GrayImage::from_pixel(16, 16, Luma([255])), kind);
            assert!(black.pixels().all(|p| p.0[0] == 0), "{kind:?}");
            assert!(white.pixels().all(|p| p.0[0] == 255), "{kind:?}");
        }
    }

    #[test]
    fn test_mid_gray_is_roughly_half_black() {
        let img = GrayImage::from_pixel(64, 64, Luma([128]));
        for kind in [DitherType::FloydSteinberg, DitherType::Ordered] {
            let fraction = black_fraction(&dither(&img, kind));
            assert!((0.4..=0.6).contains(&fraction), "{kind:?}: {fraction}");
        }
    }

    #[test]
    fn test_ordered_pattern_repeats_every_four_pixels() {
        let img = GrayImage::from_pixel(16, 16, Luma([100]));
        let out = dither(&img, DitherType::Ordered);
        for y in 0..12 {
            for x in 0..12 {
                assert_eq!(out.get_pixel(x, y), out.get_pixel(x + 4, y + 4));
            }
        }
    }

    #[test]
    fn test_atkinson_diffuses_error_forward() {
        // 100 alone thresholds to black; the second pixel receives 100/8
        let img = GrayImage::from_fn(2, 1, |x, _| Luma([if x == 0 { 100 } else { 120 }]));
        let out = dither(&img, DitherType::Atkinson);
        assert_eq!(out.as_raw(), &vec![0, 255]);
    }

    #[test]
    fn test_atkinson_is_deterministic() {
        let img = ramp(97, 53);
        let first = dither(&img, DitherType::Atkinson);
        let second = dither(&img, DitherType::Atkinson);
        assert_eq!(first, second);
    }

    #[test]
    fn test_atkinson_keeps_pixel_layout() {
        // no quantization error, so the output must mirror the input exactly
        let img = GrayImage::from_fn(5, 2, |_, y| Luma([if y == 0 { 255 } else { 0 }]));
        let out = dither(&img, DitherType::Atkinson);
        assert_eq!(out, img);

        let column = GrayImage::from_fn(1, 4, |_, y| Luma([if y % 2 == 0 { 0 } else { 255 }]));
        assert_eq!(dither(&column, DitherType::Atkinson), column);
    }

    #[test]
    fn test_id_matches_from_id() {
        for kind in [
            DitherType::Threshold,
            DitherType::FloydSteinberg,
            DitherType::Ordered,
            DitherType::Atkinson,
        ] {
            assert_eq!(DitherType::from_id(kind.id() as i64), kind);
        }
    }
}
