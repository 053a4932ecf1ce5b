//! Rotation about the focal point and the re-centering crop.
//!
//! Rotation is expand-to-fit with nearest-neighbour sampling: the output
//! grows to the bounding box of the rotated canvas and uncovered area is
//! black. The focal point moves by half the growth on each axis, which is
//! what the crop compensates for.

use image::{imageops, RgbImage};
use rayon::prelude::*;

/// A rotated canvas and how far its content shifted.
#[derive(Debug, Clone)]
pub struct Rotated {
    pub image: RgbImage,
    /// Half the width growth; may be negative when the box shrinks
    pub shift_x: f64,
    /// Half the height growth
    pub shift_y: f64,
}

/// Affine map from output pixel centres back to input coordinates.
#[derive(Debug, Clone, Copy)]
struct Inverse {
    a: f64,
    b: f64,
    c: f64,
    d: f64,
    e: f64,
    f: f64,
}

impl Inverse {
    fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.a * x + self.b * y + self.c,
            self.d * x + self.e * y + self.f,
        )
    }
}

fn round15(v: f64) -> f64 {
    (v * 1e15).round() / 1e15
}

/// Rotate `image` counter-clockwise by `angle_degrees` about `center`.
pub fn rotate_about(image: &RgbImage, center: (f64, f64), angle_degrees: f64) -> Rotated {
    let (w, h) = image.dimensions();
    let (wf, hf) = (w as f64, h as f64);
    let theta = -angle_degrees.rem_euclid(360.0).to_radians();
    let (cx, cy) = center;

    let (a, b) = (round15(theta.cos()), round15(theta.sin()));
    let (d, e) = (round15(-theta.sin()), round15(theta.cos()));
    let mut m = Inverse {
        a,
        b,
        c: a * -cx + b * -cy + cx,
        d,
        e,
        f: d * -cx + e * -cy + cy,
    };

    let corners = [(0.0, 0.0), (wf, 0.0), (wf, hf), (0.0, hf)].map(|(x, y)| m.apply(x, y));
    let (min_x, max_x) = bounds(corners.iter().map(|p| p.0));
    let (min_y, max_y) = bounds(corners.iter().map(|p| p.1));
    let nw = (max_x.ceil() - min_x.floor()).max(1.0) as u32;
    let nh = (max_y.ceil() - min_y.floor()).max(1.0) as u32;

    let shift_x = (nw as f64 - wf) / 2.0;
    let shift_y = (nh as f64 - hf) / 2.0;
    let (c, f) = m.apply(-shift_x, -shift_y);
    m.c = c;
    m.f = f;

    let mut out = RgbImage::new(nw, nh);
    let row_len = nw as usize * 3;
    out.par_chunks_mut(row_len)
        .enumerate()
        .for_each(|(oy, row)| {
            let yc = oy as f64 + 0.5;
            for ox in 0..nw as usize {
                let (xin, yin) = m.apply(ox as f64 + 0.5, yc);
                if xin < 0.0 || yin < 0.0 {
                    continue;
                }
                let (xi, yi) = (xin as u32, yin as u32);
                if xi >= w || yi >= h {
                    continue;
                }
                let px = image.get_pixel(xi, yi).0;
                row[ox * 3..ox * 3 + 3].copy_from_slice(&px);
            }
        });

    Rotated {
        image: out,
        shift_x,
        shift_y,
    }
}

fn bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    })
}

/// Cut a `width` × `height` window centred on `focal`, padding with black
/// wherever the window leaves the image.
pub fn crop_centered(image: &RgbImage, focal: (f64, f64), width: u32, height: u32) -> RgbImage {
    let left = (focal.0 - (width / 2) as f64).floor() as i64;
    let top = (focal.1 - (height / 2) as f64).floor() as i64;
    let mut out = RgbImage::new(width, height);
    imageops::replace(&mut out, image, -left, -top);
    out
}

/// Rotate about the focal pixel and crop back to the output size so the
/// focal point sits at the centre.
pub fn rotate_and_crop(
    canvas: &RgbImage,
    focal: (u32, u32),
    angle_degrees: f64,
    width: u32,
    height: u32,
) -> RgbImage {
    let focal = (focal.0 as f64, focal.1 as f64);
    if angle_degrees.rem_euclid(360.0) == 0.0 {
        return crop_centered(canvas, focal, width, height);
    }
    let rotated = rotate_about(canvas, focal, angle_degrees);
    crop_centered(
        &rotated.image,
        (focal.0 + rotated.shift_x, focal.1 + rotated.shift_y),
        width,
        height,
    )
}
