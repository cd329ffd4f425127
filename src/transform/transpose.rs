//! Geometry transforms: resize, rotate, flip, crop
//!
//! Every function here is pure: it borrows the input buffer and allocates
//! a fresh output, so no two pipeline stages ever share mutable storage.

use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};

/// Which edge a crop removes pixels from.
///
/// Left/right percentages are measured against the buffer's current width,
/// top/bottom against its current height.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropSide {
    Left,
    Right,
    Top,
    Bottom,
}

/// Scale to exact target dimensions.
///
/// No aspect-ratio enforcement; that is the caller's responsibility.
/// Zero targets are clamped to 1 so the result is always a valid buffer.
pub fn resize(image: &RgbImage, width: u32, height: u32) -> RgbImage {
    imageops::resize(image, width.max(1), height.max(1), FilterType::Lanczos3)
}

/// Rotate by an integer degree value, positive = counter-clockwise.
///
/// Multiples of 90 are lossless pixel shuffles. Any other angle expands
/// the canvas to the rotated bounding box, samples nearest-neighbor and
/// fills the uncovered corners with black.
pub fn rotate(image: &RgbImage, degrees: i32) -> RgbImage {
    match degrees.rem_euclid(360) {
        0 => image.clone(),
        // imageops rotations are clockwise, ours are counter-clockwise
        90 => imageops::rotate270(image),
        180 => imageops::rotate180(image),
        270 => imageops::rotate90(image),
        arbitrary => rotate_expanded(image, arbitrary),
    }
}

/// Free-angle rotation with canvas expansion.
fn rotate_expanded(image: &RgbImage, degrees: i32) -> RgbImage {
    let (w, h) = (image.width() as f32, image.height() as f32);
    let radians = (degrees as f32).to_radians();
    let (sin_a, cos_a) = radians.sin_cos();

    let out_w = (w * cos_a.abs() + h * sin_a.abs()).ceil().max(1.0) as u32;
    let out_h = (w * sin_a.abs() + h * cos_a.abs()).ceil().max(1.0) as u32;
    let (cx, cy) = (w / 2.0, h / 2.0);
    let (ox, oy) = (out_w as f32 / 2.0, out_h as f32 / 2.0);

    let mut out = RgbImage::new(out_w, out_h);
    for y in 0..out_h {
        for x in 0..out_w {
            let dx = x as f32 + 0.5 - ox;
            let dy = y as f32 + 0.5 - oy;
            // Inverse mapping: rotate the sampling grid the opposite way
            let sx = cos_a * dx - sin_a * dy + cx;
            let sy = sin_a * dx + cos_a * dy + cy;
            if sx >= 0.0 && sy >= 0.0 && sx < w && sy < h {
                out.put_pixel(x, y, *image.get_pixel(sx as u32, sy as u32));
            } else {
                out.put_pixel(x, y, Rgb([0, 0, 0]));
            }
        }
    }
    out
}

/// Mirror along the vertical axis. Involution: applying twice restores
/// the original pixel-for-pixel.
pub fn horizontal_flip(image: &RgbImage) -> RgbImage {
    imageops::flip_horizontal(image)
}

/// Mirror along the horizontal axis. Involution, same as above.
pub fn vertical_flip(image: &RgbImage) -> RgbImage {
    imageops::flip_vertical(image)
}

/// Remove `percent`% of the current dimension from one side.
///
/// The percentage is taken against the buffer passed in, so sequential
/// crops compose multiplicatively: 50% off the left of a 100px image and
/// then 50% off the right leaves 25px, not 0. A crop that would empty the
/// buffer clamps the surviving dimension to 1.
pub fn crop(image: &RgbImage, side: CropSide, percent: u8) -> RgbImage {
    let percent = percent.min(100);
    let (w, h) = image.dimensions();

    let keep = |dim: u32| -> u32 {
        let removed = (dim as f32 * percent as f32 / 100.0) as u32;
        dim.saturating_sub(removed).max(1)
    };

    let (x, y, new_w, new_h) = match side {
        CropSide::Left => (w - keep(w), 0, keep(w), h),
        CropSide::Right => (0, 0, keep(w), h),
        CropSide::Top => (0, h - keep(h), w, keep(h)),
        CropSide::Bottom => (0, 0, w, keep(h)),
    };

    imageops::crop_imm(image, x, y, new_w, new_h).to_image()
}
