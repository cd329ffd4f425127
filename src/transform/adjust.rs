//! Brightness, contrast and sharpness adjustments
//!
//! All three share the same enhancement model: a slider level in [0,100]
//! maps to a factor via `level / 50` (0 = fully degraded, 50 = neutral,
//! 100 = doubled), and the output is a linear blend between a "degenerate"
//! image and the original:
//!
//! ```text
//! out = degenerate + (original - degenerate) * factor
//! ```
//!
//! The degenerate image is black for brightness, uniform mean-luma gray
//! for contrast, and a smoothed copy for sharpness. At level 50 the blend
//! is an exact identity.

use image::{Rgb, RgbImage};

/// The 3x3 smoothing kernel used as the sharpness degenerate,
/// normalized by 13.
const SMOOTH_KERNEL: [[f32; 3]; 3] = [[1.0, 1.0, 1.0], [1.0, 5.0, 1.0], [1.0, 1.0, 1.0]];
const SMOOTH_SCALE: f32 = 13.0;

/// Slider level to enhancement factor: 0 -> 0.0, 50 -> 1.0, 100 -> 2.0.
fn factor(level: u8) -> f32 {
    level.min(100) as f32 / 50.0
}

/// Channelwise blend between a degenerate sample and the original.
fn blend_channel(degenerate: f32, original: f32, factor: f32) -> u8 {
    (degenerate + (original - degenerate) * factor).round().clamp(0.0, 255.0) as u8
}

/// Adjust brightness. Degenerate = black, so the blend is a plain
/// per-channel multiply by the factor.
pub fn brightness(image: &RgbImage, level: u8) -> RgbImage {
    let f = factor(level);
    map_pixels(image, |Rgb([r, g, b])| {
        Rgb([
            blend_channel(0.0, r as f32, f),
            blend_channel(0.0, g as f32, f),
            blend_channel(0.0, b as f32, f),
        ])
    })
}

/// Adjust contrast. Degenerate = a uniform gray at the image's mean luma,
/// so level 0 flattens everything to that gray and level 100 pushes each
/// channel twice as far from it.
pub fn contrast(image: &RgbImage, level: u8) -> RgbImage {
    let f = factor(level);
    let mean = mean_luma(image);
    map_pixels(image, |Rgb([r, g, b])| {
        Rgb([
            blend_channel(mean, r as f32, f),
            blend_channel(mean, g as f32, f),
            blend_channel(mean, b as f32, f),
        ])
    })
}

/// Adjust sharpness. Degenerate = the image run through the smoothing
/// kernel, so level 0 is fully smoothed and level 100 over-sharpens.
pub fn sharpness(image: &RgbImage, level: u8) -> RgbImage {
    let f = factor(level);
    let smoothed = smooth(image);
    let mut out = RgbImage::new(image.width(), image.height());
    for (x, y, pixel) in out.enumerate_pixels_mut() {
        let Rgb([r, g, b]) = *image.get_pixel(x, y);
        let Rgb([sr, sg, sb]) = *smoothed.get_pixel(x, y);
        *pixel = Rgb([
            blend_channel(sr as f32, r as f32, f),
            blend_channel(sg as f32, g as f32, f),
            blend_channel(sb as f32, b as f32, f),
        ]);
    }
    out
}

fn map_pixels(image: &RgbImage, op: impl Fn(Rgb<u8>) -> Rgb<u8>) -> RgbImage {
    let mut out = RgbImage::new(image.width(), image.height());
    for (x, y, pixel) in out.enumerate_pixels_mut() {
        *pixel = op(*image.get_pixel(x, y));
    }
    out
}

/// Mean ITU-R 601 luma over the whole image, rounded.
fn mean_luma(image: &RgbImage) -> f32 {
    let mut sum: u64 = 0;
    for Rgb([r, g, b]) in image.pixels() {
        sum += (*r as u64 * 299 + *g as u64 * 587 + *b as u64 * 114) / 1000;
    }
    let count = (image.width() as u64 * image.height() as u64).max(1);
    ((sum as f64 / count as f64) + 0.5).floor() as f32
}

/// One pass of the smoothing kernel with clamp-at-edge sampling.
fn smooth(image: &RgbImage) -> RgbImage {
    let (w, h) = image.dimensions();
    let mut out = RgbImage::new(w, h);
    for (x, y, pixel) in out.enumerate_pixels_mut() {
        let mut acc = [0.0f32; 3];
        for (ky, row) in SMOOTH_KERNEL.iter().enumerate() {
            for (kx, weight) in row.iter().enumerate() {
                let sx = (x as i64 + kx as i64 - 1).clamp(0, w as i64 - 1) as u32;
                let sy = (y as i64 + ky as i64 - 1).clamp(0, h as i64 - 1) as u32;
                let Rgb([r, g, b]) = *image.get_pixel(sx, sy);
                acc[0] += r as f32 * weight;
                acc[1] += g as f32 * weight;
                acc[2] += b as f32 * weight;
            }
        }
        *pixel = Rgb([
            (acc[0] / SMOOTH_SCALE).round().clamp(0.0, 255.0) as u8,
            (acc[1] / SMOOTH_SCALE).round().clamp(0.0, 255.0) as u8,
            (acc[2] / SMOOTH_SCALE).round().clamp(0.0, 255.0) as u8,
        ]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RgbImage {
        RgbImage::from_fn(9, 5, |x, y| {
            Rgb([(x * 23 % 256) as u8, (y * 41 % 256) as u8, ((x + y) * 13 % 256) as u8])
        })
    }

    #[test]
    fn test_level_50_is_exact_identity() {
        let img = sample();
        assert_eq!(brightness(&img, 50), img);
        assert_eq!(contrast(&img, 50), img);
        assert_eq!(sharpness(&img, 50), img);
    }

    #[test]
    fn test_brightness_zero_is_black() {
        let black = Rgb([0, 0, 0]);
        for pixel in brightness(&sample(), 0).pixels() {
            assert_eq!(*pixel, black);
        }
    }

    #[test]
    fn test_brightness_100_doubles_channels() {
        let img = RgbImage::from_pixel(4, 4, Rgb([10, 100, 200]));
        let doubled = brightness(&img, 100);
        // 200 * 2 clamps at the channel ceiling
        assert_eq!(*doubled.get_pixel(0, 0), Rgb([20, 200, 255]));
    }

    #[test]
    fn test_contrast_zero_flattens_to_mean_gray() {
        let flat = contrast(&sample(), 0);
        let first = *flat.get_pixel(0, 0);
        assert_eq!(first[0], first[1]);
        assert_eq!(first[1], first[2]);
        for pixel in flat.pixels() {
            assert_eq!(*pixel, first);
        }
    }

    #[test]
    fn test_sharpness_zero_smooths_gradient_edges() {
        // A hard vertical edge: smoothing must pull the border pixels together
        let img = RgbImage::from_fn(8, 8, |x, _| {
            if x < 4 { Rgb([0, 0, 0]) } else { Rgb([255, 255, 255]) }
        });
        let soft = sharpness(&img, 0);
        let edge = *soft.get_pixel(3, 4);
        assert!(edge[0] > 0, "edge pixel should pick up light neighbors");
        let deep = *soft.get_pixel(0, 4);
        assert_eq!(deep, Rgb([0, 0, 0]), "far from the edge nothing changes");
    }

    #[test]
    fn test_out_of_range_level_clamps() {
        let img = sample();
        assert_eq!(brightness(&img, 200), brightness(&img, 100));
    }
}
