//! Built-in directional blurs
//!
//! Each blur softens progressively deeper bands near two opposing edges
//! with a sigma-1 gaussian, leaving the middle of the frame sharp. The
//! effect reads as a vignette along one axis. These seed the blur
//! [`Registry`](super::Registry).

use image::imageops;
use image::RgbImage;

/// Gaussian sigma used for every band.
const BAND_SIGMA: f32 = 1.0;

/// Blur one rectangle of the image in place.
fn blur_region(image: &mut RgbImage, x: u32, y: u32, w: u32, h: u32) {
    if w == 0 || h == 0 {
        return;
    }
    let piece = imageops::crop_imm(image, x, y, w, h).to_image();
    let softened = imageops::blur(&piece, BAND_SIGMA);
    imageops::replace(image, &softened, x as i64, y as i64);
}

/// Band depths as fractions of the blurred dimension: 1/4, 3/8, 5/16.
/// Applied in this order from each edge, overlapping on purpose so the
/// falloff deepens toward the border.
fn band_depths(dim: u32) -> [u32; 3] {
    [dim / 4, 3 * dim / 8, 5 * dim / 16]
}

/// Soften horizontal bands along the top and bottom edges.
pub fn horizontal_blur(image: &RgbImage) -> RgbImage {
    let mut out = image.clone();
    let (w, h) = out.dimensions();
    for depth in band_depths(h) {
        blur_region(&mut out, 0, 0, w, depth);
    }
    for depth in band_depths(h) {
        blur_region(&mut out, 0, h - depth, w, depth);
    }
    out
}

/// Soften vertical bands along the left and right edges.
pub fn vertical_blur(image: &RgbImage) -> RgbImage {
    let mut out = image.clone();
    let (w, h) = out.dimensions();
    for depth in band_depths(w) {
        blur_region(&mut out, 0, 0, depth, h);
    }
    for depth in band_depths(w) {
        blur_region(&mut out, w - depth, 0, depth, h);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn noisy() -> RgbImage {
        RgbImage::from_fn(32, 32, |x, y| {
            if (x + y) % 2 == 0 { Rgb([255, 255, 255]) } else { Rgb([0, 0, 0]) }
        })
    }

    #[test]
    fn test_horizontal_blur_softens_edges_keeps_center() {
        let img = noisy();
        let out = horizontal_blur(&img);
        assert_ne!(*out.get_pixel(16, 0), *img.get_pixel(16, 0));
        // The center row sits outside every band
        assert_eq!(*out.get_pixel(16, 16), *img.get_pixel(16, 16));
    }

    #[test]
    fn test_vertical_blur_softens_edges_keeps_center() {
        let img = noisy();
        let out = vertical_blur(&img);
        assert_ne!(*out.get_pixel(0, 16), *img.get_pixel(0, 16));
        assert_eq!(*out.get_pixel(16, 16), *img.get_pixel(16, 16));
    }

    #[test]
    fn test_blur_keeps_dimensions() {
        let img = noisy();
        assert_eq!(horizontal_blur(&img).dimensions(), img.dimensions());
        assert_eq!(vertical_blur(&img).dimensions(), img.dimensions());
    }

    #[test]
    fn test_blur_on_tiny_image_is_safe() {
        // All band depths are zero at 1x1; the blur is the identity
        let img = RgbImage::from_pixel(1, 1, Rgb([7, 8, 9]));
        assert_eq!(horizontal_blur(&img), img);
        assert_eq!(vertical_blur(&img), img);
    }
}
