//! Built-in named filters
//!
//! Pure per-pixel remaps. These seed the filter [`Registry`](super::Registry);
//! external callers can register more at runtime.

use image::{Rgb, RgbImage};

/// Default offset for the sepia tint.
const SEPIA_K: u16 = 30;

/// Convert every pixel to the average-of-channels gray triple.
pub fn black_white(image: &RgbImage) -> RgbImage {
    let mut out = image.clone();
    for Rgb([r, g, b]) in out.pixels_mut() {
        let avg = ((*r as u16 + *g as u16 + *b as u16) / 3) as u8;
        (*r, *g, *b) = (avg, avg, avg);
    }
    out
}

/// Warm-tone the image: gray out each pixel, then offset the channels by
/// `(k², k, 0)`, clamped to the channel range.
pub fn sepia(image: &RgbImage) -> RgbImage {
    let mut out = image.clone();
    for Rgb([r, g, b]) in out.pixels_mut() {
        let avg = (*r as u16 + *g as u16 + *b as u16) / 3;
        *r = (avg + SEPIA_K * SEPIA_K).min(255) as u8;
        *g = (avg + SEPIA_K).min(255) as u8;
        *b = avg as u8;
    }
    out
}

/// Invert every channel: `v -> 255 - v`. Self-inverse.
pub fn negative(image: &RgbImage) -> RgbImage {
    let mut out = image.clone();
    for Rgb([r, g, b]) in out.pixels_mut() {
        (*r, *g, *b) = (255 - *r, 255 - *g, 255 - *b);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RgbImage {
        RgbImage::from_fn(6, 4, |x, y| {
            Rgb([(x * 40 % 256) as u8, (y * 60 % 256) as u8, 120])
        })
    }

    #[test]
    fn test_negative_round_trip_is_exact() {
        let img = sample();
        assert_eq!(negative(&negative(&img)), img);
    }

    #[test]
    fn test_black_white_averages_channels() {
        let img = RgbImage::from_pixel(2, 2, Rgb([30, 60, 90]));
        let gray = black_white(&img);
        assert_eq!(*gray.get_pixel(0, 0), Rgb([60, 60, 60]));
    }

    #[test]
    fn test_sepia_offsets_clamp() {
        let img = RgbImage::from_pixel(1, 1, Rgb([30, 60, 90]));
        let toned = sepia(&img);
        // avg = 60; red saturates at 255, green gets +30, blue stays
        assert_eq!(*toned.get_pixel(0, 0), Rgb([255, 90, 60]));
    }
}
