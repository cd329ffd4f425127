//! The fixed-order transform pipeline
//!
//! One entry point: recompute the displayed image from the unmodified
//! source and an EditState snapshot. Nothing here ever renders from a
//! previous output, which is what makes undo/redo and parameter changes
//! lossless.
//!
//! The stage order is a design invariant, reordering it changes visual
//! output:
//!
//! 1. crop left, right, top, bottom (each against the current
//!    intermediate size)
//! 2. rotate
//! 3. horizontal flip, vertical flip
//! 4. viewport normalization (shrink-to-fit, aspect preserved)
//! 5. brightness, contrast, sharpness
//! 6. the active filter
//! 7. the active blur

use image::RgbImage;

use crate::error::TransformError;
use crate::state::EditState;
use crate::transform::{adjust, transpose, CropSide, Registry};

/// Maximum display dimensions for the normalization stage. Rendering
/// for export passes `None` and keeps full resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// A finished render: the image plus whatever went wrong in the named
/// stages. Stage failures never abort the render; the failed stage is
/// skipped and reported here.
#[derive(Debug)]
pub struct RenderOutput {
    pub image: RgbImage,
    pub warnings: Vec<TransformError>,
}

/// Recompute the displayed image from `source` and `state`.
///
/// Deterministic: identical inputs produce byte-identical output. An
/// unknown or panicking filter/blur leaves that stage unapplied and adds
/// a warning to the output.
pub fn apply(
    source: &RgbImage,
    state: &EditState,
    filters: &Registry,
    blurs: &Registry,
    viewport: Option<Viewport>,
) -> RenderOutput {
    let mut warnings = Vec::new();

    // 1. Sequential crops, each taken against the buffer it receives
    let mut image = transpose::crop(source, CropSide::Left, state.crop_left);
    image = transpose::crop(&image, CropSide::Right, state.crop_right);
    image = transpose::crop(&image, CropSide::Top, state.crop_top);
    image = transpose::crop(&image, CropSide::Bottom, state.crop_bottom);

    // 2. Rotation (accumulated degrees, rendered modulo 360)
    image = transpose::rotate(&image, state.rotation);

    // 3. Flips
    if state.horizontal_flip {
        image = transpose::horizontal_flip(&image);
    }
    if state.vertical_flip {
        image = transpose::vertical_flip(&image);
    }

    // 4. Display normalization
    if let Some(viewport) = viewport {
        image = fit_viewport(&image, viewport);
    }

    // 5. Enhancements
    image = adjust::brightness(&image, state.brightness);
    image = adjust::contrast(&image, state.contrast);
    image = adjust::sharpness(&image, state.sharpness);

    // 6. Active filter, 7. active blur
    image = run_named_stage(filters, &state.filter, image, &mut warnings);
    image = run_named_stage(blurs, &state.blur, image, &mut warnings);

    RenderOutput { image, warnings }
}

/// Apply one registry stage; on failure keep the image unchanged and
/// record the warning.
fn run_named_stage(
    registry: &Registry,
    name: &str,
    image: RgbImage,
    warnings: &mut Vec<TransformError>,
) -> RgbImage {
    match registry.apply(name, &image) {
        Ok(out) => out,
        Err(e) => {
            warnings.push(e);
            image
        }
    }
}

/// Shrink the image to fit inside the viewport, preserving aspect ratio.
/// Images already inside the viewport pass through untouched; this stage
/// never upscales.
fn fit_viewport(image: &RgbImage, viewport: Viewport) -> RgbImage {
    let (w, h) = (image.width() as f32, image.height() as f32);
    let scale = (w / viewport.width.max(1) as f32).max(h / viewport.height.max(1) as f32);
    if scale <= 1.0 {
        return image.clone();
    }
    transpose::resize(
        image,
        (w / scale).round().max(1.0) as u32,
        (h / scale).round().max(1.0) as u32,
    )
}
