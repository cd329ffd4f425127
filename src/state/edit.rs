//! Non-destructive edit parameters
//!
//! This struct stores all adjustments made to an image. The displayed
//! image is always recomputed by applying these parameters to the
//! unmodified source, never by mutating a working copy, so any snapshot
//! fully describes one point in the edit history. Snapshots are stored
//! column-for-column in the history database and can round-trip through
//! JSON for sidecar export.

use serde::{Deserialize, Serialize};

use crate::transform::{CropSide, NONE};

/// The complete parameter set for one edit of an image.
///
/// A value of this type is immutable once committed to history; every
/// user action produces a new snapshot. All core logic receives these
/// explicitly, there is no ambient mutable edit state anywhere.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct EditState {
    /// Accumulated rotation in degrees, positive = counter-clockwise.
    /// Grows without bound (+90 per turn, never normalized); rendering
    /// is equivalent modulo 360.
    pub rotation: i32,

    /// Mirror along the vertical axis
    pub horizontal_flip: bool,
    /// Mirror along the horizontal axis
    pub vertical_flip: bool,

    /// Brightness slider level in [0,100], 50 = neutral
    pub brightness: u8,
    /// Contrast slider level in [0,100], 50 = neutral
    pub contrast: u8,
    /// Sharpness slider level in [0,100], 50 = neutral
    pub sharpness: u8,

    /// Percent of the width removed from the left edge, [0,100]
    pub crop_left: u8,
    /// Percent of the width removed from the right edge, [0,100]
    pub crop_right: u8,
    /// Percent of the height removed from the top edge, [0,100]
    pub crop_top: u8,
    /// Percent of the height removed from the bottom edge, [0,100]
    pub crop_bottom: u8,

    /// Active filter name from the filter registry. A single field, so
    /// two filters can never be active at once; selecting a new one
    /// replaces the old.
    pub filter: String,
    /// Active blur name from the blur registry, same exclusivity.
    pub blur: String,
}

impl Default for EditState {
    /// The pristine state: no geometry changes, neutral sliders,
    /// `none` filter and blur.
    fn default() -> Self {
        Self {
            rotation: 0,
            horizontal_flip: false,
            vertical_flip: false,
            brightness: 50,
            contrast: 50,
            sharpness: 50,
            crop_left: 0,
            crop_right: 0,
            crop_top: 0,
            crop_bottom: 0,
            filter: NONE.to_string(),
            blur: NONE.to_string(),
        }
    }
}

impl EditState {
    /// Create a pristine edit state
    pub fn new() -> Self {
        Self::default()
    }

    /// Convert to JSON string for sidecar export
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse from a JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Check if this represents an unedited image (all values pristine)
    pub fn is_pristine(&self) -> bool {
        *self == Self::default()
    }

    /// Reset all parameters to the pristine state
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Set a slider level, clamping out-of-range input to [0,100]
    /// (invalid parameters are clamped, never fatal).
    pub fn set_brightness(&mut self, level: u8) {
        self.brightness = level.min(100);
    }

    /// See [`set_brightness`](Self::set_brightness)
    pub fn set_contrast(&mut self, level: u8) {
        self.contrast = level.min(100);
    }

    /// See [`set_brightness`](Self::set_brightness)
    pub fn set_sharpness(&mut self, level: u8) {
        self.sharpness = level.min(100);
    }

    /// Set the crop percentage for one side, clamped to [0,100].
    pub fn set_crop(&mut self, side: CropSide, percent: u8) {
        let percent = percent.min(100);
        match side {
            CropSide::Left => self.crop_left = percent,
            CropSide::Right => self.crop_right = percent,
            CropSide::Top => self.crop_top = percent,
            CropSide::Bottom => self.crop_bottom = percent,
        }
    }

}
