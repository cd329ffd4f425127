//! Stateless image transforms
//!
//! Every operation in this module is a pure function over `RgbImage`:
//! - geometry: resize, rotate, flip, crop (transpose.rs)
//! - adjustments: brightness, contrast, sharpness (adjust.rs)
//! - named filters: black_white, sepia, negative (filter.rs)
//! - named directional blurs: horizontal, vertical (blur.rs)
//! - the runtime name -> function registry (registry.rs)

pub mod adjust;
pub mod blur;
pub mod filter;
pub mod registry;
pub mod transpose;

pub use registry::{Registry, NONE};
pub use transpose::CropSide;
