//! Runtime registry of named image functions
//!
//! Filters and blurs share one mechanism: a name mapped to a pure
//! `&RgbImage -> RgbImage` function. The built-ins are seeded at
//! construction; externally supplied functions can be registered at any
//! time and immediately become selectable. Registered code is untrusted
//! in one specific sense: a panic inside it is contained and reported as
//! [`TransformError::PluginFailure`] instead of unwinding into the
//! session, so a broken plugin can never corrupt edit state or history.

use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};

use image::RgbImage;

use crate::error::TransformError;

/// The identity sentinel present in every registry. Selecting it applies
/// no function at all; it can never be overwritten.
pub const NONE: &str = "none";

/// A pure image function suitable for registration.
pub type ImageFn = Box<dyn Fn(&RgbImage) -> RgbImage + Send + Sync>;

/// A named collection of pure image functions.
pub struct Registry {
    kind: &'static str,
    entries: HashMap<String, ImageFn>,
}

impl Registry {
    fn new(kind: &'static str) -> Self {
        Registry {
            kind,
            entries: HashMap::new(),
        }
    }

    /// The built-in filter set: black_white, sepia, negative.
    pub fn filters() -> Self {
        let mut registry = Registry::new("filter");
        registry.insert("black_white", super::filter::black_white);
        registry.insert("sepia", super::filter::sepia);
        registry.insert("negative", super::filter::negative);
        registry
    }

    /// The built-in blur set: horizontal, vertical.
    pub fn blurs() -> Self {
        let mut registry = Registry::new("blur");
        registry.insert("horizontal", super::blur::horizontal_blur);
        registry.insert("vertical", super::blur::vertical_blur);
        registry
    }

    fn insert(&mut self, name: &str, f: fn(&RgbImage) -> RgbImage) {
        self.entries.insert(name.to_string(), Box::new(f));
    }

    /// Register an external function under a name, making it selectable
    /// immediately. Re-registering a name replaces the previous function;
    /// the `none` sentinel is reserved and cannot be replaced.
    pub fn register(
        &mut self,
        name: &str,
        f: impl Fn(&RgbImage) -> RgbImage + Send + Sync + 'static,
    ) -> Result<(), TransformError> {
        if name == NONE {
            return Err(TransformError::ReservedName(name.to_string()));
        }
        self.entries.insert(name.to_string(), Box::new(f));
        Ok(())
    }

    /// Whether `name` would resolve, the sentinel included.
    pub fn contains(&self, name: &str) -> bool {
        name == NONE || self.entries.contains_key(name)
    }

    /// Registered names, sentinel first, then sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names.insert(0, NONE);
        names
    }

    /// Apply the function registered under `name`.
    ///
    /// `none` short-circuits to a copy of the input. An unknown name is
    /// `UnregisteredName`; a panicking function is caught and surfaced as
    /// `PluginFailure`, the input buffer untouched either way.
    pub fn apply(&self, name: &str, image: &RgbImage) -> Result<RgbImage, TransformError> {
        if name == NONE {
            return Ok(image.clone());
        }
        let f = self
            .entries
            .get(name)
            .ok_or_else(|| TransformError::UnregisteredName(name.to_string()))?;
        panic::catch_unwind(AssertUnwindSafe(|| f(image)))
            .map_err(|_| TransformError::PluginFailure(name.to_string()))
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("kind", &self.kind)
            .field("names", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn sample() -> RgbImage {
        RgbImage::from_pixel(4, 4, Rgb([10, 20, 30]))
    }

    #[test]
    fn test_none_is_identity() {
        let registry = Registry::filters();
        assert_eq!(registry.apply(NONE, &sample()).unwrap(), sample());
    }

    #[test]
    fn test_builtin_filters_resolve() {
        let registry = Registry::filters();
        for name in ["black_white", "sepia", "negative"] {
            assert!(registry.contains(name));
            registry.apply(name, &sample()).unwrap();
        }
    }

    #[test]
    fn test_unknown_name_is_reported() {
        let registry = Registry::blurs();
        let err = registry.apply("swirl", &sample()).unwrap_err();
        assert!(matches!(err, TransformError::UnregisteredName(_)));
    }

    #[test]
    fn test_registered_function_becomes_selectable() {
        let mut registry = Registry::filters();
        registry
            .register("red_only", |img: &RgbImage| {
                let mut out = img.clone();
                for Rgb([_, g, b]) in out.pixels_mut() {
                    (*g, *b) = (0, 0);
                }
                out
            })
            .unwrap();
        let out = registry.apply("red_only", &sample()).unwrap();
        assert_eq!(*out.get_pixel(0, 0), Rgb([10, 0, 0]));
    }

    #[test]
    fn test_none_cannot_be_replaced() {
        let mut registry = Registry::filters();
        let err = registry.register(NONE, |img: &RgbImage| img.clone()).unwrap_err();
        assert!(matches!(err, TransformError::ReservedName(_)));
    }

    #[test]
    fn test_panicking_plugin_is_contained() {
        let mut registry = Registry::filters();
        registry
            .register("broken", |_: &RgbImage| panic!("plugin bug"))
            .unwrap();
        let err = registry.apply("broken", &sample()).unwrap_err();
        assert!(matches!(err, TransformError::PluginFailure(_)));
        // The registry stays usable afterwards
        registry.apply("negative", &sample()).unwrap();
    }
}
