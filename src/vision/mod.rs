//! Vision module
//!
//! The recognition seam between the battle controller and whatever looks
//! at the screen. [`Matcher`] is a deliberately small oracle: refresh the
//! frame, then ask for confidences and locations of named reference
//! images. [`TemplateMatcher`] implements it with grayscale template
//! matching; tests implement it with scripted confidences.

pub mod matcher;

pub use matcher::TemplateMatcher;

use image::DynamicImage;

/// Recognition oracle over the most recently supplied frame.
///
/// A matcher never captures on its own; the controller decides when a
/// frame is refreshed, so no decision is ever made on a stale screen by
/// accident.
pub trait Matcher {
    /// Replace the current frame.
    fn refresh(&mut self, frame: DynamicImage);

    /// Best-match confidence for a named reference image, in `[0, 1]`.
    /// Unknown names and a missing frame score `0.0`.
    fn probability(&self, name: &str) -> f32;

    /// Locate a reference image, returning its top-left corner if the
    /// best match clears `threshold`. Absence is `None`, never a
    /// sentinel coordinate.
    fn find(&self, name: &str, threshold: f32) -> Option<(u32, u32)>;

    /// Dimensions of a reference image as `(width, height)`.
    fn size(&self, name: &str) -> Option<(u32, u32)>;
}
