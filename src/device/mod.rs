//! Device interaction module
//!
//! The input-actuator seam. [`Device`] is the capability the battle
//! controller needs from a device: taps, swipes, and screen captures, all
//! synchronous and all failure-by-return-value. [`AdbDevice`] implements it
//! over an `adb` subprocess; tests substitute recording fakes.

pub mod adb;
pub mod humanize;

pub use adb::AdbDevice;
pub use humanize::Humanizer;

use image::DynamicImage;

/// A connected device the bot can drive.
///
/// Every method may fail without panicking; failure is a returned `false`
/// or `None` and the caller's retry loop deals with it.
pub trait Device {
    /// Whether exactly one usable device is attached.
    fn connected(&mut self) -> bool;

    /// Tap at the given pixel coordinates.
    fn tap(&mut self, x: i32, y: i32) -> bool;

    /// Swipe from one point to another over `duration_ms` milliseconds.
    fn swipe(&mut self, from: (i32, i32), to: (i32, i32), duration_ms: u32) -> bool;

    /// Capture the current screen contents.
    fn capture(&mut self) -> Option<DynamicImage>;
}
