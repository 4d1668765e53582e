//! Configuration module
//!
//! Operator settings (reference images, thresholds, AP policy) and the
//! button layout table used to compute tap targets.

pub mod buttons;
pub mod settings;

pub use buttons::{Button, ButtonLayout, Strides};
pub use settings::{BotConfig, Timings};
