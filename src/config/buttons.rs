//! Button layout table
//!
//! Maps symbolic UI-element names to screen rectangles and carries the
//! pixel strides used to compute the Nth slot of a repeated element
//! (servant skills, command cards, target portraits) arithmetically.
//! Loaded once at startup and immutable afterwards.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::BotError;

/// Default layout, calibrated for a 1280x720 screen.
const DEFAULT_LAYOUT: &str = include_str!("buttons.json");

/// A tappable screen rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Button {
    /// Top-left x coordinate in pixels.
    pub x: i32,
    /// Top-left y coordinate in pixels.
    pub y: i32,
    /// Width in pixels.
    pub w: u32,
    /// Height in pixels.
    pub h: u32,
}

/// Pixel strides between repeated UI slots.
///
/// Every repeated element the bot touches is laid out horizontally, so
/// strides apply to the x axis only.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Strides {
    /// Distance between adjacent servants' skill groups.
    pub servant: i32,
    /// Distance between a servant's adjacent skill buttons.
    pub skill: i32,
    /// Distance between adjacent command cards.
    pub card: i32,
    /// Distance between adjacent skill-target portraits.
    pub choose_object: i32,
    /// Distance between adjacent master skill buttons.
    pub master_skill: i32,
    /// Distance between adjacent order-change portraits.
    pub change: i32,
}

/// A swipe gesture as `(x1, y1, x2, y2)`.
pub type Track = [i32; 4];

/// The full layout table: rectangles, strides, and named swipe tracks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ButtonLayout {
    buttons: HashMap<String, Button>,
    /// Slot strides, public so callers can pick the one they need.
    pub strides: Strides,
    swipes: HashMap<String, Track>,
}

impl ButtonLayout {
    /// Parse a layout from JSON.
    pub fn from_json(json: &str) -> Result<Self, BotError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a layout from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, BotError> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    /// Look up a button rectangle by name.
    pub fn button(&self, name: &str) -> Result<Button, BotError> {
        self.buttons
            .get(name)
            .copied()
            .ok_or_else(|| BotError::UnknownButton(name.to_string()))
    }

    /// Compute the rectangle of the `index`-th slot (1-based) of a repeated
    /// element, offsetting the base rectangle along x by `stride` per slot.
    ///
    /// Index 0 is rejected rather than wrapped; upper bounds are the
    /// caller's contract since they differ per element.
    pub fn slot(&self, name: &str, stride: i32, index: u8) -> Result<Button, BotError> {
        if index < 1 {
            return Err(BotError::SlotIndex {
                name: name.to_string(),
                index,
            });
        }
        let mut button = self.button(name)?;
        button.x += stride * (i32::from(index) - 1);
        Ok(button)
    }

    /// Look up a named swipe track.
    pub fn track(&self, name: &str) -> Result<Track, BotError> {
        self.swipes
            .get(name)
            .copied()
            .ok_or_else(|| BotError::UnknownTrack(name.to_string()))
    }
}

impl Default for ButtonLayout {
    fn default() -> Self {
        Self::from_json(DEFAULT_LAYOUT).expect("embedded button layout is valid")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout_parses() {
        let layout = ButtonLayout::default();
        assert!(layout.button("skill").is_ok());
        assert!(layout.button("card").is_ok());
        assert!(layout.track("friend").is_ok());
    }

    #[test]
    fn test_unknown_button() {
        let layout = ButtonLayout::default();
        assert!(matches!(
            layout.button("nonexistent"),
            Err(BotError::UnknownButton(_))
        ));
    }

    #[test]
    fn test_slot_arithmetic() {
        let layout = ButtonLayout::default();
        let base = layout.button("skill").unwrap();
        let stride = layout.strides.skill;

        // First slot is the base rectangle itself.
        let first = layout.slot("skill", stride, 1).unwrap();
        assert_eq!(first, base);

        // Third slot is offset along x only.
        let third = layout.slot("skill", stride, 3).unwrap();
        assert_eq!(third.x, base.x + stride * 2);
        assert_eq!(third.y, base.y);
        assert_eq!(third.w, base.w);
        assert_eq!(third.h, base.h);
    }

    #[test]
    fn test_slot_boundaries() {
        let layout = ButtonLayout::default();
        let base = layout.button("card").unwrap();
        let stride = layout.strides.card;

        let last = layout.slot("card", stride, 5).unwrap();
        assert_eq!(last.x, base.x + stride * 4);

        let servant_base = layout.button("choose_object").unwrap();
        let servant_stride = layout.strides.choose_object;
        let last = layout.slot("choose_object", servant_stride, 3).unwrap();
        assert_eq!(last.x, servant_base.x + servant_stride * 2);
    }

    #[test]
    fn test_slot_index_zero_rejected() {
        let layout = ButtonLayout::default();
        assert!(matches!(
            layout.slot("skill", layout.strides.skill, 0),
            Err(BotError::SlotIndex { index: 0, .. })
        ));
    }
}
